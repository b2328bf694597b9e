use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Session},
	openapi::tag,
	route::post::model::PostPath,
	Database,
};

use super::{model, Error, RouteError};

/// Add comment
/// Comments on a post as the authenticated user.
#[route(tag = tag::COMMENT)]
pub async fn add_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<PostPath>,
	Json(input): Json<model::CreateCommentInput>,
) -> Result<Json<model::Comment>, RouteError> {
	let post_id = sqlx::query_scalar::<_, i64>(
		r#"
			SELECT post.id FROM post
			JOIN "user" ON "user".id = post.author_id
			WHERE post.id = $1 AND "user".username = $2
		"#,
	)
	.bind(path.post_id)
	.bind(&path.username)
	.fetch_optional(&database)
	.await?
	.ok_or(Error::UnknownPost(path.post_id))?;

	let comment_id = sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO comment (post_id, author_id, text, created_at)
			VALUES ($1, $2, $3, $4)
			RETURNING id
		"#,
	)
	.bind(post_id)
	.bind(session.user.id)
	.bind(&input.text)
	.bind(chrono::Utc::now())
	.fetch_one(&database)
	.await?;

	let comment = sqlx::query_as::<_, model::Comment>(
		r#"
			SELECT comment.*, "user".username AS author FROM comment
			JOIN "user" ON "user".id = comment.author_id
			WHERE comment.id = $1
		"#,
	)
	.bind(comment_id)
	.fetch_one(&database)
	.await?;

	tracing::info!(post = post_id, author = %session.user.username, "comment added");

	Ok(Json(comment))
}
