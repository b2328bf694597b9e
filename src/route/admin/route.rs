use axum::extract::State;
use macros::route;
use sqlx::sqlite::SqliteRow;

use crate::{
	extract::{Json, Query, Session},
	openapi::tag,
	route::{
		comment::model::Comment,
		model::Paginator,
		post::model::{Post, POST_ORDER, POST_SELECT},
	},
	Database,
};

use super::{model, Error, RouteError};

const COMMENT_SELECT: &str = r#"
	SELECT comment.*, "user".username AS author FROM comment
	JOIN "user" ON "user".id = comment.author_id
"#;

const FOLLOW_SELECT: &str = r#"
	SELECT follow.id, subscriber.username AS "user", author.username AS author FROM follow
	JOIN "user" AS subscriber ON subscriber.id = follow.user_id
	JOIN "user" AS author ON author.id = follow.author_id
"#;

fn require_staff(session: &Session) -> Result<(), RouteError> {
	if session.user.is_staff {
		Ok(())
	} else {
		Err(Error::NotStaff.into())
	}
}

/// Fetches a page of `select`, keeping the rows that match `filter`.
///
/// `filter` refers to the search pattern as `$1` and is skipped when there
/// is nothing to search for.
async fn search<T>(
	database: &Database,
	select: &str,
	filter: &str,
	order: &str,
	search: &model::SearchInput,
	page: &model::PageInput,
) -> Result<model::Page<T>, sqlx::Error>
where
	T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
{
	let pattern = search.pattern();
	let filter = format!("WHERE $1 IS NULL OR {filter}");

	let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM ({select} {filter})"))
		.bind(&pattern)
		.fetch_one(database)
		.await?;

	let paginator = Paginator::new(count);
	let number = paginator.number(page.page.as_deref());

	let items = sqlx::query_as::<_, T>(&format!("{select} {filter} {order} LIMIT $2 OFFSET $3"))
		.bind(&pattern)
		.bind(paginator.limit())
		.bind(paginator.offset(number))
		.fetch_all(database)
		.await?;

	Ok(paginator.page(number, items))
}

/// List posts
/// Returns a page of every post, newest first, optionally only those whose text contains the search term. Only staff may do this.
#[route(tag = tag::ADMIN)]
pub async fn list_posts(
	State(database): State<Database>,
	session: Session,
	Query(search_input): Query<model::SearchInput>,
	Query(page): Query<model::PageInput>,
) -> Result<Json<model::Page<Post>>, RouteError> {
	require_staff(&session)?;

	let posts = search(
		&database,
		POST_SELECT,
		r"post.text LIKE $1 ESCAPE '\'",
		POST_ORDER,
		&search_input,
		&page,
	)
	.await?;

	Ok(Json(posts))
}

/// List comments
/// Returns a page of every comment, newest first. The search term is matched against the text and the author's username. Only staff may do this.
#[route(tag = tag::ADMIN)]
pub async fn list_comments(
	State(database): State<Database>,
	session: Session,
	Query(search_input): Query<model::SearchInput>,
	Query(page): Query<model::PageInput>,
) -> Result<Json<model::Page<Comment>>, RouteError> {
	require_staff(&session)?;

	let comments = search(
		&database,
		COMMENT_SELECT,
		r#"comment.text LIKE $1 ESCAPE '\' OR "user".username LIKE $1 ESCAPE '\'"#,
		"ORDER BY comment.created_at DESC, comment.id DESC",
		&search_input,
		&page,
	)
	.await?;

	Ok(Json(comments))
}

/// List subscriptions
/// Returns a page of every subscription, newest first. The search term is matched against the followed author's username. Only staff may do this.
#[route(tag = tag::ADMIN)]
pub async fn list_follows(
	State(database): State<Database>,
	session: Session,
	Query(search_input): Query<model::SearchInput>,
	Query(page): Query<model::PageInput>,
) -> Result<Json<model::Page<model::Follow>>, RouteError> {
	require_staff(&session)?;

	let follows = search(
		&database,
		FOLLOW_SELECT,
		r"author.username LIKE $1 ESCAPE '\'",
		"ORDER BY follow.id DESC",
		&search_input,
		&page,
	)
	.await?;

	Ok(Json(follows))
}
