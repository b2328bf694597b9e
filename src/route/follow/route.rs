use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	route::{
		model::{Page, PageInput},
		post::{
			feed::Feed,
			model::{Post, ProfilePath},
		},
	},
	Database,
};

use super::{Error, FollowState, RouteError};

async fn find_author_id(database: &Database, username: &str) -> Result<uuid::Uuid, RouteError> {
	sqlx::query_scalar::<_, uuid::Uuid>(r#"SELECT id FROM "user" WHERE username = $1"#)
		.bind(username)
		.fetch_optional(database)
		.await?
		.ok_or_else(|| Error::UnknownUser(username.to_owned()).into())
}

async fn follow_state(
	database: &Database,
	session: &Session,
	username: String,
	author_id: uuid::Uuid,
) -> Result<FollowState, RouteError> {
	let (follow, followers) = sqlx::query_as::<_, (i64, i64)>(
		r#"
			SELECT
				(SELECT COUNT(*) FROM follow WHERE user_id = $1 AND author_id = $2),
				(SELECT COUNT(*) FROM follow WHERE author_id = $2)
		"#,
	)
	.bind(session.user.id)
	.bind(author_id)
	.fetch_one(database)
	.await?;

	Ok(FollowState {
		author: username,
		follow: follow > 0,
		followers,
	})
}

/// Follow feed
/// Returns a page of posts written by the authors the authenticated user follows.
#[route(tag = tag::FOLLOW)]
pub async fn follow_index(
	State(database): State<Database>,
	session: Session,
	Query(input): Query<PageInput>,
) -> Result<Json<Page<Post>>, RouteError> {
	let page = Feed::FollowedBy(session.user.id)
		.page(&database, input.page.as_deref())
		.await?;

	Ok(Json(page))
}

/// Follow author
/// Subscribes the authenticated user to an author. Following an author twice,
/// or following yourself, does nothing.
#[route(tag = tag::FOLLOW)]
pub async fn profile_follow(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<ProfilePath>,
) -> Result<Json<FollowState>, RouteError> {
	let author_id = find_author_id(&database, &path.username).await?;

	if author_id != session.user.id {
		sqlx::query(
			"INSERT INTO follow (user_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
		)
		.bind(session.user.id)
		.bind(author_id)
		.execute(&database)
		.await?;

		tracing::info!(user = %session.user.username, author = %path.username, "followed author");
	}

	Ok(Json(
		follow_state(&database, &session, path.username, author_id).await?,
	))
}

/// Unfollow author
/// Removes the authenticated user's subscription to an author.
#[route(tag = tag::FOLLOW)]
pub async fn profile_unfollow(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<ProfilePath>,
) -> Result<Json<FollowState>, RouteError> {
	let author_id = find_author_id(&database, &path.username).await?;

	let status = sqlx::query("DELETE FROM follow WHERE user_id = $1 AND author_id = $2")
		.bind(session.user.id)
		.bind(author_id)
		.execute(&database)
		.await?;

	if status.rows_affected() == 0 {
		return Err(Error::NotFollowing(path.username).into());
	}

	tracing::info!(user = %session.user.username, author = %path.username, "unfollowed author");

	Ok(Json(
		follow_state(&database, &session, path.username, author_id).await?,
	))
}
