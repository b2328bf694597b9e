use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session},
	media::Media,
	openapi::tag,
	route::{auth::model::User, comment::model::Comment, group::model::Group},
	AppState, Database, IndexCache,
};

use super::{
	feed::Feed,
	model::{self, POST_SELECT},
	Error, RouteError,
};

async fn find_author(database: &Database, username: &str) -> Result<User, RouteError> {
	let author = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE username = $1"#)
		.bind(username)
		.fetch_optional(database)
		.await?;

	author.ok_or_else(|| Error::UnknownUser(username.to_owned()).into())
}

/// Fetches a post by id, but only if it was written by `username`.
pub(crate) async fn find_post(
	database: &Database,
	username: &str,
	post_id: i64,
) -> Result<model::Post, RouteError> {
	let post = sqlx::query_as::<_, model::Post>(&format!(
		r#"{POST_SELECT} WHERE post.id = $1 AND "user".username = $2"#
	))
	.bind(post_id)
	.bind(username)
	.fetch_optional(database)
	.await?;

	post.ok_or_else(|| Error::UnknownPost(post_id).into())
}

async fn find_owned_post(
	database: &Database,
	session: &Session,
	path: &model::PostPath,
) -> Result<model::Post, RouteError> {
	let post = find_post(database, &path.username, path.post_id).await?;

	if post.author_id != session.user.id {
		return Err(Error::NotAuthor(post.id).into());
	}

	Ok(post)
}

async fn ensure_group(database: &Database, group: Option<i64>) -> Result<(), RouteError> {
	let Some(group) = group else {
		return Ok(());
	};

	let exists = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "group" WHERE id = $1"#)
		.bind(group)
		.fetch_one(database)
		.await?;

	if exists == 0 {
		return Err(Error::UnknownGroup(group).into());
	}

	Ok(())
}

async fn save_image(media: &Media, image: Option<&str>) -> Result<Option<String>, RouteError> {
	match image {
		Some(image) => Ok(Some(media.save_post_image(image).await.map_err(Error::Image)?)),
		None => Ok(None),
	}
}

/// Home page
/// Returns a page of all posts, newest first. Pages are cached for a short while,
/// so new posts may take a moment to appear.
#[route(tag = tag::POST)]
pub async fn index(
	State(database): State<Database>,
	State(cache): State<IndexCache>,
	Query(input): Query<model::PageInput>,
) -> Result<Json<model::Page<model::Post>>, RouteError> {
	if let Some(page) = cache.get(&input.page).await {
		return Ok(Json(page));
	}

	let page = Feed::All.page(&database, input.page.as_deref()).await?;
	cache.insert(input.page, page.clone()).await;

	Ok(Json(page))
}

/// New post form
/// Returns the groups that a new post can be published in.
#[route(tag = tag::POST)]
pub async fn new_post_form(
	State(database): State<Database>,
	_session: Session,
) -> Result<Json<model::PostForm>, RouteError> {
	let groups = sqlx::query_as::<_, Group>(r#"SELECT * FROM "group" ORDER BY title, id"#)
		.fetch_all(&database)
		.await?;

	Ok(Json(model::PostForm { groups }))
}

/// Create post
/// Publishes a new post written by the authenticated user.
#[route(tag = tag::POST)]
pub async fn new_post(
	State(state): State<AppState>,
	session: Session,
	Json(input): Json<model::PostInput>,
) -> Result<Json<model::Post>, RouteError> {
	ensure_group(&state.database, input.group).await?;
	let image = save_image(&state.media, input.image.as_deref()).await?;

	let post_id = sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO post (text, created_at, author_id, group_id, image)
			VALUES ($1, $2, $3, $4, $5)
			RETURNING id
		"#,
	)
	.bind(&input.text)
	.bind(chrono::Utc::now())
	.bind(session.user.id)
	.bind(input.group)
	.bind(&image)
	.fetch_one(&state.database)
	.await?;

	tracing::info!(post = post_id, author = %session.user.username, "post created");

	Ok(Json(find_post(&state.database, &session.user.username, post_id).await?))
}

/// Get profile
/// Returns an author together with a page of their posts and follower counts.
#[route(tag = tag::POST)]
pub async fn profile(
	State(database): State<Database>,
	session: Option<Session>,
	Path(path): Path<model::ProfilePath>,
	Query(input): Query<model::PageInput>,
) -> Result<Json<model::Profile>, RouteError> {
	let author = find_author(&database, &path.username).await?;

	let (followers, following) = sqlx::query_as::<_, (i64, i64)>(
		r#"
			SELECT
				(SELECT COUNT(*) FROM follow WHERE author_id = $1),
				(SELECT COUNT(*) FROM follow WHERE user_id = $1)
		"#,
	)
	.bind(author.id)
	.fetch_one(&database)
	.await?;

	let follow = match session {
		Some(session) => {
			sqlx::query_scalar::<_, i64>(
				"SELECT COUNT(*) FROM follow WHERE user_id = $1 AND author_id = $2",
			)
			.bind(session.user.id)
			.bind(author.id)
			.fetch_one(&database)
			.await? > 0
		}
		None => false,
	};

	let page = Feed::Author(author.id)
		.page(&database, input.page.as_deref())
		.await?;

	Ok(Json(model::Profile {
		author,
		follow,
		followers,
		following,
		page,
	}))
}

/// Get post
/// Returns a single post by its author and id, with its comments.
#[route(tag = tag::POST)]
pub async fn post_view(
	State(database): State<Database>,
	Path(path): Path<model::PostPath>,
) -> Result<Json<model::PostDetail>, RouteError> {
	let post = find_post(&database, &path.username, path.post_id).await?;
	let author = find_author(&database, &path.username).await?;

	let author_posts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post WHERE author_id = $1")
		.bind(author.id)
		.fetch_one(&database)
		.await?;

	let comments = sqlx::query_as::<_, Comment>(
		r#"
			SELECT comment.*, "user".username AS author FROM comment
			JOIN "user" ON "user".id = comment.author_id
			WHERE comment.post_id = $1
			ORDER BY comment.created_at DESC, comment.id DESC
		"#,
	)
	.bind(post.id)
	.fetch_all(&database)
	.await?;

	Ok(Json(model::PostDetail {
		author,
		post,
		author_posts,
		comment_count: i64::try_from(comments.len()).unwrap_or(i64::MAX),
		comments,
	}))
}

/// Get post for editing
/// Returns a post so that its author can edit it. Only the author may access this.
#[route(tag = tag::POST)]
pub async fn post_edit_form(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::PostPath>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(find_owned_post(&database, &session, &path).await?))
}

/// Edit post
/// Replaces the text and group of a post. The image is only replaced when a new one is sent.
#[route(tag = tag::POST)]
pub async fn post_edit(
	State(state): State<AppState>,
	session: Session,
	Path(path): Path<model::PostPath>,
	Json(input): Json<model::PostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = find_owned_post(&state.database, &session, &path).await?;

	ensure_group(&state.database, input.group).await?;
	let image = save_image(&state.media, input.image.as_deref()).await?;

	sqlx::query(
		r#"
			UPDATE post
			SET text = $1, group_id = $2, image = COALESCE($3, image)
			WHERE id = $4
		"#,
	)
	.bind(&input.text)
	.bind(input.group)
	.bind(&image)
	.bind(post.id)
	.execute(&state.database)
	.await?;

	tracing::info!(post = post.id, "post edited");

	Ok(Json(find_post(&state.database, &path.username, post.id).await?))
}

/// Delete post
/// Deletes a post and its comments. Only the author may do this.
#[route(tag = tag::POST)]
pub async fn post_delete(
	State(database): State<Database>,
	State(cache): State<IndexCache>,
	session: Session,
	Path(path): Path<model::PostPath>,
) -> Result<(), RouteError> {
	let post = find_owned_post(&database, &session, &path).await?;

	sqlx::query("DELETE FROM post WHERE id = $1")
		.bind(post.id)
		.execute(&database)
		.await?;

	// Deleted posts must not linger on the home page.
	cache.clear();

	tracing::info!(post = post.id, "post deleted");

	Ok(())
}

