use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown group {0}")]
	UnknownGroup(String),
	#[error("slug {0} is already taken")]
	SlugTaken(String),
	#[error("only staff may manage groups")]
	NotStaff,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/groups",
			get_with(list_groups, list_groups_docs).post_with(create_group, create_group_docs),
		)
		.api_route(
			"/group/:slug",
			get_with(group_posts, group_posts_docs)
				.put_with(update_group, update_group_docs)
				.delete_with(delete_group, delete_group_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownGroup(..) => StatusCode::NOT_FOUND,
			Self::SlugTaken(..) => StatusCode::CONFLICT,
			Self::NotStaff => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownGroup(slug) => error::Message::new("unknown_group")
				.detail("slug", slug.as_str())
				.into_vec(),
			Self::SlugTaken(slug) => error::Message::new("slug_taken")
				.field("slug")
				.detail("slug", slug.as_str())
				.into_vec(),
			Self::NotStaff => error::Message::new("not_staff").into_vec(),
		}
	}
}

fn map_conflict(error: sqlx::Error, slug: &str) -> RouteError {
	if error::unique_violation(&error).is_some() {
		Error::SlugTaken(slug.to_owned()).into()
	} else {
		RouteError::from(error)
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_group_management_requires_staff() {
		let app = app().await;
		let leo = app.user("leo").await;
		app.group("cats").await;

		let body = json!({ "title": "Dogs", "slug": "dogs", "description": "Woof" });

		assert_eq!(app.server.post("/groups").json(&body).await.status_code(), 401);
		assert_eq!(
			app.server.post("/groups").as_user(&leo).json(&body).await.status_code(),
			403
		);
		assert_eq!(
			app.server.delete("/group/cats").as_user(&leo).await.status_code(),
			403
		);
	}

	#[tokio::test]
	async fn test_group_crud() {
		let app = app().await;
		let admin = app.staff("admin").await;

		let response = app
			.server
			.post("/groups")
			.as_user(&admin)
			.json(&json!({ "title": "Dogs", "slug": "dogs", "description": "Woof" }))
			.await;
		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["slug"], "dogs");

		let response = app
			.server
			.post("/groups")
			.as_user(&admin)
			.json(&json!({ "title": "More dogs", "slug": "dogs", "description": "Woof" }))
			.await;
		assert_eq!(response.status_code(), 409);

		let response = app
			.server
			.post("/groups")
			.as_user(&admin)
			.json(&json!({ "title": "Bad", "slug": "bad slug", "description": "x" }))
			.await;
		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "slug");

		let response = app
			.server
			.post("/groups")
			.as_user(&admin)
			.json(&json!({ "title": "x".repeat(201), "slug": "long", "description": "x" }))
			.await;
		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "title");

		let response = app
			.server
			.put("/group/dogs")
			.as_user(&admin)
			.json(&json!({ "title": "Good dogs" }))
			.await;
		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["title"], "Good dogs");
		assert_eq!(response.json::<Value>()["description"], "Woof");

		let response = app.server.get("/groups").await;
		assert_eq!(response.json::<Value>().as_array().unwrap().len(), 1);

		let response = app
			.server
			.put("/group/missing")
			.as_user(&admin)
			.json(&json!({ "title": "Nothing" }))
			.await;
		assert_eq!(response.status_code(), 404);
	}

	#[tokio::test]
	async fn test_slug_from_title() {
		let app = app().await;
		let admin = app.staff("admin").await;

		let response = app
			.server
			.post("/groups")
			.as_user(&admin)
			.json(&json!({ "title": "Лев Толстой", "description": "Books" }))
			.await;
		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["slug"], "lev-tolstoj");

		let response = app
			.server
			.post("/groups")
			.as_user(&admin)
			.json(&json!({ "title": "Лев  Толстой!", "description": "More books" }))
			.await;
		assert_eq!(response.status_code(), 409);

		let response = app
			.server
			.post("/groups")
			.as_user(&admin)
			.json(&json!({ "title": "???", "description": "Nothing" }))
			.await;
		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "slug");
	}

	#[tokio::test]
	async fn test_search_groups() {
		let app = app().await;
		app.group("cats").await;
		app.group("dogs").await;
		app.group("cat_facts").await;

		let response = app.server.get("/groups").add_query_param("search", "CAT").await;
		let groups = response.json::<Value>();
		assert_eq!(groups.as_array().unwrap().len(), 2);
		assert_eq!(groups[0]["slug"], "cat_facts");

		// `_` is not a wildcard.
		let response = app.server.get("/groups").add_query_param("search", "t_").await;
		assert_eq!(response.json::<Value>().as_array().unwrap().len(), 1);

		let response = app.server.get("/groups").add_query_param("search", " ").await;
		assert_eq!(response.json::<Value>().as_array().unwrap().len(), 3);
	}

	#[tokio::test]
	async fn test_group_feed_only_shows_group_posts() {
		let app = app().await;
		let leo = app.user("leo").await;
		let cats = app.group("cats").await;
		let dogs = app.group("dogs").await;
		app.post(&leo, "About cats", Some(cats)).await;
		app.post(&leo, "About dogs", Some(dogs)).await;
		app.post(&leo, "About nothing", None).await;

		let response = app.server.get("/group/cats").await;
		let body = response.json::<Value>();

		assert_eq!(body["group"]["slug"], "cats");
		assert_eq!(body["page"]["count"], 1);
		assert_eq!(body["page"]["items"][0]["text"], "About cats");
	}

	#[tokio::test]
	async fn test_deleting_group_keeps_posts() {
		let app = app().await;
		let admin = app.staff("admin").await;
		let cats = app.group("cats").await;
		let post = app.post(&admin, "About cats", Some(cats)).await;

		let response = app.server.delete("/group/cats").as_user(&admin).await;
		assert_eq!(response.status_code(), 200);
		assert_eq!(app.server.get("/group/cats").await.status_code(), 404);

		let response = app.server.get(&format!("/admin/{post}")).await;
		assert_eq!(response.status_code(), 200);
		assert!(response.json::<Value>()["post"]["group_id"].is_null());
	}
}
