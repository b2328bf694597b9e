use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("only staff may browse the site content")]
	NotStaff,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/posts", get_with(list_posts, list_posts_docs))
		.api_route("/comments", get_with(list_comments, list_comments_docs))
		.api_route("/follows", get_with(list_follows, list_follows_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::NotStaff => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::NotStaff => error::Message::new("not_staff").into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_listings_require_staff() {
		let app = app().await;
		let leo = app.user("leo").await;

		for path in ["/posts", "/comments", "/follows"] {
			assert_eq!(app.server.get(path).await.status_code(), 401, "{path}");
			assert_eq!(app.server.get(path).as_user(&leo).await.status_code(), 403, "{path}");
		}
	}

	#[tokio::test]
	async fn test_search_posts() {
		let app = app().await;
		let admin = app.staff("admin").await;
		let leo = app.user("leo").await;
		let cats = app.group("cats").await;

		app.post(&leo, "All about CATS", Some(cats)).await;
		app.post(&leo, "All about dogs", None).await;
		app.post(&admin, "100% cats", None).await;

		let response = app.server.get("/posts").as_user(&admin).await;
		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["count"], 3);

		let response = app
			.server
			.get("/posts")
			.add_query_param("search", "cats")
			.as_user(&admin)
			.await;
		let page = response.json::<Value>();
		assert_eq!(page["count"], 2);
		assert_eq!(page["items"][0]["text"], "100% cats");
		assert_eq!(page["items"][1]["group_slug"], "cats");

		// Wildcards in the search text are matched literally.
		let response = app
			.server
			.get("/posts")
			.add_query_param("search", "%")
			.as_user(&admin)
			.await;
		assert_eq!(response.json::<Value>()["count"], 1);
	}

	#[tokio::test]
	async fn test_search_comments() {
		let app = app().await;
		let admin = app.staff("admin").await;
		let leo = app.user("leo").await;
		let taya = app.user("taya").await;
		let post = app.post(&leo, "Hello", None).await;

		app.comment(&leo, "leo", post, "first comment").await;
		app.comment(&taya, "leo", post, "second comment").await;

		let response = app.server.get("/comments").as_user(&admin).await;
		let page = response.json::<Value>();
		assert_eq!(page["count"], 2);
		assert_eq!(page["items"][0]["text"], "second comment");

		let response = app
			.server
			.get("/comments")
			.add_query_param("search", "first")
			.as_user(&admin)
			.await;
		assert_eq!(response.json::<Value>()["count"], 1);

		let response = app
			.server
			.get("/comments")
			.add_query_param("search", "taya")
			.as_user(&admin)
			.await;
		let page = response.json::<Value>();
		assert_eq!(page["count"], 1);
		assert_eq!(page["items"][0]["author"], "taya");
	}

	#[tokio::test]
	async fn test_search_follows() {
		let app = app().await;
		let admin = app.staff("admin").await;
		let leo = app.user("leo").await;
		let taya = app.user("taya").await;
		app.user("alex").await;

		app.server.post("/alex/follow").as_user(&leo).await;
		app.server.post("/alex/follow").as_user(&taya).await;
		app.server.post("/taya/follow").as_user(&leo).await;

		let response = app.server.get("/follows").as_user(&admin).await;
		assert_eq!(response.json::<Value>()["count"], 3);

		let response = app
			.server
			.get("/follows")
			.add_query_param("search", "alex")
			.as_user(&admin)
			.await;
		let page = response.json::<Value>();
		assert_eq!(page["count"], 2);
		assert_eq!(page["items"][0]["user"], "taya");
		assert_eq!(page["items"][0]["author"], "alex");
	}
}
