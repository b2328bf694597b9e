use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, media, AppState};

pub mod feed;
pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(String),
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("unknown group {0}")]
	UnknownGroup(i64),
	#[error("post {0} belongs to another user")]
	NotAuthor(i64),
	#[error("image error: {0}")]
	Image(#[from] media::Error),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(index, index_docs))
		.api_route(
			"/new",
			get_with(new_post_form, new_post_form_docs).post_with(new_post, new_post_docs),
		)
		.api_route("/:username", get_with(profile, profile_docs))
		.api_route(
			"/:username/:post_id",
			get_with(post_view, post_view_docs).delete_with(post_delete, post_delete_docs),
		)
		.api_route(
			"/:username/:post_id/edit",
			get_with(post_edit_form, post_edit_form_docs).post_with(post_edit, post_edit_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) | Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::UnknownGroup(..) => StatusCode::BAD_REQUEST,
			Self::NotAuthor(..) => StatusCode::FORBIDDEN,
			Self::Image(media::Error::Io(..)) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::Image(..) => StatusCode::BAD_REQUEST,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownUser(username) => error::Message::new("unknown_user")
				.detail("username", username.as_str())
				.into_vec(),
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", *post)
				.into_vec(),
			Self::UnknownGroup(group) => error::Message::new("unknown_group")
				.field("group")
				.detail("group", *group)
				.into_vec(),
			Self::NotAuthor(post) => error::Message::new("not_author")
				.detail("post", *post)
				.into_vec(),
			Self::Image(media::Error::Io(..)) => Vec::new(),
			Self::Image(error) => error::Message::new(error.to_string())
				.field("image")
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use image::ImageFormat;

	use crate::{
		media::test::{encoded, SMALL_GIF},
		test::*,
	};

	#[tokio::test]
	async fn test_public_pages() {
		let app = app().await;
		let leo = app.user("leo").await;
		let group = app.group("test-slug").await;
		let post = app.post(&leo, "Test post text", Some(group)).await;

		for path in [
			"/".to_owned(),
			"/group/test-slug".to_owned(),
			"/leo".to_owned(),
			format!("/leo/{post}"),
		] {
			let response = app.server.get(&path).await;
			assert_eq!(response.status_code(), 200, "{path}");
		}
	}

	#[tokio::test]
	async fn test_missing_pages() {
		let app = app().await;
		let leo = app.user("leo").await;
		app.user("tolstoy").await;
		let post = app.post(&leo, "Test post text", None).await;

		for path in [
			"/false_page".to_owned(),
			format!("/tolstoy/{post}"),
			"/leo/9999".to_owned(),
			"/leo/not-a-number".to_owned(),
			"/group/missing".to_owned(),
		] {
			let response = app.server.get(&path).await;
			assert_eq!(response.status_code(), 404, "{path}");
		}
	}

	#[tokio::test]
	async fn test_trailing_slash() {
		let app = app().await;
		let leo = app.user("leo").await;
		let post = app.post(&leo, "Test post text", None).await;

		let response = app.server.get(&format!("/leo/{post}/")).await;
		assert_eq!(response.status_code(), 200);

		let response = app
			.server
			.post("/new/")
			.as_user(&leo)
			.json(&json!({ "text": "with a slash" }))
			.await;
		assert_eq!(response.status_code(), 200);
	}

	#[tokio::test]
	async fn test_new_post_requires_login() {
		let app = app().await;

		let response = app
			.server
			.post("/new")
			.json(&json!({ "text": "anonymous" }))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_new_post_form() {
		let app = app().await;
		let leo = app.user("leo").await;
		app.group("dogs").await;
		app.group("cats").await;

		assert_eq!(app.server.get("/new").await.status_code(), 401);

		let response = app.server.get("/new").as_user(&leo).await;
		assert_eq!(response.status_code(), 200);

		let groups = response.json::<Value>()["groups"].clone();
		assert_eq!(groups.as_array().unwrap().len(), 2);
		assert_eq!(groups[0]["slug"], "cats");
	}

	#[tokio::test]
	async fn test_new_post_with_png_and_jpeg() {
		let app = app().await;
		let leo = app.user("leo").await;

		for (format, extension) in [(ImageFormat::Png, ".png"), (ImageFormat::Jpeg, ".jpg")] {
			let response = app
				.server
				.post("/new")
				.as_user(&leo)
				.json(&json!({
					"text": "Post with an image",
					"image": STANDARD.encode(encoded(format)),
				}))
				.await;

			assert_eq!(response.status_code(), 200, "{extension}");

			let post = response.json::<Value>();
			assert!(post["image"].as_str().unwrap().ends_with(extension), "{post}");
		}
	}

	#[tokio::test]
	async fn test_new_post_with_group_and_image() {
		let app = app().await;
		let leo = app.user("leo").await;
		let group = app.group("test-slug").await;

		let response = app
			.server
			.post("/new")
			.as_user(&leo)
			.json(&json!({
				"text": "Post with an image",
				"group": group,
				"image": STANDARD.encode(SMALL_GIF),
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let post = response.json::<Value>();
		assert_eq!(post["text"], "Post with an image");
		assert_eq!(post["author"], "leo");
		assert_eq!(post["group_slug"], "test-slug");

		let image = post["image"].as_str().unwrap();
		assert!(image.starts_with("/media/posts/"));

		let response = app.server.get(image).await;
		assert_eq!(response.status_code(), 200);
		assert_eq!(response.as_bytes().as_ref(), SMALL_GIF);

		let response = app.server.get("/").await;
		assert_eq!(response.json::<Value>()["items"][0]["image"], image);
	}

	#[tokio::test]
	async fn test_new_post_validation() {
		let app = app().await;
		let leo = app.user("leo").await;

		let cases = [
			(json!({ "text": "" }), "text"),
			(json!({ "text": "   " }), "text"),
			(json!({ "text": 5 }), "text"),
			(json!({ "text": "hello", "group": "cats" }), "group"),
			(json!({ "text": "hello", "group": 42 }), "group"),
			(json!({ "text": "hello", "image": STANDARD.encode(b"not an image") }), "image"),
		];

		for (body, field) in cases {
			let response = app.server.post("/new").as_user(&leo).json(&body).await;

			assert_eq!(response.status_code(), 400, "{body}");
			assert_eq!(response.json::<Value>()["errors"][0]["field"], field, "{body}");
		}

		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post")
			.fetch_one(&app.state.database)
			.await
			.unwrap();
		assert_eq!(count, 0);
	}

	#[tokio::test]
	async fn test_edit_post_permissions() {
		let app = app().await;
		let leo = app.user("leo").await;
		let other = app.user("other").await;
		let post = app.post(&leo, "Original text", None).await;
		let path = format!("/leo/{post}/edit");

		assert_eq!(app.server.get(&path).await.status_code(), 401);
		assert_eq!(app.server.get(&path).as_user(&other).await.status_code(), 403);
		assert_eq!(app.server.get(&path).as_user(&leo).await.status_code(), 200);

		let response = app
			.server
			.post(&path)
			.as_user(&other)
			.json(&json!({ "text": "Hijacked" }))
			.await;
		assert_eq!(response.status_code(), 403);

		let response = app.server.get(&format!("/leo/{post}")).await;
		assert_eq!(response.json::<Value>()["post"]["text"], "Original text");
	}

	#[tokio::test]
	async fn test_edit_post() {
		let app = app().await;
		let leo = app.user("leo").await;
		let group = app.group("test-slug").await;
		let post = app.post(&leo, "Original text", Some(group)).await;

		let response = app
			.server
			.post(&format!("/leo/{post}/edit"))
			.as_user(&leo)
			.json(&json!({
				"text": "Edited text",
				"image": STANDARD.encode(SMALL_GIF),
			}))
			.await;

		assert_eq!(response.status_code(), 200);
		let edited = response.json::<Value>();
		assert_eq!(edited["id"], post);
		assert_eq!(edited["text"], "Edited text");
		assert!(edited["group_id"].is_null());
		let image = edited["image"].clone();
		assert!(image.is_string());

		// Leaving the image out keeps the current one.
		let response = app
			.server
			.post(&format!("/leo/{post}/edit"))
			.as_user(&leo)
			.json(&json!({ "text": "Edited again", "group": group }))
			.await;

		let edited = response.json::<Value>();
		assert_eq!(edited["image"], image);
		assert_eq!(edited["group_slug"], "test-slug");

		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post")
			.fetch_one(&app.state.database)
			.await
			.unwrap();
		assert_eq!(count, 1);
	}

	#[tokio::test]
	async fn test_delete_post_cascades_comments() {
		let app = app().await;
		let leo = app.user("leo").await;
		let other = app.user("other").await;
		let post = app.post(&leo, "Soon gone", None).await;
		app.comment(&other, "leo", post, "first").await;

		let path = format!("/leo/{post}");
		assert_eq!(app.server.get("/").await.json::<Value>()["count"], 1);
		assert_eq!(app.server.delete(&path).as_user(&other).await.status_code(), 403);
		assert_eq!(app.server.delete(&path).as_user(&leo).await.status_code(), 200);
		assert_eq!(app.server.get(&path).await.status_code(), 404);
		assert_eq!(app.server.get("/").await.json::<Value>()["count"], 0);

		let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comment")
			.fetch_one(&app.state.database)
			.await
			.unwrap();
		assert_eq!(comments, 0);
	}

	#[tokio::test]
	async fn test_paginator() {
		let app = app().await;
		let leo = app.user("leo").await;
		let group = app.group("test-slug").await;

		for i in 0..13 {
			app.post(&leo, &format!("Post {i}"), Some(group)).await;
		}

		for path in ["/group/test-slug", "/leo"] {
			let response = app.server.get(path).await;
			let body = response.json::<Value>();
			let page = body.get("page").unwrap();

			assert_eq!(page["items"].as_array().unwrap().len(), 10, "{path}");
			assert_eq!(page["count"], 13, "{path}");
			assert_eq!(page["num_pages"], 2, "{path}");
			assert_eq!(page["has_next"], true, "{path}");

			let response = app.server.get(path).add_query_param("page", 2).await;
			let body = response.json::<Value>();

			assert_eq!(body["page"]["items"].as_array().unwrap().len(), 3, "{path}");
			assert_eq!(body["page"]["has_previous"], true, "{path}");
		}

		let response = app.server.get("/").add_query_param("page", 2).await;
		let page = response.json::<Value>();
		assert_eq!(page["number"], 2);
		assert_eq!(page["items"].as_array().unwrap().len(), 3);
		assert_eq!(page["items"][2]["text"], "Post 0");

		let response = app.server.get("/").add_query_param("page", "abc").await;
		assert_eq!(response.json::<Value>()["number"], 1);
		assert_eq!(response.json::<Value>()["items"][0]["text"], "Post 12");

		for path in ["/", "/leo", "/group/test-slug"] {
			let response = app.server.get(path).add_query_param("page", 99).await;
			let body = response.json::<Value>();
			let page = if path == "/" { &body } else { &body["page"] };

			assert_eq!(response.status_code(), 200, "{path}");
			assert_eq!(page["number"], 2, "{path}");
			assert_eq!(page["items"].as_array().unwrap().len(), 3, "{path}");
		}
	}

	#[tokio::test]
	async fn test_profile_context() {
		let app = app().await;
		let leo = app.user("leo").await;
		let fan = app.user("fan").await;
		app.post(&leo, "Hello", None).await;

		app.server.post("/leo/follow").as_user(&fan).await;

		let response = app.server.get("/leo").as_user(&fan).await;
		let profile = response.json::<Value>();

		assert_eq!(profile["author"]["username"], "leo");
		assert_eq!(profile["follow"], true);
		assert_eq!(profile["followers"], 1);
		assert_eq!(profile["following"], 0);
		assert_eq!(profile["page"]["count"], 1);

		let response = app.server.get("/leo").await;
		assert_eq!(response.json::<Value>()["follow"], false);

		let response = app.server.get("/fan").await;
		assert_eq!(response.json::<Value>()["following"], 1);
	}

	#[tokio::test]
	async fn test_index_cache() {
		let app = app().await;
		let leo = app.user("leo").await;
		app.post(&leo, "First post", None).await;

		let cached = app.server.get("/").await.text();

		app.post(&leo, "Second post", None).await;
		assert_eq!(app.server.get("/").await.text(), cached);

		app.state.index_cache.clear();
		let fresh = app.server.get("/").await;
		assert_ne!(fresh.text(), cached);
		assert_eq!(fresh.json::<Value>()["count"], 2);
	}

	#[tokio::test]
	async fn test_index_cache_per_page() {
		let app = app().await;
		let leo = app.user("leo").await;

		for i in 0..11 {
			app.post(&leo, &format!("Post {i}"), None).await;
		}

		assert_eq!(app.server.get("/").await.json::<Value>()["count"], 11);

		app.post(&leo, "Post 11", None).await;

		let response = app.server.get("/").add_query_param("page", 2).await;
		let page = response.json::<Value>();
		assert_eq!(page["number"], 2);
		assert_eq!(page["count"], 12);
		assert_eq!(page["items"].as_array().unwrap().len(), 2);

		assert_eq!(app.server.get("/").await.json::<Value>()["count"], 11);
	}
}
