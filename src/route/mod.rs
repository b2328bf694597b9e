use axum::{
	http::{StatusCode, Uri},
	response::IntoResponse,
	Json,
};

use crate::error::{ErrorResponse, Message};

pub mod admin;
pub mod auth;
pub mod comment;
pub mod docs;
pub mod follow;
pub mod group;
pub mod model;
pub mod post;

/// Fallback for paths that no route matches.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
	(
		StatusCode::NOT_FOUND,
		Json(ErrorResponse {
			success: false,
			errors: Message::new("not_found")
				.detail("path", uri.path())
				.into_vec(),
		}),
	)
}
