use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{error, AppState};

pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(String),
	#[error("not following {0}")]
	NotFollowing(String),
}

pub type RouteError = error::RouteError<Error>;

/// The subscription state between the authenticated user and an author.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FollowState {
	pub author: String,
	pub follow: bool,
	/// The number of users following the author.
	pub followers: i64,
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/follow", get_with(follow_index, follow_index_docs))
		.api_route(
			"/:username/follow",
			post_with(profile_follow, profile_follow_docs),
		)
		.api_route(
			"/:username/unfollow",
			post_with(profile_unfollow, profile_unfollow_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) | Self::NotFollowing(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let (content, username) = match self {
			Self::UnknownUser(username) => ("unknown_user", username),
			Self::NotFollowing(username) => ("not_following", username),
		};

		error::Message::new(content)
			.detail("username", username.as_str())
			.into_vec()
	}
}
