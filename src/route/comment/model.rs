use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::route::post::model::validate_not_blank;

/// A comment left on a post.
#[model]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Comment {
	/// The unique identifier of the comment.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The post that was commented on.
	#[serde(skip_deserializing)]
	pub post_id: i64,
	/// The user that wrote the comment.
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	/// The username of the author.
	#[serde(skip_deserializing)]
	pub author: String,
	/// The text of the comment.
	#[validate(length(min = 1), custom(function = "validate_not_blank"))]
	pub text: String,
	/// The creation time of the comment.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}
