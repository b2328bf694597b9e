pub use crate::route::model::{Page, PageInput};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
	media,
	route::{auth::model::User, comment::model::Comment, group::model::Group},
};

/// Columns of [`Post`], joined with its author and group.
pub(crate) const POST_SELECT: &str = r#"
	SELECT
		post.id, post.text, post.created_at, post.author_id,
		"user".username AS author,
		post.group_id, "group".slug AS group_slug, "group".title AS group_title,
		post.image
	FROM post
	JOIN "user" ON "user".id = post.author_id
	LEFT JOIN "group" ON "group".id = post.group_id
"#;

pub(crate) const POST_ORDER: &str = "ORDER BY post.created_at DESC, post.id DESC";

pub(crate) fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
	if text.trim().is_empty() {
		return Err(ValidationError::new("must not be blank"));
	}

	Ok(())
}

fn serialize_image<S: Serializer>(image: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
	image.as_deref().map(media::url).serialize(serializer)
}

/// A single post, created by a user.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	pub id: i64,
	/// The text of the post.
	pub text: String,
	/// The creation time of the post.
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The user that created the post.
	pub author_id: Uuid,
	/// The username of the author.
	pub author: String,
	/// The group the post belongs to, if any.
	pub group_id: Option<i64>,
	pub group_slug: Option<String>,
	pub group_title: Option<String>,
	/// The URL of the attached image, if any.
	#[serde(serialize_with = "serialize_image")]
	pub image: Option<String>,
}

/// The body of the new post and edit post forms.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PostInput {
	/// The text of the post.
	#[validate(length(min = 1), custom(function = "validate_not_blank"))]
	pub text: String,
	/// The id of the group to publish the post in.
	pub group: Option<i64>,
	/// A base64-encoded GIF, PNG or JPEG image. When editing, leaving this out
	/// keeps the current image.
	pub image: Option<String>,
}

/// What the new post form needs to be filled in.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostForm {
	/// The groups a post can be published in, ordered by title.
	pub groups: Vec<Group>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProfilePath {
	pub username: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PostPath {
	pub username: String,
	pub post_id: i64,
}

/// An author's profile page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Profile {
	pub author: User,
	/// Whether the requesting user follows the author.
	pub follow: bool,
	/// The number of users following the author.
	pub followers: i64,
	/// The number of authors the author follows.
	pub following: i64,
	pub page: Page<Post>,
}

/// A single post with its comments.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostDetail {
	pub author: User,
	pub post: Post,
	/// The number of posts the author has published.
	pub author_posts: i64,
	/// The number of comments on the post.
	pub comment_count: i64,
	/// Comments on the post, newest first.
	pub comments: Vec<Comment>,
}
