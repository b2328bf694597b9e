pub use crate::route::model::{Page, PageInput, SearchInput};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::route::post::model::Post;

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
	if !slug
		.chars()
		.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
	{
		return Err(ValidationError::new(
			"slug may only contain letters, digits, hyphens and underscores",
		));
	}

	Ok(())
}

/// Longest slug a group may have.
const SLUG_LENGTH: usize = 50;

/// Builds a slug out of a title.
///
/// Russian letters are transliterated and other ASCII letters and digits are
/// kept. Every other run of characters becomes a single hyphen.
pub fn slugify(title: &str) -> String {
	let mut slug = String::with_capacity(title.len());

	for c in title.chars().flat_map(char::to_lowercase) {
		if c.is_ascii_alphanumeric() {
			slug.push(c);
		} else if let Some(latin) = transliterate(c) {
			slug.push_str(latin);
		} else if !slug.is_empty() && !slug.ends_with('-') {
			slug.push('-');
		}
	}

	let slug: String = slug.chars().take(SLUG_LENGTH).collect();
	slug.trim_end_matches('-').to_owned()
}

fn transliterate(c: char) -> Option<&'static str> {
	Some(match c {
		'а' => "a",
		'б' => "b",
		'в' => "v",
		'г' => "g",
		'д' => "d",
		'е' => "e",
		'ё' => "yo",
		'ж' => "zh",
		'з' => "z",
		'и' => "i",
		'й' => "j",
		'к' => "k",
		'л' => "l",
		'м' => "m",
		'н' => "n",
		'о' => "o",
		'п' => "p",
		'р' => "r",
		'с' => "s",
		'т' => "t",
		'у' => "u",
		'ф' => "f",
		'х' => "h",
		'ц' => "c",
		'ч' => "ch",
		'ш' | 'щ' => "sh",
		'ъ' | 'ь' => "",
		'ы' => "y",
		'э' => "e",
		'ю' => "yu",
		'я' => "ya",
		_ => return None,
	})
}

/// A named category of posts.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Group {
	/// The unique identifier of the group.
	pub id: i64,
	/// A short title for the group.
	pub title: String,
	/// The unique key used in the group's address.
	pub slug: String,
	/// What the group is about.
	pub description: String,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CreateGroupInput {
	/// A short title for the group.
	#[validate(length(min = 1, max = 200))]
	pub title: String,
	/// The unique key used in the group's address. Built from the title when left out.
	#[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
	pub slug: Option<String>,
	/// What the group is about.
	#[validate(length(min = 1))]
	pub description: String,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct UpdateGroupInput {
	#[validate(length(min = 1, max = 200))]
	pub title: Option<String>,
	#[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
	pub slug: Option<String>,
	#[validate(length(min = 1))]
	pub description: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GroupPath {
	pub slug: String,
}

/// A group together with a page of its posts.
#[derive(Debug, Serialize, JsonSchema)]
pub struct GroupPage {
	pub group: Group,
	pub page: Page<Post>,
}
