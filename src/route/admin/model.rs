pub use crate::route::model::{Page, PageInput, SearchInput};

use schemars::JsonSchema;
use serde::Serialize;

/// A subscription of one user to an author.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Follow {
	pub id: i64,
	/// The username of the subscriber.
	pub user: String,
	/// The username of the followed author.
	pub author: String,
}
