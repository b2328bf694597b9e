use sqlx::{query::QueryAs, sqlite::SqliteArguments, Sqlite};
use uuid::Uuid;

use crate::{
	route::model::{Page, Paginator},
	Database,
};

use super::model::{Post, POST_ORDER, POST_SELECT};

/// A paginated list of posts, newest first.
#[derive(Debug, Clone, Copy)]
pub enum Feed {
	/// Every post.
	All,
	/// Posts published in a group.
	Group(i64),
	/// Posts written by a user.
	Author(Uuid),
	/// Posts written by the authors a user follows.
	FollowedBy(Uuid),
}

impl Feed {
	fn filter(self) -> &'static str {
		match self {
			Self::All => "",
			Self::Group(..) => "WHERE post.group_id = $1",
			Self::Author(..) => "WHERE post.author_id = $1",
			Self::FollowedBy(..) => {
				"JOIN follow ON follow.author_id = post.author_id WHERE follow.user_id = $1"
			}
		}
	}

	/// Index of the first placeholder after the filter's own.
	fn next_param(self) -> usize {
		match self {
			Self::All => 1,
			_ => 2,
		}
	}

	fn bind<'q, O>(
		self,
		query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
	) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
		match self {
			Self::All => query,
			Self::Group(id) => query.bind(id),
			Self::Author(id) | Self::FollowedBy(id) => query.bind(id),
		}
	}

	/// Fetches the requested page, falling back to the first or last page
	/// the same way [`Paginator::number`] does.
	pub async fn page(self, database: &Database, requested: Option<&str>) -> Result<Page<Post>, sqlx::Error> {
		let count_sql = format!("SELECT COUNT(*) FROM post {}", self.filter());
		let (count,) = self
			.bind(sqlx::query_as::<_, (i64,)>(&count_sql))
			.fetch_one(database)
			.await?;

		let paginator = Paginator::new(count);
		let number = paginator.number(requested);

		let param = self.next_param();
		let items_sql = format!(
			"{POST_SELECT} {} {POST_ORDER} LIMIT ${} OFFSET ${}",
			self.filter(),
			param,
			param + 1,
		);
		let items = self
			.bind(sqlx::query_as::<_, Post>(&items_sql))
			.bind(paginator.limit())
			.bind(paginator.offset(number))
			.fetch_all(database)
			.await?;

		Ok(paginator.page(number, items))
	}
}
