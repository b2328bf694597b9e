use std::num::IntErrorKind;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of posts on every feed page.
pub const PAGE_SIZE: i64 = 10;

/// The `?page=` query parameter of a feed.
///
/// Kept as a raw string so that garbage falls back to the first page
/// instead of being rejected.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PageInput {
	/// The page number to return (1-indexed). Out of range values return the last page.
	pub page: Option<String>,
}

/// The `?search=` query parameter of the listings that can be searched.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct SearchInput {
	/// Only return entries containing this text, ignoring ASCII case.
	#[validate(length(max = 100))]
	pub search: Option<String>,
}

impl SearchInput {
	/// The `LIKE` pattern matching the search text, escaped with `\`.
	///
	/// Blank searches match everything and return `None`.
	pub fn pattern(&self) -> Option<String> {
		let search = self.search.as_deref()?.trim();

		if search.is_empty() {
			return None;
		}

		let escaped = search
			.replace('\\', "\\\\")
			.replace('%', "\\%")
			.replace('_', "\\_");

		Some(format!("%{escaped}%"))
	}
}

/// Splits `count` items into pages of `per_page`.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
	pub count: i64,
	pub per_page: i64,
}

impl Paginator {
	pub fn new(count: i64) -> Self {
		Self {
			count,
			per_page: PAGE_SIZE,
		}
	}

	/// The number of pages, which is at least 1 even when there are no items.
	pub fn num_pages(&self) -> i64 {
		if self.count <= 0 {
			1
		} else {
			(self.count + self.per_page - 1) / self.per_page
		}
	}

	/// Resolves a requested page number.
	///
	/// A missing or non-integer page is the first page, anything outside
	/// of the valid range is the last page. Integers too large for an
	/// `i64` are out of range too.
	pub fn number(&self, requested: Option<&str>) -> i64 {
		let Some(page) = requested.map(str::trim) else {
			return 1;
		};

		match page.parse::<i64>() {
			Ok(number) if (1..=self.num_pages()).contains(&number) => number,
			Ok(..) => self.num_pages(),
			Err(error) if matches!(error.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
				self.num_pages()
			}
			Err(..) => 1,
		}
	}

	pub fn offset(&self, number: i64) -> i64 {
		(number - 1) * self.per_page
	}

	pub fn limit(&self) -> i64 {
		self.per_page
	}

	/// Wraps the items of page `number` with the paginator's metadata.
	pub fn page<T>(&self, number: i64, items: Vec<T>) -> Page<T> {
		let num_pages = self.num_pages();

		Page {
			number,
			num_pages,
			count: self.count,
			has_next: number < num_pages,
			has_previous: number > 1,
			items,
		}
	}
}

/// A single page of a paginated feed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Page<T> {
	/// The 1-indexed number of this page.
	pub number: i64,
	/// The total number of pages.
	pub num_pages: i64,
	/// The total number of items across all pages.
	pub count: i64,
	pub has_next: bool,
	pub has_previous: bool,
	pub items: Vec<T>,
}
