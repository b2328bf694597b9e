use std::time::Duration;

use moka::future::Cache;

use crate::route::{model::Page, post::model::Post};

/// Caches the home page per requested `?page=` value.
///
/// New posts do not invalidate entries, so they only show up on the home
/// page once the entry expires. Deletions clear the whole cache.
#[derive(Clone)]
pub struct IndexCache {
	inner: Cache<Option<String>, Page<Post>>,
}

impl IndexCache {
	pub fn new(ttl: Duration) -> Self {
		Self {
			inner: Cache::builder().max_capacity(256).time_to_live(ttl).build(),
		}
	}

	pub async fn get(&self, page: &Option<String>) -> Option<Page<Post>> {
		self.inner.get(page).await
	}

	pub async fn insert(&self, page: Option<String>, value: Page<Post>) {
		self.inner.insert(page, value).await;
	}

	pub fn clear(&self) {
		self.inner.invalidate_all();
	}
}
