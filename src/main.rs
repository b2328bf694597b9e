#![warn(clippy::pedantic)]

mod cache;
mod config;
mod error;
mod extract;
mod media;
mod openapi;
mod route;
mod session;
mod trace;

use std::{str::FromStr, sync::Arc, time::Duration};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{body::Body, http::Response, Extension, Router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::Layer;
use tower_http::{normalize_path::NormalizePathLayer, services::ServeDir, trace::TraceLayer};
use tracing::Span;

pub use cache::IndexCache;
pub use config::Config;
pub use media::Media;

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub type AppState = State;

/// The shared application state.
///
/// Handlers extract only the parts they need, e.g. `State<Database>`.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub index_cache: IndexCache,
	pub media: Media,
}

/// Opens the database and brings its schema up to date.
pub async fn connect(url: &str) -> Result<Database, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
	let database = SqlitePoolOptions::new().connect_with(options).await?;

	sqlx::migrate!().run(&database).await?;

	Ok(database)
}

/// Builds the application router, including the `OpenAPI` documentation.
///
/// Trailing slashes are trimmed before routing, so `/new/` and `/new` match
/// the same route.
pub fn app(state: State) -> Router {
	let mut api = OpenApi::default();
	let media_root = state.media.root().to_path_buf();

	let router = ApiRouter::new()
		.nest("/auth", route::auth::routes())
		.nest("/docs", route::docs::routes())
		.merge(route::admin::routes())
		.merge(route::group::routes())
		.merge(route::follow::routes())
		.merge(route::comment::routes())
		.merge(route::post::routes())
		.finish_api_with(&mut api, openapi::docs)
		.nest_service(media::MEDIA_URL, ServeDir::new(media_root))
		.fallback(route::not_found)
		.layer(Extension(Arc::new(api)))
		.layer(
			TraceLayer::new_for_http().on_response(
				|response: &Response<Body>, latency: Duration, _span: &Span| {
					tracing::info!(
						histogram.http_latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
						status = response.status().as_u16(),
						"finished processing request"
					);
				},
			),
		)
		.with_state(state);

	Router::new().fallback_service(NormalizePathLayer::trim_trailing_slash().layer(router))
}

#[tokio::main]
async fn main() {
	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init_tracing_subscriber(config.otlp_enabled);

	let state = State {
		database: connect(&config.database_url)
			.await
			.expect("failed to connect to database"),
		hasher: Argon2::default(),
		index_cache: IndexCache::new(config.index_cache_ttl),
		media: Media::new(config.media_root.clone()),
	};

	let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", config.port);

	axum::serve(listener, app(state))
		.await
		.expect("server error");
}
