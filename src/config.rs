use std::{path::PathBuf, time::Duration};

/// Runtime configuration, read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub port: u16,
	pub media_root: PathBuf,
	/// How long a rendered home page stays cached.
	pub index_cache_ttl: Duration,
	/// Export traces and metrics over OTLP in addition to stdout logging.
	pub otlp_enabled: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be a number")]
	NotANumber(&'static str),
	#[error("{0} must be `true` or `false`")]
	NotABool(&'static str),
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Ok(Self {
			database_url: var("DATABASE_URL")
				.unwrap_or_else(|| "sqlite://yatube.db?mode=rwc".into()),
			port: parse("PORT", 3000)?,
			media_root: var("MEDIA_ROOT").map_or_else(|| PathBuf::from("media"), PathBuf::from),
			index_cache_ttl: Duration::from_secs(parse("INDEX_CACHE_TTL", 20)?),
			otlp_enabled: var("OTLP_ENABLED")
				.map(|value| value.parse().map_err(|_| Error::NotABool("OTLP_ENABLED")))
				.transpose()?
				.unwrap_or(false),
		})
	}
}

fn var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, Error> {
	var(name).map_or(Ok(default), |value| {
		value.parse().map_err(|_| Error::NotANumber(name))
	})
}
