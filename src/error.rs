use std::borrow::Cow;

use aide::OperationOutput;
use axum_jsonschema::JsonSchemaRejection;
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message sent to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A short, machine-readable description of the error.
	pub content: Cow<'a, str>,
	/// The input field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional structured context.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
	pub success: bool,
	pub errors: Vec<Message<'a>>,
}

/// Describes how a route-specific error is presented to the client.
///
/// The [`std::fmt::Display`] implementation is only logged, so it may
/// contain sensitive information. Only [`ErrorShape::errors`] is sent.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message<'_>> {
		Message::new(self.to_string()).into_vec()
	}
}

/// Errors that any route can produce, independent of its domain.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0:?}")]
	Json(JsonSchemaRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

impl AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Query(..) => StatusCode::BAD_REQUEST,
			Self::Path(..) => StatusCode::NOT_FOUND,
			Self::Database(..) | Self::Io(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors
						.iter()
						.map(move |error| Message::new(error.code.to_string()).field(field.to_string()))
				})
				.collect(),
			Self::Json(JsonSchemaRejection::Json(error)) => Message::new(error.body_text()).into_vec(),
			Self::Json(JsonSchemaRejection::Serde(error)) => {
				located(error.inner().to_string(), &error.path().to_string()).into_vec()
			}
			Self::Json(JsonSchemaRejection::Schema(units)) => units
				.iter()
				.map(|unit| {
					located(
						unit.error_description().to_string(),
						&unit.instance_location().to_string(),
					)
				})
				.collect(),
			Self::Query(error) => Message::new(error.body_text()).into_vec(),
			Self::Path(..) => Message::new("not_found").into_vec(),
			Self::Database(..) | Self::Io(..) => Vec::new(),
		}
	}
}

impl From<JsonSchemaRejection> for AppError {
	fn from(rejection: JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

/// Builds a message for the input at `location`, either a JSON pointer
/// (`/group/title`) or a dotted path (`group.title`).
///
/// The root of the document has no field.
fn located(content: String, location: &str) -> Message<'static> {
	let field = location.trim_matches(|c: char| c == '/' || c == '.').replace('/', ".");
	let message = Message::new(content);

	if field.is_empty() {
		message
	} else {
		message.field(field)
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		respond(self.status(), self.errors(), &self)
	}
}

/// The error returned by route handlers: either a framework-level
/// [`AppError`] or the route module's own error type.
#[derive(Debug)]
pub enum RouteError<T> {
	App(AppError),
	Route(T),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<sqlx::Error> for RouteError<T> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<T> From<std::io::Error> for RouteError<T> {
	fn from(error: std::io::Error) -> Self {
		Self::App(AppError::Io(error))
	}
}

impl<T> From<validator::ValidationErrors> for RouteError<T> {
	fn from(error: validator::ValidationErrors) -> Self {
		Self::App(AppError::Validation(error))
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => respond(error.status(), error.errors(), &error),
		}
	}
}

impl<T> OperationOutput for RouteError<T> {
	type Inner = ErrorResponse<'static>;
}

impl OperationOutput for AppError {
	type Inner = ErrorResponse<'static>;
}

fn respond(
	status: StatusCode,
	errors: Vec<Message<'_>>,
	source: &dyn std::error::Error,
) -> Response<Body> {
	if status.is_server_error() {
		tracing::error!(error = %source, "request failed");
	} else {
		tracing::debug!(error = %source, status = %status, "request rejected");
	}

	(
		status,
		Json(ErrorResponse {
			success: false,
			errors,
		}),
	)
		.into_response()
}

/// Returns the message of a unique constraint violation, if `error` is one.
///
/// `SQLite` reports the offending columns as `table.column` in the message.
pub fn unique_violation(error: &sqlx::Error) -> Option<&str> {
	match error {
		sqlx::Error::Database(error)
			if error.is_unique_violation()
				|| error.message().contains("UNIQUE constraint failed") =>
		{
			Some(error.message())
		}
		_ => None,
	}
}
