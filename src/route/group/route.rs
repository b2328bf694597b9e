use axum::extract::State;
use macros::route;
use validator::{ValidationError, ValidationErrors};

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	route::post::feed::Feed,
	Database,
};

use super::{map_conflict, model, Error, RouteError};

async fn find_group(database: &Database, slug: &str) -> Result<model::Group, RouteError> {
	sqlx::query_as::<_, model::Group>(r#"SELECT * FROM "group" WHERE slug = $1"#)
		.bind(slug)
		.fetch_optional(database)
		.await?
		.ok_or_else(|| Error::UnknownGroup(slug.to_owned()).into())
}

fn require_staff(session: &Session) -> Result<(), RouteError> {
	if session.user.is_staff {
		Ok(())
	} else {
		Err(Error::NotStaff.into())
	}
}

/// Group feed
/// Returns a group together with a page of its posts, newest first.
#[route(tag = tag::GROUP)]
pub async fn group_posts(
	State(database): State<Database>,
	Path(path): Path<model::GroupPath>,
	Query(input): Query<model::PageInput>,
) -> Result<Json<model::GroupPage>, RouteError> {
	let group = find_group(&database, &path.slug).await?;
	let page = Feed::Group(group.id)
		.page(&database, input.page.as_deref())
		.await?;

	Ok(Json(model::GroupPage { group, page }))
}

/// List groups
/// Returns every group ordered by title, optionally only those whose title or slug contains the search term.
#[route(tag = tag::GROUP)]
pub async fn list_groups(
	State(database): State<Database>,
	Query(input): Query<model::SearchInput>,
) -> Result<Json<Vec<model::Group>>, RouteError> {
	let groups = sqlx::query_as::<_, model::Group>(
		r#"
			SELECT * FROM "group"
			WHERE $1 IS NULL OR title LIKE $1 ESCAPE '\' OR slug LIKE $1 ESCAPE '\'
			ORDER BY title, id
		"#,
	)
	.bind(input.pattern())
	.fetch_all(&database)
	.await?;

	Ok(Json(groups))
}

/// Create group
/// Creates a new group. Without a slug, one is built from the title. Only staff may do this.
#[route(tag = tag::GROUP)]
pub async fn create_group(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreateGroupInput>,
) -> Result<Json<model::Group>, RouteError> {
	require_staff(&session)?;

	let slug = match input.slug {
		Some(slug) => slug,
		None => {
			let slug = model::slugify(&input.title);

			if slug.is_empty() {
				let mut errors = ValidationErrors::new();
				errors.add("slug", ValidationError::new("slug cannot be built from the title"));

				return Err(errors.into());
			}

			slug
		}
	};

	let group = sqlx::query_as::<_, model::Group>(
		r#"
			INSERT INTO "group" (title, slug, description)
			VALUES ($1, $2, $3)
			RETURNING *
		"#,
	)
	.bind(&input.title)
	.bind(&slug)
	.bind(&input.description)
	.fetch_one(&database)
	.await
	.map_err(|error| map_conflict(error, &slug))?;

	tracing::info!(group = %group.slug, "group created");

	Ok(Json(group))
}

/// Update group
/// Updates the title, slug or description of a group. Only staff may do this.
#[route(tag = tag::GROUP)]
pub async fn update_group(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::GroupPath>,
	Json(input): Json<model::UpdateGroupInput>,
) -> Result<Json<model::Group>, RouteError> {
	require_staff(&session)?;

	let slug = input.slug.clone().unwrap_or_else(|| path.slug.clone());
	let group = sqlx::query_as::<_, model::Group>(
		r#"
			UPDATE "group"
			SET
				title = COALESCE($1, title),
				slug = COALESCE($2, slug),
				description = COALESCE($3, description)
			WHERE slug = $4
			RETURNING *
		"#,
	)
	.bind(input.title)
	.bind(input.slug)
	.bind(input.description)
	.bind(&path.slug)
	.fetch_optional(&database)
	.await
	.map_err(|error| map_conflict(error, &slug))?;

	Ok(Json(group.ok_or(Error::UnknownGroup(path.slug))?))
}

/// Delete group
/// Deletes a group. Its posts are kept, but no longer belong to any group. Only staff may do this.
#[route(tag = tag::GROUP)]
pub async fn delete_group(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::GroupPath>,
) -> Result<(), RouteError> {
	require_staff(&session)?;

	let status = sqlx::query(r#"DELETE FROM "group" WHERE slug = $1"#)
		.bind(&path.slug)
		.execute(&database)
		.await?;

	if status.rows_affected() == 0 {
		return Err(Error::UnknownGroup(path.slug).into());
	}

	tracing::info!(group = %path.slug, "group deleted");

	Ok(())
}
