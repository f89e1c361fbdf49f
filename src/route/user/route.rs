use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Session},
	openapi::tag,
	route::notification::{
		self,
		model::{NewNotification, NotificationKind},
	},
	Database,
};

use super::{model, Error, RouteError};

async fn fetch_user(database: &Database, user_id: Uuid) -> Result<model::User, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE id = $1"#)
		.bind(user_id)
		.fetch_optional(database)
		.await?
		.ok_or(Error::UnknownUser(user_id))?;

	Ok(user)
}

/// Get user
/// Returns the public profile of a user.
#[route(tag = tag::USER)]
pub async fn get_user(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::User>, RouteError> {
	Ok(Json(fetch_user(&database, path.id).await?))
}

/// Update role
/// Changes the role of a user. Admins manage users and moderators, superadmins manage everyone.
#[route(tag = tag::USER)]
pub async fn update_role(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdateRoleInput>,
) -> Result<Json<model::User>, RouteError> {
	if !session.user.role.is_admin() {
		return Err(Error::Forbidden.into());
	}

	let target = fetch_user(&database, path.id).await?;

	if !model::can_assign(&session.user, &target, input.role) {
		return Err(Error::Forbidden.into());
	}

	let user = sqlx::query_as::<_, model::User>(
		r#"UPDATE "user" SET role = $1 WHERE id = $2 RETURNING *"#,
	)
	.bind(input.role)
	.bind(path.id)
	.fetch_one(&database)
	.await?;

	tracing::info!(
		user = %user.id,
		actor = %session.user.id,
		from = ?target.role,
		to = ?user.role,
		"role changed"
	);

	if target.role != user.role {
		notification::notify_quietly(
			&database,
			NewNotification::new(
				user.id,
				NotificationKind::RoleChanged,
				format!("Your role is now {}.", user.role.as_str()),
			)
			.sender(session.user.id)
			.meta("role", user.role.as_str()),
		)
		.await;
	}

	Ok(Json(user))
}
