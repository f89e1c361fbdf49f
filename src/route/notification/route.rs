use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	Database,
};

use super::{model, Error, RouteError};

/// Get notifications
/// Returns a paginated response of your notifications, newest first.
#[route(tag = tag::NOTIFICATION)]
pub async fn get_notifications(
	State(database): State<Database>,
	session: Session,
	Query(paginate): Query<model::Paginate>,
	Query(filter): Query<model::NotificationFilter>,
) -> Result<Json<Vec<model::Notification>>, RouteError> {
	let notifications = sqlx::query_as::<_, model::NotificationRow>(
		r#"
			SELECT * FROM notification
			WHERE receiver_id = $1 AND ($2 = 0 OR read = 0)
			ORDER BY created_at DESC, rowid DESC
			LIMIT $3 OFFSET $4
		"#,
	)
	.bind(session.user.id)
	.bind(filter.unread)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// Count unread notifications
/// Returns how many of your notifications are unread.
#[route(tag = tag::NOTIFICATION)]
pub async fn count_unread(
	State(database): State<Database>,
	session: Session,
) -> Result<Json<model::Count>, RouteError> {
	let count = sqlx::query_scalar::<_, i64>(
		"SELECT COUNT(*) FROM notification WHERE receiver_id = $1 AND read = 0",
	)
	.bind(session.user.id)
	.fetch_one(&database)
	.await?;

	Ok(Json(model::Count { count }))
}

/// Mark all read
/// Marks every unread notification of yours as read.
#[route(tag = tag::NOTIFICATION)]
pub async fn mark_all_read(
	State(database): State<Database>,
	session: Session,
) -> Result<Json<model::MarkedRead>, RouteError> {
	let result =
		sqlx::query("UPDATE notification SET read = 1 WHERE receiver_id = $1 AND read = 0")
			.bind(session.user.id)
			.execute(&database)
			.await?;

	Ok(Json(model::MarkedRead {
		updated: result.rows_affected(),
	}))
}

/// Mark read
/// Marks one of your notifications as read.
#[route(tag = tag::NOTIFICATION)]
pub async fn mark_read(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Notification>, RouteError> {
	let notification = sqlx::query_as::<_, model::NotificationRow>(
		r#"
			UPDATE notification SET read = 1
			WHERE id = $1 AND receiver_id = $2
			RETURNING *
		"#,
	)
	.bind(path.id)
	.bind(session.user.id)
	.fetch_optional(&database)
	.await?
	.ok_or(Error::UnknownNotification(path.id))?;

	Ok(Json(notification.into()))
}

/// Delete notification
/// Deletes one of your notifications.
#[route(tag = tag::NOTIFICATION)]
pub async fn delete_notification(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<(), RouteError> {
	let result = sqlx::query("DELETE FROM notification WHERE id = $1 AND receiver_id = $2")
		.bind(path.id)
		.bind(session.user.id)
		.execute(&database)
		.await?;

	if result.rows_affected() == 0 {
		return Err(Error::UnknownNotification(path.id).into());
	}

	Ok(())
}
