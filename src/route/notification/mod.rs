use aide::axum::{
	routing::{delete_with, get_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState, Database};

pub mod model;
pub mod route;

use model::NewNotification;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown notification {0}")]
	UnknownNotification(Uuid),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(get_notifications, get_notifications_docs))
		.api_route("/unread", get_with(count_unread, count_unread_docs))
		.api_route("/read", put_with(mark_all_read, mark_all_read_docs))
		.api_route("/:id/read", put_with(mark_read, mark_read_docs))
		.api_route(
			"/:id",
			delete_with(delete_notification, delete_notification_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownNotification(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<error::Message> {
		let Self::UnknownNotification(id) = self;

		error::Message::new("unknown_notification")
			.detail("notification", id.to_string())
			.into_vec()
	}
}

/// Stores a notification.
pub async fn notify<'e, E>(executor: E, notification: &NewNotification) -> Result<Uuid, sqlx::Error>
where
	E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
	let id = Uuid::new_v4();
	let (content_id, content_type) = notification.content.unzip();

	sqlx::query(
		r#"
			INSERT INTO notification
				(id, receiver_id, sender_id, kind, message, content_id, content_type, metadata, created_at)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
		"#,
	)
	.bind(id)
	.bind(notification.receiver_id)
	.bind(notification.sender_id)
	.bind(notification.kind)
	.bind(&notification.message)
	.bind(content_id)
	.bind(content_type)
	.bind(serde_json::Value::Object(notification.metadata.clone()).to_string())
	.bind(chrono::Utc::now())
	.execute(executor)
	.await?;

	Ok(id)
}

/// Stores a notification, logging instead of failing. Notifications are a
/// side effect, so their failure never fails the action that caused them.
pub async fn notify_quietly(database: &Database, notification: NewNotification) {
	if let Err(error) = notify(database, &notification).await {
		tracing::warn!(
			%error,
			receiver = %notification.receiver_id,
			kind = ?notification.kind,
			"failed to send notification"
		);
	}
}
