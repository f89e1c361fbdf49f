pub use crate::route::model::{ContentType, Count, IdInput, Paginate};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::Map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum NotificationKind {
	Like,
	Comment,
	ReportReviewed,
	ContentModerated,
	RoleChanged,
	System,
}

/// A notification sent to a user.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Notification {
	pub id: Uuid,
	pub receiver_id: Uuid,
	/// The user whose action caused the notification, if any.
	pub sender_id: Option<Uuid>,
	pub kind: NotificationKind,
	pub message: String,
	pub content_id: Option<Uuid>,
	pub content_type: Option<ContentType>,
	/// Free-form details, depending on the kind.
	pub metadata: Map,
	pub read: bool,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
pub struct NotificationRow {
	id: Uuid,
	receiver_id: Uuid,
	sender_id: Option<Uuid>,
	kind: NotificationKind,
	message: String,
	content_id: Option<Uuid>,
	content_type: Option<ContentType>,
	metadata: String,
	read: bool,
	created_at: chrono::DateTime<chrono::Utc>,
}

impl From<NotificationRow> for Notification {
	fn from(row: NotificationRow) -> Self {
		Self {
			id: row.id,
			receiver_id: row.receiver_id,
			sender_id: row.sender_id,
			kind: row.kind,
			message: row.message,
			content_id: row.content_id,
			content_type: row.content_type,
			metadata: serde_json::from_str(&row.metadata).unwrap_or_else(|error| {
				tracing::warn!(%error, notification = %row.id, "invalid metadata column, returning no metadata");
				Map::default()
			}),
			read: row.read,
			created_at: row.created_at,
		}
	}
}

/// A notification about to be sent.
#[derive(Debug)]
pub struct NewNotification {
	pub receiver_id: Uuid,
	pub sender_id: Option<Uuid>,
	pub kind: NotificationKind,
	pub message: String,
	pub content: Option<(Uuid, ContentType)>,
	pub metadata: Map,
}

impl NewNotification {
	pub fn new(receiver_id: Uuid, kind: NotificationKind, message: impl Into<String>) -> Self {
		Self {
			receiver_id,
			sender_id: None,
			kind,
			message: message.into(),
			content: None,
			metadata: Map::new(),
		}
	}

	pub fn sender(mut self, sender_id: Uuid) -> Self {
		self.sender_id = Some(sender_id);
		self
	}

	pub fn content(mut self, content_id: Uuid, content_type: ContentType) -> Self {
		self.content = Some((content_id, content_type));
		self
	}

	pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.metadata.insert(key.into(), value.into());
		self
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct NotificationFilter {
	/// Only return unread notifications.
	#[serde(default)]
	pub unread: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MarkedRead {
	/// How many notifications were marked read.
	pub updated: u64,
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use super::{Notification, NotificationKind, NotificationRow};

	fn row(metadata: &str) -> NotificationRow {
		NotificationRow {
			id: Uuid::new_v4(),
			receiver_id: Uuid::new_v4(),
			sender_id: None,
			kind: NotificationKind::System,
			message: "Welcome!".into(),
			content_id: None,
			content_type: None,
			metadata: metadata.into(),
			read: false,
			created_at: chrono::Utc::now(),
		}
	}

	#[test]
	fn test_metadata_is_parsed() {
		let notification = Notification::from(row(r#"{"action":"warn"}"#));

		assert_eq!(notification.metadata["action"], "warn");
	}

	#[test]
	fn test_corrupt_metadata_falls_back_to_empty() {
		let notification = Notification::from(row("{not json"));

		assert!(notification.metadata.is_empty());
		assert_eq!(notification.message, "Welcome!");
	}
}
