use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::service::gemini::Speaker;

/// The author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ChatRole {
	User,
	/// The study assistant.
	Model,
}

impl From<ChatRole> for Speaker {
	fn from(role: ChatRole) -> Self {
		match role {
			ChatRole::User => Self::User,
			ChatRole::Model => Self::Model,
		}
	}
}

/// A message of a conversation with the study assistant.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct ChatMessage {
	pub id: Uuid,
	pub user_id: Uuid,
	pub role: ChatRole,
	pub content: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SendMessageInput {
	#[validate(length(min = 1, max = 4000))]
	pub message: String,
}

/// The stored message and the assistant's reply to it.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ChatExchange {
	pub message: ChatMessage,
	pub reply: ChatMessage,
}
