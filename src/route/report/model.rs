pub use crate::route::model::{ContentStatus, ContentType, IdInput, Paginate};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReportReason {
	Spam,
	Harassment,
	HateSpeech,
	Inappropriate,
	Misinformation,
	Plagiarism,
	Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ReportStatus {
	/// Waiting for a moderator.
	Pending,
	/// The report was valid. An action may have been applied to the content.
	Approved,
	Rejected,
	/// Handled outside of the moderation workflow.
	Resolved,
}

/// What happens to reported content when its report is approved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ModerationAction {
	#[default]
	None,
	/// The author is notified, the content is left as is.
	Warn,
	/// The content is hidden from listings. Users are suspended.
	Hide,
	/// The content is removed. Users are suspended.
	Remove,
}

impl ModerationAction {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Warn => "warn",
			Self::Hide => "hide",
			Self::Remove => "remove",
		}
	}

	/// The status reported posts and comments end up with, if any.
	pub fn content_status(self) -> Option<ContentStatus> {
		match self {
			Self::None | Self::Warn => None,
			Self::Hide => Some(ContentStatus::Hidden),
			Self::Remove => Some(ContentStatus::Removed),
		}
	}
}

/// A report of a post, comment or user.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Report {
	pub id: Uuid,
	pub reporter_id: Uuid,
	/// The reported post, comment or user.
	pub content_id: Uuid,
	pub content_type: ContentType,
	/// The author of the reported content, resolved when the report was created.
	pub content_author_id: Option<Uuid>,
	pub reason: ReportReason,
	pub description: Option<String>,
	pub status: ReportStatus,
	pub action_taken: Option<ModerationAction>,
	/// The moderator that last reviewed the report.
	pub moderator_id: Option<Uuid>,
	pub moderator_notes: Option<String>,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct CreateReportInput {
	pub content_id: Uuid,
	pub content_type: ContentType,
	pub reason: ReportReason,
	#[validate(length(max = 1000))]
	pub description: Option<String>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct ReviewReportInput {
	/// The new status. Reports cannot be moved back to `pending`.
	pub status: ReportStatus,
	/// Applied to the reported content when the report is approved.
	#[serde(default)]
	pub action: ModerationAction,
	#[validate(length(max = 1000))]
	pub notes: Option<String>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct ReportFilter {
	pub status: Option<ReportStatus>,
	pub content_type: Option<ContentType>,
}

#[cfg(test)]
mod test {
	use super::{ContentStatus, ModerationAction};

	#[test]
	fn test_only_hide_and_remove_change_content() {
		assert_eq!(ModerationAction::None.content_status(), None);
		assert_eq!(ModerationAction::Warn.content_status(), None);
		assert_eq!(ModerationAction::Hide.content_status(), Some(ContentStatus::Hidden));
		assert_eq!(ModerationAction::Remove.content_status(), Some(ContentStatus::Removed));
	}
}
