pub use crate::route::model::{ContentStatus, ContentType, IdInput, Paginate};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const COMMENT_SELECT: &str = r#"
	SELECT c.*, u.username AS author
	FROM comment c
	JOIN "user" u ON u.id = c.user_id
"#;

/// A comment on a post.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Comment {
	pub id: Uuid,
	pub post_id: Uuid,
	pub user_id: Uuid,
	/// The username of the author.
	pub author: String,
	/// The content of the comment in Markdown format.
	pub content: String,
	pub status: ContentStatus,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct CreateCommentInput {
	#[validate(length(min = 1, max = 2000))]
	pub content: String,
}

/// A path to a single comment of a post.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct CommentPath {
	/// The post the comment belongs to.
	pub id: Uuid,
	pub comment_id: Uuid,
}
