pub use crate::route::model::{ContentStatus, ContentType, IdInput, Paginate};

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const MAX_IMAGES: usize = 4;

/// Selects posts with their author and counters. Filters are appended by the caller.
pub const POST_SELECT: &str = r#"
	SELECT p.*, u.username AS author,
		(SELECT COUNT(*) FROM post_like l WHERE l.post_id = p.id) AS like_count,
		(SELECT COUNT(*) FROM comment c WHERE c.post_id = p.id AND c.status = 'active') AS comment_count
	FROM post p
	JOIN "user" u ON u.id = p.user_id
"#;

/// The text stored in `post.search_text`. Search terms are lowercased the same way,
/// which folds accented letters that SQLite's `LIKE` leaves alone.
pub fn search_text(title: &str, content: &str) -> String {
	format!("{title}\n{content}").to_lowercase()
}

fn validate_images(images: &[String]) -> Result<(), ValidationError> {
	if images.len() > MAX_IMAGES {
		return Err(ValidationError::new("too many images"));
	}

	if images
		.iter()
		.any(|url| !(url.starts_with("https://") || url.starts_with("http://")))
	{
		return Err(ValidationError::new("images must be http(s) urls"));
	}

	Ok(())
}

/// A single forum post, created by a user.
#[model]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The user that created the post.
	#[serde(skip_deserializing)]
	pub user_id: Uuid,
	/// The username of the author.
	#[serde(skip_deserializing)]
	pub author: String,
	/// The title of the post.
	#[validate(length(min = 3, max = 128))]
	pub title: String,
	/// The content of the post in Markdown format.
	#[validate(length(min = 1, max = 20000))]
	pub content: String,
	/// An optional code snippet shown below the content.
	#[validate(length(max = 20000))]
	pub code: Option<String>,
	/// The language of the code snippet, used for highlighting.
	#[validate(length(min = 1, max = 32))]
	pub language: Option<String>,
	/// URLs of attached images, as returned by the upload endpoint.
	#[serde(default)]
	#[validate(custom(function = "validate_images"))]
	pub images: Vec<String>,
	/// Hidden and removed posts are only visible to their author and moderators.
	#[serde(skip_deserializing)]
	pub status: ContentStatus,
	#[serde(skip_deserializing)]
	pub like_count: i64,
	#[serde(skip_deserializing)]
	pub comment_count: i64,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The time of the last edit.
	#[serde(skip_deserializing)]
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
pub struct PostRow {
	id: Uuid,
	user_id: Uuid,
	author: String,
	title: String,
	content: String,
	code: Option<String>,
	language: Option<String>,
	images: String,
	status: ContentStatus,
	like_count: i64,
	comment_count: i64,
	created_at: chrono::DateTime<chrono::Utc>,
	updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PostRow> for Post {
	fn from(row: PostRow) -> Self {
		Self {
			id: row.id,
			user_id: row.user_id,
			author: row.author,
			title: row.title,
			content: row.content,
			code: row.code,
			language: row.language,
			images: serde_json::from_str(&row.images).unwrap_or_else(|error| {
				tracing::warn!(%error, post = %row.id, "invalid images column, returning no images");
				Vec::new()
			}),
			status: row.status,
			like_count: row.like_count,
			comment_count: row.comment_count,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

/// The ids stored for a post, used for permission checks.
#[derive(sqlx::FromRow)]
pub struct PostOwner {
	pub user_id: Uuid,
	pub status: ContentStatus,
}

#[derive(Debug, Default, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
	#[default]
	Newest,
	Oldest,
	/// Most liked first.
	Popular,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PostFilter {
	/// Only posts by this user.
	pub author: Option<Uuid>,
	/// Matches the title or content, case-insensitively.
	#[validate(length(min = 1, max = 100))]
	pub search: Option<String>,
	/// Only posts with a code snippet in this language.
	#[validate(length(min = 1, max = 32))]
	pub language: Option<String>,
	#[serde(default)]
	pub sort: PostSort,
}

/// The like state of a post for the current user.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LikeStatus {
	pub liked: bool,
	pub like_count: i64,
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use super::{search_text, validate_images, ContentStatus, Post, PostRow};

	#[test]
	fn test_corrupt_images_fall_back_to_empty() {
		let row = PostRow {
			id: Uuid::new_v4(),
			user_id: Uuid::new_v4(),
			author: "ada".into(),
			title: "Reversing lists".into(),
			content: "How do I reverse a list?".into(),
			code: None,
			language: None,
			images: "[not json".into(),
			status: ContentStatus::Active,
			like_count: 0,
			comment_count: 0,
			created_at: chrono::Utc::now(),
			updated_at: chrono::Utc::now(),
		};

		let post = Post::from(row);

		assert!(post.images.is_empty());
		assert_eq!(post.title, "Reversing lists");
	}

	#[test]
	fn test_search_text_folds_accents() {
		assert_eq!(
			search_text("PROGRAMAÇÃO em Rust", "Introdução"),
			"programação em rust\nintrodução"
		);
	}

	#[test]
	fn test_images_must_be_urls() {
		assert!(validate_images(&["https://i.ibb.co/a.png".into()]).is_ok());
		assert!(validate_images(&["javascript:alert(1)".into()]).is_err());
	}

	#[test]
	fn test_image_limit() {
		let images = vec!["https://i.ibb.co/a.png".to_string(); 5];

		assert!(validate_images(&images).is_err());
		assert!(validate_images(&images[..4]).is_ok());
	}
}
