use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	route::{
		notification::{
			self,
			model::{NewNotification, NotificationKind},
		},
		post::route::fetch_owner,
	},
	Database,
};

use super::{model, Error, RouteError};

/// Resolves the author of an active post, or fails with `UnknownPost`.
async fn active_post_author(database: &Database, post_id: Uuid) -> Result<Uuid, RouteError> {
	let owner = fetch_owner(database, post_id)
		.await?
		.filter(|owner| owner.status == model::ContentStatus::Active)
		.ok_or(Error::UnknownPost(post_id))?;

	Ok(owner.user_id)
}

/// Get comments
/// Returns a paginated response of the active comments of a post, oldest first.
#[route(tag = tag::COMMENT)]
pub async fn get_comments(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Comment>>, RouteError> {
	active_post_author(&database, path.id).await?;

	let comments = sqlx::query_as::<_, model::Comment>(&format!(
		r#"
			{}
			WHERE c.post_id = $1 AND c.status = $2
			ORDER BY c.created_at ASC, c.rowid ASC
			LIMIT $3 OFFSET $4
		"#,
		model::COMMENT_SELECT
	))
	.bind(path.id)
	.bind(model::ContentStatus::Active)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(comments))
}

/// Create comment
/// Comments on an active post. The author of the post is notified.
#[route(tag = tag::COMMENT)]
pub async fn create_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::CreateCommentInput>,
) -> Result<Json<model::Comment>, RouteError> {
	let post_author = active_post_author(&database, path.id).await?;
	let comment_id = Uuid::new_v4();

	sqlx::query(
		r#"
			INSERT INTO comment (id, post_id, user_id, content, created_at)
			VALUES ($1, $2, $3, $4, $5)
		"#,
	)
	.bind(comment_id)
	.bind(path.id)
	.bind(session.user.id)
	.bind(&input.content)
	.bind(chrono::Utc::now())
	.execute(&database)
	.await?;

	let comment = sqlx::query_as::<_, model::Comment>(&format!(
		"{} WHERE c.id = $1",
		model::COMMENT_SELECT
	))
	.bind(comment_id)
	.fetch_one(&database)
	.await?;

	if post_author != session.user.id {
		notification::notify_quietly(
			&database,
			NewNotification::new(
				post_author,
				NotificationKind::Comment,
				format!("{} commented on your post.", session.user.username),
			)
			.sender(session.user.id)
			.content(path.id, model::ContentType::Post)
			.meta("comment_id", comment_id.to_string()),
		)
		.await;
	}

	Ok(Json(comment))
}

/// Delete comment
/// Deletes a comment. Allowed for the comment's author, the post's author and moderators.
#[route(tag = tag::COMMENT)]
pub async fn delete_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::CommentPath>,
) -> Result<(), RouteError> {
	let (comment_author, post_author) = sqlx::query_as::<_, (Uuid, Uuid)>(
		r#"
			SELECT c.user_id, p.user_id
			FROM comment c
			JOIN post p ON p.id = c.post_id
			WHERE c.id = $1 AND c.post_id = $2
		"#,
	)
	.bind(path.comment_id)
	.bind(path.id)
	.fetch_optional(&database)
	.await?
	.ok_or(Error::UnknownComment(path.comment_id))?;

	let user = &session.user;

	if user.id != comment_author && user.id != post_author && !user.role.is_moderator() {
		return Err(Error::Forbidden(path.comment_id).into());
	}

	sqlx::query("DELETE FROM comment WHERE id = $1")
		.bind(path.comment_id)
		.execute(&database)
		.await?;

	tracing::info!(comment = %path.comment_id, user = %user.id, "comment deleted");

	if user.id != comment_author && user.id != post_author {
		notification::notify_quietly(
			&database,
			NewNotification::new(
				comment_author,
				NotificationKind::ContentModerated,
				"One of your comments was removed by a moderator.",
			)
			.sender(user.id)
			.content(path.comment_id, model::ContentType::Comment)
			.meta("action", "delete"),
		)
		.await;
	}

	Ok(())
}
