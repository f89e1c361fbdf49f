use axum::extract::State;
use macros::route;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	route::notification::{
		self,
		model::{NewNotification, NotificationKind},
	},
	Database,
};

use super::{model, Error, RouteError};

/// Escapes `LIKE` wildcards so user input only matches literally.
fn like_pattern(search: &str) -> String {
	let escaped = search
		.replace('\\', "\\\\")
		.replace('%', "\\%")
		.replace('_', "\\_");

	format!("%{escaped}%")
}

pub(crate) async fn fetch_post(
	database: &Database,
	post_id: Uuid,
) -> Result<Option<model::Post>, sqlx::Error> {
	let post = sqlx::query_as::<_, model::PostRow>(&format!("{} WHERE p.id = $1", model::POST_SELECT))
		.bind(post_id)
		.fetch_optional(database)
		.await?;

	Ok(post.map(Into::into))
}

pub(crate) async fn fetch_owner(
	database: &Database,
	post_id: Uuid,
) -> Result<Option<model::PostOwner>, sqlx::Error> {
	sqlx::query_as::<_, model::PostOwner>("SELECT user_id, status FROM post WHERE id = $1")
		.bind(post_id)
		.fetch_optional(database)
		.await
}

async fn like_status(
	database: &Database,
	post_id: Uuid,
	user_id: Uuid,
) -> Result<model::LikeStatus, sqlx::Error> {
	let (liked, like_count) = sqlx::query_as::<_, (bool, i64)>(
		r#"
			SELECT
				EXISTS(SELECT 1 FROM post_like WHERE post_id = $1 AND user_id = $2),
				(SELECT COUNT(*) FROM post_like WHERE post_id = $1)
		"#,
	)
	.bind(post_id)
	.bind(user_id)
	.fetch_one(database)
	.await?;

	Ok(model::LikeStatus { liked, like_count })
}

/// Get own posts
/// Returns a paginated response of your posts, newest first, including hidden and removed ones.
#[route(tag = tag::POST)]
pub async fn get_user_posts(
	State(database): State<Database>,
	session: Session,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	let posts = sqlx::query_as::<_, model::PostRow>(&format!(
		r#"
			{}
			WHERE p.user_id = $1
			ORDER BY p.created_at DESC, p.rowid DESC
			LIMIT $2 OFFSET $3
		"#,
		model::POST_SELECT
	))
	.bind(session.user.id)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// Get all posts
/// Returns a paginated response of active posts. Filters can be combined.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
	Query(filter): Query<model::PostFilter>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	let mut query = QueryBuilder::<Sqlite>::new(model::POST_SELECT);

	query.push(" WHERE p.status = ").push_bind(model::ContentStatus::Active);

	if let Some(author) = filter.author {
		query.push(" AND p.user_id = ").push_bind(author);
	}

	if let Some(search) = filter.search.as_deref() {
		query
			.push(" AND p.search_text LIKE ")
			.push_bind(like_pattern(&search.to_lowercase()))
			.push(" ESCAPE '\\'");
	}

	if let Some(language) = filter.language {
		query
			.push(" AND LOWER(p.language) = LOWER(")
			.push_bind(language)
			.push(")");
	}

	query.push(match filter.sort {
		model::PostSort::Newest => " ORDER BY p.created_at DESC, p.rowid DESC",
		model::PostSort::Oldest => " ORDER BY p.created_at ASC, p.rowid ASC",
		model::PostSort::Popular => " ORDER BY like_count DESC, p.created_at DESC, p.rowid DESC",
	});

	query
		.push(" LIMIT ")
		.push_bind(paginate.limit())
		.push(" OFFSET ")
		.push_bind(paginate.offset());

	let posts = query
		.build_query_as::<model::PostRow>()
		.fetch_all(&database)
		.await?;

	Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// Get single post
/// Returns a single post by its unique id. Hidden and removed posts are only
/// returned to their author and to moderators.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	session: Option<Session>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = fetch_post(&database, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	let visible = post.status == model::ContentStatus::Active
		|| session.is_some_and(|session| {
			session.user.id == post.user_id || session.user.role.is_moderator()
		});

	if !visible {
		return Err(Error::UnknownPost(path.id).into());
	}

	Ok(Json(post))
}

/// Create post
/// Creates a new post, optionally with a code snippet and images.
#[route(tag = tag::POST)]
pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreatePostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post_id = Uuid::new_v4();
	let now = chrono::Utc::now();

	sqlx::query(
		r#"
			INSERT INTO post (id, user_id, title, content, code, language, images, search_text, created_at, updated_at)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
		"#,
	)
	.bind(post_id)
	.bind(session.user.id)
	.bind(&input.title)
	.bind(&input.content)
	.bind(&input.code)
	.bind(&input.language)
	.bind(serde_json::json!(input.images).to_string())
	.bind(model::search_text(&input.title, &input.content))
	.bind(now)
	.execute(&database)
	.await?;

	tracing::info!(post = %post_id, user = %session.user.id, "post created");

	let post = fetch_post(&database, post_id)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	Ok(Json(post))
}

/// Update post
/// Updates your post by its unique id. Missing fields are left untouched, and
/// `null` removes the code snippet or its language.
#[route(tag = tag::POST)]
pub async fn update_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdatePostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = fetch_post(&database, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	if post.user_id != session.user.id {
		return Err(Error::NotAuthor(path.id).into());
	}

	let title = input.title.unwrap_or(post.title);
	let content = input.content.unwrap_or(post.content);
	let code = input.code.unwrap_or(post.code);
	let language = input.language.unwrap_or(post.language);
	let images = input.images.unwrap_or(post.images);
	let search_text = model::search_text(&title, &content);

	sqlx::query(
		r#"
			UPDATE post
			SET title = $1, content = $2, code = $3, language = $4, images = $5,
				search_text = $6, updated_at = $7
			WHERE id = $8
		"#,
	)
	.bind(title)
	.bind(content)
	.bind(code)
	.bind(language)
	.bind(serde_json::json!(images).to_string())
	.bind(search_text)
	.bind(chrono::Utc::now())
	.bind(path.id)
	.execute(&database)
	.await?;

	let post = fetch_post(&database, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	Ok(Json(post))
}

/// Delete post
/// Deletes a post by its unique id. Authors can delete their own posts, moderators any post.
#[route(tag = tag::POST)]
pub async fn delete_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<(), RouteError> {
	let owner = fetch_owner(&database, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	let is_author = owner.user_id == session.user.id;

	if !is_author && !session.user.role.is_moderator() {
		return Err(Error::NotAuthor(path.id).into());
	}

	sqlx::query("DELETE FROM post WHERE id = $1")
		.bind(path.id)
		.execute(&database)
		.await?;

	tracing::info!(post = %path.id, user = %session.user.id, "post deleted");

	if !is_author {
		notification::notify_quietly(
			&database,
			NewNotification::new(
				owner.user_id,
				NotificationKind::ContentModerated,
				"One of your posts was removed by a moderator.",
			)
			.sender(session.user.id)
			.content(path.id, model::ContentType::Post)
			.meta("action", "delete"),
		)
		.await;
	}

	Ok(())
}

/// Get likes
/// Returns the ids of the users that liked a post, most recent first.
#[route(tag = tag::POST)]
pub async fn get_likes(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<Uuid>>, RouteError> {
	let likes = sqlx::query_scalar::<_, Uuid>(
		r#"
			SELECT user_id FROM post_like
			WHERE post_id = $1
			ORDER BY created_at DESC
			LIMIT $2 OFFSET $3
		"#,
	)
	.bind(path.id)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(likes))
}

/// Get like
/// Returns whether you like a post, and its like count.
#[route(tag = tag::POST)]
pub async fn get_like(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::LikeStatus>, RouteError> {
	Ok(Json(like_status(&database, path.id, session.user.id).await?))
}

/// Like post
/// Likes an active post. Liking a post twice has no further effect.
#[route(tag = tag::POST)]
pub async fn like_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::LikeStatus>, RouteError> {
	let owner = fetch_owner(&database, path.id)
		.await?
		.filter(|owner| owner.status == model::ContentStatus::Active)
		.ok_or(Error::UnknownPost(path.id))?;

	let inserted = sqlx::query(
		r#"
			INSERT INTO post_like (post_id, user_id, created_at) VALUES ($1, $2, $3)
			ON CONFLICT DO NOTHING
		"#,
	)
	.bind(path.id)
	.bind(session.user.id)
	.bind(chrono::Utc::now())
	.execute(&database)
	.await?
	.rows_affected()
		> 0;

	if inserted && owner.user_id != session.user.id {
		notification::notify_quietly(
			&database,
			NewNotification::new(
				owner.user_id,
				NotificationKind::Like,
				format!("{} liked your post.", session.user.username),
			)
			.sender(session.user.id)
			.content(path.id, model::ContentType::Post),
		)
		.await;
	}

	Ok(Json(like_status(&database, path.id, session.user.id).await?))
}

/// Unlike post
/// Removes your like from a post. Unliking a post you do not like has no effect.
#[route(tag = tag::POST)]
pub async fn unlike_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::LikeStatus>, RouteError> {
	sqlx::query("DELETE FROM post_like WHERE post_id = $1 AND user_id = $2")
		.bind(path.id)
		.bind(session.user.id)
		.execute(&database)
		.await?;

	Ok(Json(like_status(&database, path.id, session.user.id).await?))
}

#[cfg(test)]
mod test {
	use super::like_pattern;

	#[test]
	fn test_like_pattern_escapes_wildcards() {
		assert_eq!(like_pattern("rust"), "%rust%");
		assert_eq!(like_pattern("100%"), "%100\\%%");
		assert_eq!(like_pattern("snake_case"), "%snake\\_case%");
	}
}
