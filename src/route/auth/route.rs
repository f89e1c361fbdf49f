use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{
	extract::State,
	http::{header, StatusCode},
	response::IntoResponse,
};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Session},
	openapi::tag,
	session, AppState, Database,
};

use super::{map_unique_violation, model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and creating a new password,
/// the scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

async fn create_session<'e, E>(executor: E, user_id: Uuid) -> Result<model::Session, sqlx::Error>
where
	E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
	sqlx::query_as::<_, model::Session>(
		"INSERT INTO session (id, user_id, created_at) VALUES ($1, $2, $3) RETURNING *",
	)
	.bind(Uuid::new_v4())
	.bind(user_id)
	.bind(chrono::Utc::now())
	.fetch_one(executor)
	.await
}

/// Log in
/// Logs in to an account, returning an associated session cookie.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::Session>"))]
pub async fn login(
	State(state): State<AppState>,
	Json(auth): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE email = $1"#)
		.bind(&auth.email)
		.fetch_optional(&state.database)
		.await?
		.ok_or(Error::InvalidEmailOrPassword)?;

	let hashed = hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		return Err(Error::InvalidEmailOrPassword.into());
	}

	if user.status == model::UserStatus::Suspended {
		return Err(Error::Suspended.into());
	}

	let session = create_session(&state.database, user.id).await?;
	let cookie = session::create_cookie(session.id);

	tracing::info!(user = %user.id, "user logged in");

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(session)).into_response())
}

/// Log out
/// Logs out of the authenticated account and clears the session cookie.
#[route(tag = tag::AUTH, response(status = 204, description = "Logged out successfully."))]
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query("DELETE FROM session WHERE id = $1")
		.bind(session.id)
		.execute(&database)
		.await?;

	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	)
		.into_response())
}

/// Register account
/// Registers a new account, returning an associated session cookie.
#[route(tag = tag::AUTH, response(status = 200, description = "Registered successfully.", shape = "Json<model::Session>"))]
pub async fn register(
	State(state): State<AppState>,
	Json(auth): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, &user_id).map_err(Error::Argon)?;

	let mut tx = state.database.begin().await?;

	sqlx::query(
		r#"
			INSERT INTO "user" (id, email, username, password, created_at)
			VALUES ($1, $2, $3, $4, $5)
		"#,
	)
	.bind(user_id)
	.bind(&auth.email)
	.bind(&auth.username)
	.bind(&hashed[..])
	.bind(chrono::Utc::now())
	.execute(&mut *tx)
	.await
	.map_err(map_unique_violation)?;

	let session = create_session(&mut *tx, user_id).await?;

	tx.commit().await?;

	let cookie = session::create_cookie(session.id);

	tracing::info!(user = %user_id, username = %auth.username, "user registered");

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(session)).into_response())
}

/// Get account
/// Returns the authenticated user, including their email address.
#[route(tag = tag::AUTH)]
pub async fn get_me(session: Session) -> Json<model::Account> {
	Json(session.user.into())
}

/// Update account
/// Updates the authenticated user's profile. Missing fields are left untouched.
#[route(tag = tag::AUTH)]
pub async fn update_me(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::UpdateProfileInput>,
) -> Result<Json<model::Account>, RouteError> {
	let user = sqlx::query_as::<_, model::User>(
		r#"
			UPDATE "user"
			SET username = COALESCE($1, username),
				display_name = COALESCE($2, display_name),
				bio = COALESCE($3, bio),
				avatar_url = COALESCE($4, avatar_url)
			WHERE id = $5
			RETURNING *
		"#,
	)
	.bind(input.username)
	.bind(input.display_name)
	.bind(input.bio)
	.bind(input.avatar_url)
	.bind(session.user.id)
	.fetch_one(&database)
	.await
	.map_err(map_unique_violation)?;

	Ok(Json(user.into()))
}

/// Delete account
/// Deletes the authenticated user and their related content. This action is irreversible.
#[route(tag = tag::AUTH, response(status = 204, description = "Account deleted."))]
pub async fn delete_me(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
		.bind(session.user.id)
		.execute(&database)
		.await?;

	tracing::info!(user = %session.user.id, "account deleted");

	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	)
		.into_response())
}
