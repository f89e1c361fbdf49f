use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid email or password")]
	InvalidEmailOrPassword,
	#[error("password validation error")]
	Argon(#[from] argon2::Error),
	#[error("no session cookie or bearer token")]
	NoSession,
	#[error("invalid session")]
	InvalidSessionToken,
	#[error("account suspended")]
	Suspended,
	#[error("username already taken")]
	UsernameTaken,
	#[error("email already taken")]
	EmailTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/login", post_with(login, login_docs))
		.api_route("/logout", get_with(logout, logout_docs))
		.api_route("/register", post_with(register, register_docs))
		.api_route(
			"/me",
			get_with(get_me, get_me_docs)
				.put_with(update_me, update_me_docs)
				.delete_with(delete_me, delete_me_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidEmailOrPassword | Self::NoSession | Self::InvalidSessionToken => {
				StatusCode::UNAUTHORIZED
			}
			Self::Suspended => StatusCode::FORBIDDEN,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
		}
	}

	fn into_errors(self) -> Vec<error::Message> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::Argon(..) => Vec::new(),
			Self::UsernameTaken => message.field("username").into_vec(),
			Self::EmailTaken => message.field("email").into_vec(),
			_ => message.into_vec(),
		}
	}
}

/// Maps a unique constraint violation on the user table to the
/// matching conflict error.
pub(crate) fn map_unique_violation(error: sqlx::Error) -> RouteError {
	if let sqlx::Error::Database(ref database) = error {
		if database.is_unique_violation() {
			if database.message().contains("user.email") {
				return Error::EmailTaken.into();
			}

			if database.message().contains("user.username") {
				return Error::UsernameTaken.into();
			}
		}
	}

	error.into()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_signup_flow() {
		let server = server(database().await);

		let response = server
			.post("/auth/register")
			.json(&json!({
				"email": "john@smith.com",
				"username": "john",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.contains("session="));

		let response = server
			.post("/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let token = response.json::<Value>()["session_id"]
			.as_str()
			.unwrap()
			.to_string();

		let response = server.get("/auth/me").add_header(header::AUTHORIZATION, bearer(&token)).await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let me = response.json::<Value>();

		assert_eq!(me["username"], "john");
		assert_eq!(me["email"], "john@smith.com");
		assert_eq!(me["role"], "user");
		assert!(me.get("password").is_none());
	}

	#[tokio::test]
	async fn test_session_cookie_authenticates() {
		let server = server(database().await);
		let user = register(&server, "ada").await;

		let response = server
			.get("/auth/me")
			.add_header(
				header::COOKIE,
				HeaderValue::from_str(&format!("session={}", user.token)).unwrap(),
			)
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(response.json::<Value>()["username"], "ada");
	}

	#[tokio::test]
	async fn test_wrong_password_is_rejected() {
		let server = server(database().await);
		register(&server, "ada").await;

		let response = server
			.post("/auth/login")
			.json(&json!({
				"email": "ada@ifcode.dev",
				"password": "not the password",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(response.json::<Value>()["success"], false);
	}

	#[tokio::test]
	async fn test_duplicate_username_conflicts() {
		let server = server(database().await);
		register(&server, "ada").await;

		let response = server
			.post("/auth/register")
			.json(&json!({
				"email": "other@ifcode.dev",
				"username": "ada",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "username");
	}

	#[tokio::test]
	async fn test_invalid_registration_is_rejected() {
		let server = server(database().await);

		let response = server
			.post("/auth/register")
			.json(&json!({
				"email": "not an email",
				"username": "a b",
				"password": "short",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(response.json::<Value>()["errors"].as_array().unwrap().len(), 3);
	}

	#[tokio::test]
	async fn test_logout_invalidates_session() {
		let server = server(database().await);
		let user = register(&server, "ada").await;

		let response = server.get("/auth/logout").as_user(&user).await;

		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

		let response = server.get("/auth/me").as_user(&user).await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn test_update_profile() {
		let server = server(database().await);
		let user = register(&server, "ada").await;

		let response = server
			.put("/auth/me")
			.as_user(&user)
			.json(&json!({ "display_name": "Ada Lovelace", "bio": "first programmer" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let me = response.json::<Value>();

		assert_eq!(me["username"], "ada");
		assert_eq!(me["display_name"], "Ada Lovelace");
		assert_eq!(me["bio"], "first programmer");
	}

	#[tokio::test]
	async fn test_suspended_user_is_locked_out() {
		let database = database().await;
		let server = server(database.clone());
		let user = register(&server, "ada").await;

		sqlx::query(r#"UPDATE "user" SET status = 'suspended' WHERE id = $1"#)
			.bind(user.id)
			.execute(&database)
			.await
			.unwrap();

		let response = server.get("/auth/me").as_user(&user).await;

		assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

		let response = server
			.post("/auth/login")
			.json(&json!({ "email": "ada@ifcode.dev", "password": PASSWORD }))
			.await;

		assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
	}

	#[tokio::test]
	async fn test_delete_account() {
		let database = database().await;
		let server = server(database.clone());
		let user = register(&server, "ada").await;

		let response = server.delete("/auth/me").as_user(&user).await;

		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM session")
			.fetch_one(&database)
			.await
			.unwrap();

		assert_eq!(count, 0);
	}
}
