use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	openapi::{SECURITY_SCHEME_BEARER, SECURITY_SCHEME_SESSION},
	route::auth::{
		self,
		model::{User, UserStatus},
	},
	session, Database,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// Extracts the session and related user from the request.
///
/// The session id is read from the `Authorization: Bearer` header, falling back
/// to the session cookie. The user is read from the database on every request,
/// so role changes and suspensions apply immediately.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: User,
}

fn bearer_token(parts: &request::Parts) -> Option<Result<Uuid, auth::Error>> {
	let value = parts.headers.get(header::AUTHORIZATION)?;

	Some(
		value
			.to_str()
			.ok()
			.and_then(|value| value.strip_prefix(AUTHORIZATION_PREFIX))
			.and_then(|token| Uuid::parse_str(token.trim()).ok())
			.ok_or(auth::Error::InvalidSessionToken),
	)
}

fn session_cookie(parts: &request::Parts) -> Result<Uuid, auth::Error> {
	let cookie = parts
		.headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == session::COOKIE_NAME)
		.ok_or(auth::Error::NoSession)?;

	Uuid::parse_str(cookie.value()).map_err(|_| auth::Error::InvalidSessionToken)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = auth::RouteError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let session_id = match bearer_token(parts) {
			Some(token) => token?,
			None => session_cookie(parts)?,
		};

		let database = Database::from_ref(state);
		let user = sqlx::query_as::<_, User>(
			r#"
				SELECT * FROM "user" WHERE id = (
					SELECT user_id FROM session WHERE id = $1
				)
			"#,
		)
		.bind(session_id)
		.fetch_optional(&database)
		.await?
		.ok_or(auth::Error::InvalidSessionToken)?;

		if user.status == UserStatus::Suspended {
			return Err(auth::Error::Suspended.into());
		}

		Ok(Self {
			id: session_id,
			user,
		})
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}
