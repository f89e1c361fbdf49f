use aide::axum::{
	routing::{get_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(Uuid),
	#[error("you are not allowed to change this role")]
	Forbidden,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/:id", get_with(get_user, get_user_docs))
		.api_route("/:id/role", put_with(update_role, update_role_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) => StatusCode::NOT_FOUND,
			Self::Forbidden => StatusCode::FORBIDDEN,
		}
	}

	fn into_errors(self) -> Vec<error::Message> {
		match self {
			Self::UnknownUser(user) => error::Message::new("unknown_user")
				.detail("user", user.to_string())
				.into_vec(),
			Self::Forbidden => error::Message::new("forbidden").into_vec(),
		}
	}
}
