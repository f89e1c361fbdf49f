use aide::axum::{routing::post_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, service, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Service(service::Error),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/", post_with(send_contact, send_contact_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Service(error) if error.is_not_configured() => StatusCode::SERVICE_UNAVAILABLE,
			Self::Service(..) => StatusCode::BAD_GATEWAY,
		}
	}

	fn into_errors(self) -> Vec<error::Message> {
		let Self::Service(error) = self;

		let content = if error.is_not_configured() {
			"contact_unavailable"
		} else {
			"contact_failed"
		};

		error::Message::new(content).into_vec()
	}
}
