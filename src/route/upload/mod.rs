use aide::axum::{routing::post_with, ApiRouter};
use axum::{extract::DefaultBodyLimit, http::StatusCode};

use crate::{error, service, AppState};

pub mod model;
pub mod route;

/// Base64 inflates by a third, plus room for the rest of the body.
const BODY_LIMIT: usize = model::MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("image is not valid base64")]
	InvalidImage,
	#[error("image is larger than {} bytes", model::MAX_IMAGE_BYTES)]
	TooLarge,
	#[error(transparent)]
	Service(service::Error),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/images", post_with(upload_image, upload_image_docs))
		.layer(DefaultBodyLimit::max(BODY_LIMIT))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidImage => StatusCode::BAD_REQUEST,
			Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
			Self::Service(error) if error.is_not_configured() => StatusCode::SERVICE_UNAVAILABLE,
			Self::Service(..) => StatusCode::BAD_GATEWAY,
		}
	}

	fn into_errors(self) -> Vec<error::Message> {
		match self {
			Self::InvalidImage => error::Message::new("invalid_image").field("image").into_vec(),
			Self::TooLarge => error::Message::new("image_too_large")
				.field("image")
				.detail("max_bytes", model::MAX_IMAGE_BYTES)
				.into_vec(),
			Self::Service(error) if error.is_not_configured() => {
				error::Message::new("uploads_unavailable").into_vec()
			}
			Self::Service(..) => error::Message::new("upload_failed").into_vec(),
		}
	}
}
