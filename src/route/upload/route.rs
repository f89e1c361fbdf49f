use std::sync::Arc;

use axum::extract::State;
use macros::route;

use crate::{
	config::Config,
	extract::{Json, Session},
	openapi::tag,
	service::imgbb,
};

use super::{model, Error, RouteError};

/// Upload image
/// Hosts a base64-encoded image of up to 5 MiB, returning its public URL.
#[route(tag = tag::UPLOAD)]
pub async fn upload_image(
	State(config): State<Arc<Config>>,
	State(http): State<reqwest::Client>,
	session: Session,
	Json(input): Json<model::UploadImageInput>,
) -> Result<Json<model::UploadedImage>, RouteError> {
	let payload = model::base64_payload(&input.image)?;

	let hosted = imgbb::upload(&http, &config, payload, input.name.as_deref())
		.await
		.map_err(Error::Service)?;

	tracing::info!(user = %session.user.id, url = %hosted.url, "image uploaded");

	Ok(Json(model::UploadedImage {
		url: hosted.url,
		display_url: hosted.display_url,
		delete_url: hosted.delete_url,
	}))
}
