use std::sync::Arc;

use axum::extract::State;
use macros::route;

use crate::{
	config::Config,
	extract::Json,
	openapi::tag,
	service::mail::{self, Email},
};

use super::{model, Error, RouteError};

/// Contact the team
/// Sends a message to the IFCode team. Replies go to the given email address.
#[route(tag = tag::CONTACT)]
pub async fn send_contact(
	State(config): State<Arc<Config>>,
	State(http): State<reqwest::Client>,
	Json(input): Json<model::ContactInput>,
) -> Result<Json<model::MessageSent>, RouteError> {
	let subject = input.subject_line();
	let text = input.body();

	let email = Email {
		from: &config.contact_from,
		to: vec![config.contact_to.as_str()],
		subject: &subject,
		text: &text,
		reply_to: Some(input.email.as_str()),
	};

	let sent = mail::send_email(&http, &config, &email)
		.await
		.map_err(Error::Service)?;

	Ok(Json(model::MessageSent { id: sent.id }))
}
