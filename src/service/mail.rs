//! Transactional email through an HTTP relay.

use serde::{Deserialize, Serialize};

use crate::config::Config;

use super::{send, Error};

const SERVICE: &str = "email relay";

/// An outgoing email.
#[derive(Debug, Serialize)]
pub struct Email<'a> {
	pub from: &'a str,
	pub to: Vec<&'a str>,
	pub subject: &'a str,
	pub text: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct Sent {
	/// The relay's id for the email.
	pub id: String,
}

pub async fn send_email(
	http: &reqwest::Client,
	config: &Config,
	email: &Email<'_>,
) -> Result<Sent, Error> {
	let api_key = config
		.email_api_key
		.as_deref()
		.ok_or(Error::NotConfigured(SERVICE))?;

	let request = http
		.post(format!(
			"{}/emails",
			config.email_base_url.trim_end_matches('/')
		))
		.bearer_auth(api_key)
		.json(email);

	let sent = send::<Sent>(SERVICE, request).await?;

	tracing::info!(id = %sent.id, subject = email.subject, "email relayed");

	Ok(sent)
}
