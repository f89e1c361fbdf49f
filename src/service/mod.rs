//! Clients for the third-party services the platform relies on.
//!
//! Each client is a thin wrapper over the shared [`reqwest::Client`] and the
//! relevant part of [`crate::config::Config`]. None of them retry.

pub mod gemini;
pub mod imgbb;
pub mod mail;

/// An error from an external service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The service has no API key configured.
	#[error("{0} is not configured")]
	NotConfigured(&'static str),
	#[error("request to {service} failed: {source}")]
	Request {
		service: &'static str,
		#[source]
		source: reqwest::Error,
	},
	#[error("{service} responded with {status}: {body}")]
	Upstream {
		service: &'static str,
		status: reqwest::StatusCode,
		body: String,
	},
	#[error("{0} returned an empty response")]
	Empty(&'static str),
}

impl Error {
	/// Whether the failure is due to missing configuration rather than
	/// the service itself.
	pub fn is_not_configured(&self) -> bool {
		matches!(self, Self::NotConfigured(..))
	}
}

/// Sends a request and decodes a JSON body, mapping non-success statuses
/// to [`Error::Upstream`].
async fn send<T: serde::de::DeserializeOwned>(
	service: &'static str,
	request: reqwest::RequestBuilder,
) -> Result<T, Error> {
	let request_error = |source: reqwest::Error| Error::Request { service, source };
	let response = request.send().await.map_err(request_error)?;
	let status = response.status();

	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();

		tracing::warn!(service, %status, %body, "upstream service error");

		return Err(Error::Upstream {
			service,
			status,
			body,
		});
	}

	response.json::<T>().await.map_err(request_error)
}
