//! Image hosting. Images are sent base64-encoded and served from the host's CDN.

use serde::Deserialize;

use crate::config::Config;

use super::{send, Error};

const SERVICE: &str = "image host";

#[derive(Debug, Deserialize)]
struct UploadResponse {
	data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
	url: String,
	display_url: Option<String>,
	delete_url: Option<String>,
}

/// A hosted image.
#[derive(Debug, PartialEq, Eq)]
pub struct Hosted {
	pub url: String,
	pub display_url: String,
	pub delete_url: Option<String>,
}

pub async fn upload(
	http: &reqwest::Client,
	config: &Config,
	image: &str,
	name: Option<&str>,
) -> Result<Hosted, Error> {
	let api_key = config
		.imgbb_api_key
		.as_deref()
		.ok_or(Error::NotConfigured(SERVICE))?;

	let mut form = vec![("image", image)];

	if let Some(name) = name {
		form.push(("name", name));
	}

	let request = http
		.post(format!(
			"{}/1/upload",
			config.imgbb_base_url.trim_end_matches('/')
		))
		.query(&[("key", api_key)])
		.form(&form);

	let data = send::<UploadResponse>(SERVICE, request)
		.await?
		.data
		.ok_or(Error::Empty(SERVICE))?;

	Ok(Hosted {
		display_url: data.display_url.unwrap_or_else(|| data.url.clone()),
		url: data.url,
		delete_url: data.delete_url,
	})
}
