use base64::{engine::general_purpose::STANDARD, Engine};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Error;

/// The largest accepted image, after decoding.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct UploadImageInput {
	/// The image, base64-encoded. A `data:` URL prefix is accepted.
	#[validate(length(min = 1))]
	pub image: String,
	/// A name for the hosted file.
	#[validate(length(min = 1, max = 100))]
	pub name: Option<String>,
}

/// A hosted image.
#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadedImage {
	/// The direct link to the image. Use this for post images and avatars.
	pub url: String,
	/// A link to a page showing the image.
	pub display_url: String,
	pub delete_url: Option<String>,
}

/// Checks that `image` is valid base64 of at most [`MAX_IMAGE_BYTES`],
/// returning the base64 payload without any `data:` URL prefix.
pub fn base64_payload(image: &str) -> Result<&str, Error> {
	let payload = match image.strip_prefix("data:") {
		Some(url) => url
			.split_once(";base64,")
			.map(|(_, payload)| payload)
			.ok_or(Error::InvalidImage)?,
		None => image,
	};

	// reject early without decoding
	if payload.len() / 4 * 3 > MAX_IMAGE_BYTES + 2 {
		return Err(Error::TooLarge);
	}

	let decoded = STANDARD.decode(payload).map_err(|_| Error::InvalidImage)?;

	if decoded.len() > MAX_IMAGE_BYTES {
		return Err(Error::TooLarge);
	}

	Ok(payload)
}
