use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json, session};

pub const SECURITY_SCHEME_SESSION: &str = "Session";
pub const SECURITY_SCHEME_BEARER: &str = "Bearer";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const USER: &str = "User";
	pub const POST: &str = "Post";
	pub const COMMENT: &str = "Comment";
	pub const REPORT: &str = "Report";
	pub const NOTIFICATION: &str = "Notification";
	pub const CHAT: &str = "Chat";
	pub const CONTACT: &str = "Contact";
	pub const UPLOAD: &str = "Upload";
}

fn tag(name: &str, description: &str) -> Tag {
	Tag {
		name: name.into(),
		description: Some(description.into()),
		..Default::default()
	}
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("IFCode API")
		.summary("The IFCode community platform")
		.description(include_str!("../README.md"))
		.tag(tag(tag::AUTH, "Registration, sessions and the current account"))
		.tag(tag(tag::USER, "Public profiles and role management"))
		.tag(tag(tag::POST, "Forum posts and likes"))
		.tag(tag(tag::COMMENT, "Comments on forum posts"))
		.tag(tag(tag::REPORT, "Content reports and moderation"))
		.tag(tag(tag::NOTIFICATION, "Notifications for the current user"))
		.tag(tag(tag::CHAT, "The AI study assistant"))
		.tag(tag(tag::CONTACT, "Messages to the IFCode team"))
		.tag(tag(tag::UPLOAD, "Image uploads"))
		.security_scheme(
			SECURITY_SCHEME_SESSION,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Cookie,
				name: session::COOKIE_NAME.into(),
				description: Some("A user session cookie".into()),
				extensions: Default::default(),
			},
		)
		.security_scheme(
			SECURITY_SCHEME_BEARER,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Header,
				name: "Authorization".into(),
				description: Some("`Bearer <session id>`".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorResponse>, _>(|res| {
			res.example(error::ErrorResponse {
				success: false,
				errors: error::Message::new("error message")
					.field("optional field")
					.detail("key", "value")
					.into_vec(),
			})
		})
}
