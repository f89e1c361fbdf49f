use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct ContactInput {
	#[validate(length(min = 1, max = 100))]
	pub name: String,
	/// Where the team replies to.
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 1, max = 200))]
	pub subject: String,
	#[validate(length(min = 1, max = 5000))]
	pub message: String,
}

impl ContactInput {
	pub fn subject_line(&self) -> String {
		format!("[IFCode contact] {}", self.subject)
	}

	pub fn body(&self) -> String {
		format!("From: {} <{}>\n\n{}", self.name, self.email, self.message)
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MessageSent {
	/// The relay's id for the email.
	pub id: String,
}
