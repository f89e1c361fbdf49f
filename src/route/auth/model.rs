use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username.chars().any(|c| !c.is_alphanumeric()) {
		return Err(ValidationError::new("username must be alphanumeric"));
	}

	Ok(())
}

/// The role of a user. Roles are ordered, each including the
/// permissions of the ones before it.
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Serialize,
	Deserialize,
	JsonSchema,
	sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
	User,
	Moderator,
	Admin,
	Superadmin,
}

impl Role {
	/// Whether the role may review reports and remove content.
	pub fn is_moderator(self) -> bool {
		self >= Self::Moderator
	}

	/// Whether the role may change other users' roles.
	pub fn is_admin(self) -> bool {
		self >= Self::Admin
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::User => "user",
			Self::Moderator => "moderator",
			Self::Admin => "admin",
			Self::Superadmin => "superadmin",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserStatus {
	Active,
	/// Suspended by a moderator. Suspended users cannot log in.
	Suspended,
}

/// A single user.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The user's primary email address, used for logging in.
	#[serde(skip_serializing)]
	pub email: String,
	/// The hashed password.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The username that is displayed to the public.
	pub username: String,
	pub display_name: Option<String>,
	pub bio: Option<String>,
	pub avatar_url: Option<String>,
	pub role: Role,
	pub status: UserStatus,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The authenticated user, including private fields.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Account {
	#[serde(flatten)]
	pub user: User,
	pub email: String,
}

impl From<User> for Account {
	fn from(user: User) -> Self {
		Self {
			email: user.email.clone(),
			user,
		}
	}
}

#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Session {
	/// The session id. Send it as a `Bearer` token when cookies are not available.
	#[serde(rename = "session_id")]
	pub id: Uuid,
	/// The user that owns the session.
	pub user_id: Uuid,
	/// The creation time of the session.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: String,
}

/// Profile fields to change. Missing fields are left untouched.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct UpdateProfileInput {
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: Option<String>,
	#[validate(length(min = 1, max = 64))]
	pub display_name: Option<String>,
	#[validate(length(max = 500))]
	pub bio: Option<String>,
	#[validate(url)]
	pub avatar_url: Option<String>,
}

#[cfg(test)]
mod test {
	use super::{validate_username, Role};

	#[test]
	fn test_roles_are_ordered() {
		assert!(!Role::User.is_moderator());
		assert!(Role::Moderator.is_moderator());
		assert!(!Role::Moderator.is_admin());
		assert!(Role::Admin.is_moderator());
		assert!(Role::Superadmin.is_admin());
	}

	#[test]
	fn test_username_must_be_alphanumeric() {
		assert!(validate_username("ada99").is_ok());
		assert!(validate_username("ada lovelace").is_err());
		assert!(validate_username("ada_").is_err());
	}
}
