use serde::Deserialize;

fn default_database_url() -> String {
	"sqlite://ifcode.db".into()
}

fn default_host() -> String {
	"127.0.0.1".into()
}

fn default_port() -> u16 {
	3000
}

#[inline]
fn yes() -> bool {
	true
}

fn default_gemini_model() -> String {
	"gemini-1.5-flash".into()
}

fn default_gemini_base_url() -> String {
	"https://generativelanguage.googleapis.com".into()
}

fn default_chat_history_limit() -> i64 {
	20
}

fn default_email_base_url() -> String {
	"https://api.resend.com".into()
}

fn default_contact_from() -> String {
	"IFCode <noreply@ifcode.dev>".into()
}

fn default_contact_to() -> String {
	"team@ifcode.dev".into()
}

fn default_imgbb_base_url() -> String {
	"https://api.imgbb.com".into()
}

/// Runtime configuration, read from the environment (and `.env`, if present).
///
/// Every external service is optional. When its key is missing, the
/// routes depending on it respond with `503 Service Unavailable`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default = "default_database_url")]
	pub database_url: String,
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
	/// Per-IP rate limiting. Requires the peer address, so it is
	/// disabled when the router is driven without a socket.
	#[serde(default = "yes")]
	pub rate_limit: bool,
	#[serde(default)]
	pub otlp_enabled: bool,

	pub gemini_api_key: Option<String>,
	#[serde(default = "default_gemini_model")]
	pub gemini_model: String,
	#[serde(default = "default_gemini_base_url")]
	pub gemini_base_url: String,
	/// How many previous messages are sent along with a new chat message.
	#[serde(default = "default_chat_history_limit")]
	pub chat_history_limit: i64,

	pub email_api_key: Option<String>,
	#[serde(default = "default_email_base_url")]
	pub email_base_url: String,
	#[serde(default = "default_contact_from")]
	pub contact_from: String,
	#[serde(default = "default_contact_to")]
	pub contact_to: String,

	pub imgbb_api_key: Option<String>,
	#[serde(default = "default_imgbb_base_url")]
	pub imgbb_base_url: String,
}

impl Config {
	pub fn from_env() -> Result<Self, envy::Error> {
		envy::from_env()
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			database_url: default_database_url(),
			host: default_host(),
			port: default_port(),
			rate_limit: true,
			otlp_enabled: false,
			gemini_api_key: None,
			gemini_model: default_gemini_model(),
			gemini_base_url: default_gemini_base_url(),
			chat_history_limit: default_chat_history_limit(),
			email_api_key: None,
			email_base_url: default_email_base_url(),
			contact_from: default_contact_from(),
			contact_to: default_contact_to(),
			imgbb_api_key: None,
			imgbb_base_url: default_imgbb_base_url(),
		}
	}
}

#[cfg(test)]
mod test {
	use super::Config;

	#[test]
	fn test_defaults_from_empty_env() {
		let config = envy::from_iter::<_, Config>(Vec::<(String, String)>::new()).unwrap();

		assert_eq!(config.port, 3000);
		assert!(config.rate_limit);
		assert!(config.gemini_api_key.is_none());
		assert_eq!(config.chat_history_limit, 20);
	}

	#[test]
	fn test_overrides_from_env() {
		let config = envy::from_iter::<_, Config>(vec![
			("PORT".to_string(), "8080".to_string()),
			("RATE_LIMIT".to_string(), "false".to_string()),
			("GEMINI_API_KEY".to_string(), "secret".to_string()),
		])
		.unwrap();

		assert_eq!(config.port, 8080);
		assert!(!config.rate_limit);
		assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
	}
}
