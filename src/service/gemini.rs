//! The generative-AI model behind the study assistant.

use serde::{Deserialize, Serialize};

use crate::config::Config;

use super::{send, Error};

const SERVICE: &str = "gemini";

pub const SYSTEM_PROMPT: &str = "You are the IFCode study assistant, helping students of an \
educational programming community. Explain concepts step by step, prefer short runnable \
code examples, and point out common mistakes. When a question is not about programming or \
studying, answer briefly and steer the conversation back. Reply in the language the student \
writes in.";

/// Who authored a turn of the conversation, as the model API names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
	User,
	Model,
}

/// A previous message sent along with the new one.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
	pub speaker: Speaker,
	pub text: &'a str,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
	text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
	#[serde(skip_serializing_if = "Option::is_none")]
	role: Option<Speaker>,
	parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
	temperature: f32,
	max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
	system_instruction: Content<'a>,
	contents: Vec<Content<'a>>,
	generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
	content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
	#[serde(default)]
	parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
	text: Option<String>,
}

fn part(text: &str) -> Part<'_> {
	Part { text }
}

fn build_request<'a>(history: &[Turn<'a>], message: &'a str) -> GenerateRequest<'a> {
	let contents = history
		.iter()
		.map(|turn| Content {
			role: Some(turn.speaker),
			parts: vec![part(turn.text)],
		})
		.chain(std::iter::once(Content {
			role: Some(Speaker::User),
			parts: vec![part(message)],
		}))
		.collect();

	GenerateRequest {
		system_instruction: Content {
			role: None,
			parts: vec![part(SYSTEM_PROMPT)],
		},
		contents,
		generation_config: GenerationConfig {
			temperature: 0.7,
			max_output_tokens: 2048,
		},
	}
}

fn extract_reply(response: GenerateResponse) -> Option<String> {
	let text = response
		.candidates
		.into_iter()
		.next()?
		.content?
		.parts
		.into_iter()
		.filter_map(|part| part.text)
		.collect::<String>();

	(!text.trim().is_empty()).then_some(text)
}

/// Sends `message`, preceded by `history` (oldest first), and returns the
/// model's reply.
pub async fn generate(
	http: &reqwest::Client,
	config: &Config,
	history: &[Turn<'_>],
	message: &str,
) -> Result<String, Error> {
	let api_key = config
		.gemini_api_key
		.as_deref()
		.ok_or(Error::NotConfigured(SERVICE))?;

	let url = format!(
		"{}/v1beta/models/{}:generateContent",
		config.gemini_base_url.trim_end_matches('/'),
		config.gemini_model
	);

	let request = http
		.post(url)
		.header("x-goog-api-key", api_key)
		.json(&build_request(history, message));

	let response = send::<GenerateResponse>(SERVICE, request).await?;

	extract_reply(response).ok_or(Error::Empty(SERVICE))
}
