use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, service, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Service(service::Error),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route(
		"/",
		get_with(get_history, get_history_docs)
			.post_with(send_message, send_message_docs)
			.delete_with(clear_history, clear_history_docs),
	)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Service(error) if error.is_not_configured() => StatusCode::SERVICE_UNAVAILABLE,
			Self::Service(..) => StatusCode::BAD_GATEWAY,
		}
	}

	fn into_errors(self) -> Vec<error::Message> {
		let Self::Service(error) = self;

		let content = if error.is_not_configured() {
			"assistant_unavailable"
		} else {
			"assistant_failed"
		};

		error::Message::new(content).into_vec()
	}
}

#[cfg(test)]
mod test {
	use axum::{http::HeaderMap, routing::post, Router};

	use crate::test::*;

	const API_KEY: &str = "gemini-test-key";

	/// Answers with the number of turns it received.
	async fn generate(
		headers: HeaderMap,
		axum::Json(body): axum::Json<Value>,
	) -> (StatusCode, axum::Json<Value>) {
		if headers.get("x-goog-api-key").and_then(|key| key.to_str().ok()) != Some(API_KEY) {
			return (StatusCode::UNAUTHORIZED, axum::Json(json!({ "error": "bad key" })));
		}

		let turns = body["contents"].as_array().map_or(0, Vec::len);

		(
			StatusCode::OK,
			axum::Json(json!({
				"candidates": [{
					"content": { "role": "model", "parts": [{ "text": format!("reply to {turns}") }] },
					"finishReason": "STOP"
				}]
			})),
		)
	}

	async fn gemini_config(router: Router, api_key: &str) -> Config {
		Config {
			gemini_api_key: Some(api_key.into()),
			gemini_base_url: mock(router).await,
			chat_history_limit: 2,
			..config()
		}
	}

	#[tokio::test]
	async fn test_unconfigured_assistant() {
		let server = server(database().await);
		let user = register(&server, "ada").await;

		let response = server
			.post("/chat")
			.as_user(&user)
			.json(&json!({ "message": "hello" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);

		let history = server.get("/chat").as_user(&user).await.json::<Value>();

		assert_eq!(history, json!([]));
	}

	#[tokio::test]
	async fn test_conversation_sends_limited_history() {
		let router = Router::new().route("/v1beta/models/:model", post(generate));
		let config = gemini_config(router, API_KEY).await;
		let server = server_with(database().await, config);
		let user = register(&server, "ada").await;

		let mut replies = Vec::new();

		for message in ["hello", "what is a trait?", "thanks"] {
			let response = server
				.post("/chat")
				.as_user(&user)
				.json(&json!({ "message": message }))
				.await;

			assert_eq!(response.status_code(), StatusCode::OK);

			let exchange = response.json::<Value>();

			assert_eq!(exchange["message"]["content"], message);
			assert_eq!(exchange["reply"]["role"], "model");

			replies.push(exchange["reply"]["content"].clone());
		}

		assert_eq!(replies, vec![json!("reply to 1"), json!("reply to 3"), json!("reply to 3")]);

		let history = server.get("/chat").as_user(&user).await.json::<Value>();
		let roles = history
			.as_array()
			.unwrap()
			.iter()
			.map(|message| message["role"].as_str().unwrap())
			.collect::<Vec<_>>();

		assert_eq!(roles, ["user", "model", "user", "model", "user", "model"]);
		assert_eq!(history[0]["content"], "hello");

		let response = server.delete("/chat").as_user(&user).await;

		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

		let history = server.get("/chat").as_user(&user).await.json::<Value>();

		assert_eq!(history, json!([]));
	}

	#[tokio::test]
	async fn test_upstream_failure_stores_nothing() {
		let router = Router::new().route("/v1beta/models/:model", post(generate));
		let config = gemini_config(router, "wrong-key").await;
		let server = server_with(database().await, config);
		let user = register(&server, "ada").await;

		let response = server
			.post("/chat")
			.as_user(&user)
			.json(&json!({ "message": "hello" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "assistant_failed");

		let history = server.get("/chat").as_user(&user).await.json::<Value>();

		assert_eq!(history, json!([]));
	}

	#[tokio::test]
	async fn test_empty_message_is_rejected() {
		let server = server(database().await);
		let user = register(&server, "ada").await;

		let response = server
			.post("/chat")
			.as_user(&user)
			.json(&json!({ "message": "" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
	}
}
