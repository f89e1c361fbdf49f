use std::sync::Arc;

use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;
use uuid::Uuid;

use crate::{
	config::Config,
	extract::{Json, Session},
	openapi::tag,
	service::gemini,
	Database,
};

use super::{model, Error, RouteError};

async fn insert_message<'e, E>(
	executor: E,
	user_id: Uuid,
	role: model::ChatRole,
	content: &str,
) -> Result<model::ChatMessage, sqlx::Error>
where
	E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
	sqlx::query_as::<_, model::ChatMessage>(
		r#"
			INSERT INTO chat_message (id, user_id, role, content, created_at)
			VALUES ($1, $2, $3, $4, $5)
			RETURNING *
		"#,
	)
	.bind(Uuid::new_v4())
	.bind(user_id)
	.bind(role)
	.bind(content)
	.bind(chrono::Utc::now())
	.fetch_one(executor)
	.await
}

/// Get chat history
/// Returns your conversation with the study assistant, oldest first.
#[route(tag = tag::CHAT)]
pub async fn get_history(
	State(database): State<Database>,
	session: Session,
) -> Result<Json<Vec<model::ChatMessage>>, RouteError> {
	let messages = sqlx::query_as::<_, model::ChatMessage>(
		r#"
			SELECT * FROM chat_message
			WHERE user_id = $1
			ORDER BY created_at ASC, rowid ASC
		"#,
	)
	.bind(session.user.id)
	.fetch_all(&database)
	.await?;

	Ok(Json(messages))
}

/// Send message
/// Sends a message to the study assistant along with your recent history,
/// and returns its reply. Nothing is stored when the assistant is unavailable.
#[route(tag = tag::CHAT)]
pub async fn send_message(
	State(database): State<Database>,
	State(config): State<Arc<Config>>,
	State(http): State<reqwest::Client>,
	session: Session,
	Json(input): Json<model::SendMessageInput>,
) -> Result<Json<model::ChatExchange>, RouteError> {
	let mut history = sqlx::query_as::<_, model::ChatMessage>(
		r#"
			SELECT * FROM chat_message
			WHERE user_id = $1
			ORDER BY created_at DESC, rowid DESC
			LIMIT $2
		"#,
	)
	.bind(session.user.id)
	.bind(config.chat_history_limit)
	.fetch_all(&database)
	.await?;

	history.reverse();

	let turns = history
		.iter()
		.map(|message| gemini::Turn {
			speaker: message.role.into(),
			text: &message.content,
		})
		.collect::<Vec<_>>();

	let reply = gemini::generate(&http, &config, &turns, &input.message)
		.await
		.map_err(Error::Service)?;

	let mut tx = database.begin().await?;

	let message =
		insert_message(&mut *tx, session.user.id, model::ChatRole::User, &input.message).await?;
	let reply = insert_message(&mut *tx, session.user.id, model::ChatRole::Model, &reply).await?;

	tx.commit().await?;

	Ok(Json(model::ChatExchange { message, reply }))
}

/// Clear chat history
/// Deletes your whole conversation with the study assistant.
#[route(tag = tag::CHAT, response(status = 204, description = "History cleared."))]
pub async fn clear_history(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query("DELETE FROM chat_message WHERE user_id = $1")
		.bind(session.user.id)
		.execute(&database)
		.await?;

	Ok(StatusCode::NO_CONTENT.into_response())
}
