use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	route::{
		auth::model::Role,
		notification::{
			self,
			model::{NewNotification, NotificationKind},
		},
	},
	Database,
};

use super::{model, Error, RouteError};

/// Resolves the author of reported content. Users are their own authors.
async fn content_author(
	database: &Database,
	content_id: Uuid,
	content_type: model::ContentType,
) -> Result<Option<Uuid>, sqlx::Error> {
	let query = match content_type {
		model::ContentType::Post => "SELECT user_id FROM post WHERE id = $1",
		model::ContentType::Comment => "SELECT user_id FROM comment WHERE id = $1",
		model::ContentType::User => r#"SELECT id FROM "user" WHERE id = $1"#,
	};

	sqlx::query_scalar::<_, Uuid>(query)
		.bind(content_id)
		.fetch_optional(database)
		.await
}

/// Applies a moderation action to the reported content.
///
/// Users can only be suspended by someone with a higher role than their own.
async fn apply_action(
	connection: &mut sqlx::SqliteConnection,
	report: &model::Report,
	action: model::ModerationAction,
	moderator: Role,
) -> Result<(), RouteError> {
	let Some(status) = action.content_status() else {
		return Ok(());
	};

	match report.content_type {
		model::ContentType::Post => {
			sqlx::query("UPDATE post SET status = $1 WHERE id = $2")
				.bind(status)
				.bind(report.content_id)
				.execute(connection)
				.await?;
		}
		model::ContentType::Comment => {
			sqlx::query("UPDATE comment SET status = $1 WHERE id = $2")
				.bind(status)
				.bind(report.content_id)
				.execute(connection)
				.await?;
		}
		model::ContentType::User => {
			let role = sqlx::query_scalar::<_, Role>(r#"SELECT role FROM "user" WHERE id = $1"#)
				.bind(report.content_id)
				.fetch_optional(&mut *connection)
				.await?;

			if role.is_some_and(|role| role >= moderator) {
				return Err(Error::Outranked(report.content_id).into());
			}

			sqlx::query(r#"UPDATE "user" SET status = 'suspended' WHERE id = $1"#)
				.bind(report.content_id)
				.execute(connection)
				.await?;
		}
	}

	Ok(())
}

/// Create report
/// Reports a post, comment or user to the moderators. You can only have one
/// pending report per piece of content.
#[route(tag = tag::REPORT)]
pub async fn create_report(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreateReportInput>,
) -> Result<Json<model::Report>, RouteError> {
	let author = content_author(&database, input.content_id, input.content_type)
		.await?
		.ok_or(Error::UnknownContent(input.content_id))?;

	if author == session.user.id {
		return Err(Error::OwnContent.into());
	}

	let pending = sqlx::query_scalar::<_, bool>(
		r#"
			SELECT EXISTS(
				SELECT 1 FROM report
				WHERE reporter_id = $1 AND content_id = $2 AND status = $3
			)
		"#,
	)
	.bind(session.user.id)
	.bind(input.content_id)
	.bind(model::ReportStatus::Pending)
	.fetch_one(&database)
	.await?;

	if pending {
		return Err(Error::AlreadyReported(input.content_id).into());
	}

	let report = sqlx::query_as::<_, model::Report>(
		r#"
			INSERT INTO report
				(id, reporter_id, content_id, content_type, content_author_id, reason, description, status, created_at)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
			RETURNING *
		"#,
	)
	.bind(Uuid::new_v4())
	.bind(session.user.id)
	.bind(input.content_id)
	.bind(input.content_type)
	.bind(author)
	.bind(input.reason)
	.bind(input.description)
	.bind(model::ReportStatus::Pending)
	.bind(chrono::Utc::now())
	.fetch_one(&database)
	.await?;

	tracing::info!(
		report = %report.id,
		reporter = %session.user.id,
		content = %report.content_id,
		reason = ?report.reason,
		"report created"
	);

	Ok(Json(report))
}

/// Get own reports
/// Returns a paginated response of the reports you created, newest first.
#[route(tag = tag::REPORT)]
pub async fn get_user_reports(
	State(database): State<Database>,
	session: Session,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Report>>, RouteError> {
	let reports = sqlx::query_as::<_, model::Report>(
		r#"
			SELECT * FROM report
			WHERE reporter_id = $1
			ORDER BY created_at DESC, rowid DESC
			LIMIT $2 OFFSET $3
		"#,
	)
	.bind(session.user.id)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(reports))
}

/// Get all reports
/// Returns a paginated response of reports, newest first. Moderators only.
#[route(tag = tag::REPORT)]
pub async fn get_reports(
	State(database): State<Database>,
	session: Session,
	Query(paginate): Query<model::Paginate>,
	Query(filter): Query<model::ReportFilter>,
) -> Result<Json<Vec<model::Report>>, RouteError> {
	if !session.user.role.is_moderator() {
		return Err(Error::Forbidden.into());
	}

	let reports = sqlx::query_as::<_, model::Report>(
		r#"
			SELECT * FROM report
			WHERE ($1 IS NULL OR status = $1)
				AND ($2 IS NULL OR content_type = $2)
			ORDER BY created_at DESC, rowid DESC
			LIMIT $3 OFFSET $4
		"#,
	)
	.bind(filter.status)
	.bind(filter.content_type)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(&database)
	.await?;

	Ok(Json(reports))
}

/// Get single report
/// Returns a report by its unique id. Only its reporter and moderators can see it.
#[route(tag = tag::REPORT)]
pub async fn get_report(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Report>, RouteError> {
	let report = sqlx::query_as::<_, model::Report>("SELECT * FROM report WHERE id = $1")
		.bind(path.id)
		.fetch_optional(&database)
		.await?
		.ok_or(Error::UnknownReport(path.id))?;

	if report.reporter_id != session.user.id && !session.user.role.is_moderator() {
		return Err(Error::Forbidden.into());
	}

	Ok(Json(report))
}

/// Review report
/// Sets the status of a report. Approving a report applies its action to the
/// reported content. The reporter and the content's author are notified.
#[route(tag = tag::REPORT)]
pub async fn review_report(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::ReviewReportInput>,
) -> Result<Json<model::Report>, RouteError> {
	if !session.user.role.is_moderator() {
		return Err(Error::Forbidden.into());
	}

	if input.status == model::ReportStatus::Pending {
		return Err(Error::PendingStatus.into());
	}

	let mut tx = database.begin().await?;

	let report = sqlx::query_as::<_, model::Report>(
		r#"
			UPDATE report
			SET status = $1,
				action_taken = $2,
				moderator_id = $3,
				moderator_notes = $4,
				reviewed_at = $5
			WHERE id = $6
			RETURNING *
		"#,
	)
	.bind(input.status)
	.bind(input.action)
	.bind(session.user.id)
	.bind(input.notes)
	.bind(chrono::Utc::now())
	.bind(path.id)
	.fetch_optional(&mut *tx)
	.await?
	.ok_or(Error::UnknownReport(path.id))?;

	let approved = report.status == model::ReportStatus::Approved;

	if approved {
		apply_action(&mut tx, &report, input.action, session.user.role).await?;
	}

	tx.commit().await?;

	tracing::info!(
		report = %report.id,
		moderator = %session.user.id,
		status = ?report.status,
		action = input.action.as_str(),
		"report reviewed"
	);

	notification::notify_quietly(
		&database,
		NewNotification::new(
			report.reporter_id,
			NotificationKind::ReportReviewed,
			"A moderator reviewed your report. Thank you for helping the community.",
		)
		.sender(session.user.id)
		.content(report.content_id, report.content_type)
		.meta("report_id", report.id.to_string())
		.meta("status", serde_json::json!(report.status)),
	)
	.await;

	let moderated = approved && input.action != model::ModerationAction::None;

	if let Some(author) = report.content_author_id.filter(|_| moderated) {
		notification::notify_quietly(
			&database,
			NewNotification::new(
				author,
				NotificationKind::ContentModerated,
				format!(
					"A moderator took action on your content ({}).",
					input.action.as_str()
				),
			)
			.sender(session.user.id)
			.content(report.content_id, report.content_type)
			.meta("action", input.action.as_str())
			.meta("reason", serde_json::json!(report.reason)),
		)
		.await;
	}

	Ok(Json(report))
}
