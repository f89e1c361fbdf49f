use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown report {0}")]
	UnknownReport(Uuid),
	#[error("unknown content {0}")]
	UnknownContent(Uuid),
	#[error("you cannot report your own content")]
	OwnContent,
	#[error("you already have a pending report of {0}")]
	AlreadyReported(Uuid),
	#[error("reports cannot be moved back to pending")]
	PendingStatus,
	#[error("only moderators can do this")]
	Forbidden,
	#[error("user {0} has a role at least as high as yours")]
	Outranked(Uuid),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_reports, get_reports_docs).post_with(create_report, create_report_docs),
		)
		.api_route("/me", get_with(get_user_reports, get_user_reports_docs))
		.api_route(
			"/:id",
			get_with(get_report, get_report_docs).put_with(review_report, review_report_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownReport(..) | Self::UnknownContent(..) => StatusCode::NOT_FOUND,
			Self::OwnContent | Self::PendingStatus => StatusCode::BAD_REQUEST,
			Self::AlreadyReported(..) => StatusCode::CONFLICT,
			Self::Forbidden | Self::Outranked(..) => StatusCode::FORBIDDEN,
		}
	}

	fn into_errors(self) -> Vec<error::Message> {
		match self {
			Self::UnknownReport(report) => error::Message::new("unknown_report")
				.detail("report", report.to_string())
				.into_vec(),
			Self::UnknownContent(content) => error::Message::new("unknown_content")
				.field("content_id")
				.detail("content", content.to_string())
				.into_vec(),
			Self::OwnContent => error::Message::new("own_content")
				.field("content_id")
				.into_vec(),
			Self::AlreadyReported(content) => error::Message::new("already_reported")
				.field("content_id")
				.detail("content", content.to_string())
				.into_vec(),
			Self::PendingStatus => error::Message::new("pending_status")
				.field("status")
				.into_vec(),
			Self::Forbidden => error::Message::new("forbidden").into_vec(),
			Self::Outranked(user) => error::Message::new("outranked")
				.detail("user", user.to_string())
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	async fn create_post(server: &axum_test::TestServer, user: &TestUser) -> String {
		let post = server
			.post("/posts")
			.as_user(user)
			.json(&json!({ "title": "Buy cheap watches", "content": "Visit my shop" }))
			.await
			.json::<Value>();

		post["id"].as_str().unwrap().to_string()
	}

	async fn report(
		server: &axum_test::TestServer,
		user: &TestUser,
		content_id: &str,
		content_type: &str,
	) -> axum_test::TestResponse {
		server
			.post("/reports")
			.as_user(user)
			.json(&json!({
				"content_id": content_id,
				"content_type": content_type,
				"reason": "spam",
				"description": "obvious spam",
			}))
			.await
	}

	#[tokio::test]
	async fn test_duplicate_pending_report_conflicts() {
		let database = database().await;
		let server = server(database.clone());
		let ada = register(&server, "ada").await;
		let bob = register(&server, "bob").await;
		let moderator = register(&server, "mod").await;

		promote(&database, &moderator, Role::Moderator).await;

		let post = create_post(&server, &ada).await;

		let response = report(&server, &bob, &post, "post").await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let created = response.json::<Value>();

		assert_eq!(created["status"], "pending");
		assert_eq!(created["reason"], "spam");
		assert_eq!(created["content_author_id"], json!(ada.id));

		let response = report(&server, &bob, &post, "post").await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "already_reported");

		let response = server
			.put(&format!("/reports/{}", created["id"].as_str().unwrap()))
			.as_user(&moderator)
			.json(&json!({ "status": "rejected" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let response = report(&server, &bob, &post, "post").await;

		assert_eq!(response.status_code(), StatusCode::OK);
	}

	#[tokio::test]
	async fn test_cannot_report_own_or_unknown_content() {
		let server = server(database().await);
		let ada = register(&server, "ada").await;

		let post = create_post(&server, &ada).await;

		let response = report(&server, &ada, &post, "post").await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

		let response = report(&server, &ada, &Uuid::new_v4().to_string(), "comment").await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_approve_with_remove_hides_post_and_notifies() {
		let database = database().await;
		let server = server(database.clone());
		let ada = register(&server, "ada").await;
		let bob = register(&server, "bob").await;
		let moderator = register(&server, "mod").await;

		promote(&database, &moderator, Role::Moderator).await;

		let post = create_post(&server, &ada).await;
		let created = report(&server, &bob, &post, "post").await.json::<Value>();

		let response = server
			.put(&format!("/reports/{}", created["id"].as_str().unwrap()))
			.as_user(&moderator)
			.json(&json!({ "status": "approved", "action": "remove", "notes": "spam shop" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let reviewed = response.json::<Value>();

		assert_eq!(reviewed["status"], "approved");
		assert_eq!(reviewed["action_taken"], "remove");
		assert_eq!(reviewed["moderator_id"], json!(moderator.id));
		assert!(reviewed["reviewed_at"].is_string());

		let posts = server.get("/posts").await.json::<Value>();

		assert_eq!(posts, json!([]));

		let response = server.get(&format!("/posts/{post}")).await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

		let response = server.get(&format!("/posts/{post}")).as_user(&ada).await;

		assert_eq!(response.json::<Value>()["status"], "removed");

		let notifications = server.get("/notifications").as_user(&bob).await.json::<Value>();

		assert_eq!(notifications.as_array().unwrap().len(), 1);
		assert_eq!(notifications[0]["kind"], "report_reviewed");

		let notifications = server.get("/notifications").as_user(&ada).await.json::<Value>();

		assert_eq!(notifications.as_array().unwrap().len(), 1);
		assert_eq!(notifications[0]["kind"], "content_moderated");
		assert_eq!(notifications[0]["metadata"]["action"], "remove");
	}

	#[tokio::test]
	async fn test_reject_leaves_content_and_author_alone() {
		let database = database().await;
		let server = server(database.clone());
		let ada = register(&server, "ada").await;
		let bob = register(&server, "bob").await;
		let moderator = register(&server, "mod").await;

		promote(&database, &moderator, Role::Moderator).await;

		let post = create_post(&server, &ada).await;
		let created = report(&server, &bob, &post, "post").await.json::<Value>();

		server
			.put(&format!("/reports/{}", created["id"].as_str().unwrap()))
			.as_user(&moderator)
			.json(&json!({ "status": "rejected", "action": "remove" }))
			.await;

		let posts = server.get("/posts").await.json::<Value>();

		assert_eq!(posts.as_array().unwrap().len(), 1);

		let count = server.get("/notifications/unread").as_user(&ada).await.json::<Value>();

		assert_eq!(count["count"], 0);
	}

	#[tokio::test]
	async fn test_suspending_a_user() {
		let database = database().await;
		let server = server(database.clone());
		let ada = register(&server, "ada").await;
		let bob = register(&server, "bob").await;
		let moderator = register(&server, "mod").await;

		promote(&database, &moderator, Role::Moderator).await;

		let created = report(&server, &bob, &ada.id.to_string(), "user")
			.await
			.json::<Value>();

		let response = server
			.put(&format!("/reports/{}", created["id"].as_str().unwrap()))
			.as_user(&moderator)
			.json(&json!({ "status": "approved", "action": "hide" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let response = server.get("/auth/me").as_user(&ada).await;

		assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
	}

	#[tokio::test]
	async fn test_cannot_suspend_higher_or_equal_role() {
		let database = database().await;
		let server = server(database.clone());
		let bob = register(&server, "bob").await;
		let root = register(&server, "root").await;
		let moderator = register(&server, "mod").await;
		let peer = register(&server, "peer").await;

		promote(&database, &root, Role::Superadmin).await;
		promote(&database, &moderator, Role::Moderator).await;
		promote(&database, &peer, Role::Moderator).await;

		for target in [&root, &peer] {
			let created = report(&server, &bob, &target.id.to_string(), "user")
				.await
				.json::<Value>();
			let path = format!("/reports/{}", created["id"].as_str().unwrap());

			let response = server
				.put(&path)
				.as_user(&moderator)
				.json(&json!({ "status": "approved", "action": "remove" }))
				.await;

			assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
			assert_eq!(response.json::<Value>()["errors"][0]["content"], "outranked");

			let response = server.get("/auth/me").as_user(target).await;

			assert_eq!(response.status_code(), StatusCode::OK);

			let stored = server.get(&path).as_user(&moderator).await.json::<Value>();

			assert_eq!(stored["status"], "pending");
		}

		let reports = server
			.get("/reports?status=pending&content_type=user")
			.as_user(&root)
			.await
			.json::<Value>();
		let peer_report = reports
			.as_array()
			.unwrap()
			.iter()
			.find(|report| report["content_id"] == json!(peer.id))
			.unwrap();

		let response = server
			.put(&format!("/reports/{}", peer_report["id"].as_str().unwrap()))
			.as_user(&root)
			.json(&json!({ "status": "approved", "action": "hide" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let response = server.get("/auth/me").as_user(&peer).await;

		assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
	}

	#[tokio::test]
	async fn test_approve_comment_report_hides_comment() {
		let database = database().await;
		let server = server(database.clone());
		let ada = register(&server, "ada").await;
		let bob = register(&server, "bob").await;
		let moderator = register(&server, "mod").await;

		promote(&database, &moderator, Role::Moderator).await;

		let post = create_post(&server, &ada).await;
		let comment = server
			.post(&format!("/posts/{post}/comments"))
			.as_user(&ada)
			.json(&json!({ "content": "Use my coupon code" }))
			.await
			.json::<Value>();
		let comment_id = comment["id"].as_str().unwrap();

		let created = report(&server, &bob, comment_id, "comment").await.json::<Value>();

		assert_eq!(created["content_author_id"], json!(ada.id));

		let response = server
			.put(&format!("/reports/{}", created["id"].as_str().unwrap()))
			.as_user(&moderator)
			.json(&json!({ "status": "approved", "action": "hide" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let comments = server
			.get(&format!("/posts/{post}/comments"))
			.await
			.json::<Value>();

		assert_eq!(comments, json!([]));

		let posts = server.get("/posts").await.json::<Value>();

		assert_eq!(posts[0]["comment_count"], 0);

		let notifications = server.get("/notifications").as_user(&ada).await.json::<Value>();

		assert_eq!(notifications.as_array().unwrap().len(), 1);
		assert_eq!(notifications[0]["kind"], "content_moderated");
		assert_eq!(notifications[0]["content_type"], "comment");
		assert_eq!(notifications[0]["metadata"]["action"], "hide");
	}

	#[tokio::test]
	async fn test_warning_notifies_but_keeps_content() {
		let database = database().await;
		let server = server(database.clone());
		let ada = register(&server, "ada").await;
		let bob = register(&server, "bob").await;
		let moderator = register(&server, "mod").await;

		promote(&database, &moderator, Role::Moderator).await;

		let post = create_post(&server, &ada).await;
		let created = report(&server, &bob, &post, "post").await.json::<Value>();

		let response = server
			.put(&format!("/reports/{}", created["id"].as_str().unwrap()))
			.as_user(&moderator)
			.json(&json!({ "status": "approved", "action": "warn" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(response.json::<Value>()["action_taken"], "warn");

		let posts = server.get("/posts").await.json::<Value>();

		assert_eq!(posts.as_array().unwrap().len(), 1);
		assert_eq!(posts[0]["status"], "active");

		let notifications = server.get("/notifications").as_user(&ada).await.json::<Value>();

		assert_eq!(notifications.as_array().unwrap().len(), 1);
		assert_eq!(notifications[0]["kind"], "content_moderated");
		assert_eq!(notifications[0]["metadata"]["action"], "warn");
	}

	#[tokio::test]
	async fn test_review_rules() {
		let database = database().await;
		let server = server(database.clone());
		let ada = register(&server, "ada").await;
		let bob = register(&server, "bob").await;
		let moderator = register(&server, "mod").await;

		promote(&database, &moderator, Role::Moderator).await;

		let post = create_post(&server, &ada).await;
		let created = report(&server, &bob, &post, "post").await.json::<Value>();
		let path = format!("/reports/{}", created["id"].as_str().unwrap());

		let response = server
			.put(&path)
			.as_user(&bob)
			.json(&json!({ "status": "approved" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

		let response = server
			.put(&path)
			.as_user(&moderator)
			.json(&json!({ "status": "pending" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

		let response = server
			.put(&format!("/reports/{}", Uuid::new_v4()))
			.as_user(&moderator)
			.json(&json!({ "status": "resolved" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_report_visibility() {
		let database = database().await;
		let server = server(database.clone());
		let ada = register(&server, "ada").await;
		let bob = register(&server, "bob").await;
		let moderator = register(&server, "mod").await;

		promote(&database, &moderator, Role::Moderator).await;

		let post = create_post(&server, &ada).await;
		let created = report(&server, &bob, &post, "post").await.json::<Value>();
		let path = format!("/reports/{}", created["id"].as_str().unwrap());

		assert_eq!(server.get(&path).as_user(&bob).await.status_code(), StatusCode::OK);
		assert_eq!(server.get(&path).as_user(&ada).await.status_code(), StatusCode::FORBIDDEN);
		assert_eq!(server.get(&path).as_user(&moderator).await.status_code(), StatusCode::OK);

		let mine = server.get("/reports/me").as_user(&bob).await.json::<Value>();

		assert_eq!(mine.as_array().unwrap().len(), 1);

		assert_eq!(
			server.get("/reports").as_user(&bob).await.status_code(),
			StatusCode::FORBIDDEN
		);

		let pending = server
			.get("/reports?status=pending&content_type=post")
			.as_user(&moderator)
			.await
			.json::<Value>();

		assert_eq!(pending.as_array().unwrap().len(), 1);

		let approved = server
			.get("/reports?status=approved")
			.as_user(&moderator)
			.await
			.json::<Value>();

		assert_eq!(approved, json!([]));
	}
}
