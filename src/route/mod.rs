use aide::axum::ApiRouter;
use tower_governor::GovernorLayer;

use crate::{ratelimit, AppState};

pub mod auth;
pub mod chat;
pub mod comment;
pub mod contact;
pub mod docs;
pub mod model;
pub mod notification;
pub mod post;
pub mod report;
pub mod upload;
pub mod user;

/// Applies the stricter rate limit, when rate limiting is enabled.
fn secured(router: ApiRouter<AppState>, secure: Option<&ratelimit::Config>) -> ApiRouter<AppState> {
	match secure {
		Some(config) => router.layer(GovernorLayer {
			config: config.clone(),
		}),
		None => router,
	}
}

/// Every route of the API.
pub fn routes(secure: Option<&ratelimit::Config>) -> ApiRouter<AppState> {
	ApiRouter::new()
		.nest("/auth", secured(auth::routes(), secure))
		.nest("/users", user::routes())
		.nest("/posts", post::routes().merge(comment::routes()))
		.nest("/reports", report::routes())
		.nest("/notifications", notification::routes())
		.nest("/chat", secured(chat::routes(), secure))
		.nest("/contact", secured(contact::routes(), secure))
		.nest("/uploads", secured(upload::routes(), secure))
		.nest("/docs", docs::routes())
}
