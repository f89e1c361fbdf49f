#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod openapi;
mod ratelimit;
mod route;
mod service;
mod session;
mod trace;

use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};

use aide::openapi::OpenApi;
use argon2::Argon2;
use axum::{Extension, Router};
use sqlx::sqlite::SqliteConnectOptions;
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

pub use config::Config;

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as a database connection pool, a hash configuration (if it's expensive to create),
/// or the HTTP client used to reach external services.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub config: Arc<Config>,
	pub http: reqwest::Client,
}

impl State {
	pub fn new(database: Database, config: Config) -> Result<Self, reqwest::Error> {
		let http = reqwest::Client::builder()
			.timeout(Duration::from_secs(60))
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()?;

		Ok(Self {
			database,
			hasher: Argon2::default(),
			config: Arc::new(config),
			http,
		})
	}
}

/// Opens the database, creating it if missing, and applies pending migrations.
pub async fn connect(url: &str) -> Result<Database, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(url)?
		.create_if_missing(true)
		.foreign_keys(true);
	let database = Database::connect_with(options).await?;

	sqlx::migrate!().run(&database).await?;

	Ok(database)
}

/// Builds the application router, including the `OpenAPI` document.
///
/// Rate limits are applied when enabled in the configuration.
pub fn app(state: AppState) -> Router {
	let limits = state
		.config
		.rate_limit
		.then(|| (ratelimit::default(), ratelimit::secure()));

	if let Some((default, secure)) = &limits {
		ratelimit::cleanup_old_limits(&[default, secure]);
	}

	let mut api = OpenApi::default();

	let router = route::routes(limits.as_ref().map(|(_, secure)| secure))
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)));

	let router = match limits {
		Some((default, _)) => router.layer(tower_governor::GovernorLayer { config: default }),
		None => router,
	};

	router
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(TraceLayer::new_for_http().on_response(trace::record_latency))
				.layer(CorsLayer::permissive())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init_tracing_subscriber(config.otlp_enabled);

	let database = connect(&config.database_url)
		.await
		.expect("failed to open database");

	let address = (config.host.clone(), config.port);
	let state = State::new(database, config).expect("failed to build HTTP client");
	let app = app(state);

	let listener = tokio::net::TcpListener::bind(address)
		.await
		.expect("failed to bind to port");

	tracing::info!(
		"listening on {}",
		listener.local_addr().expect("bound listener has an address")
	);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await
	.expect("server error");
}
