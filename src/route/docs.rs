use std::sync::Arc;

use aide::{
	axum::{routing::get, ApiRouter, IntoApiResponse},
	openapi::OpenApi,
};
use axum::{response::IntoResponse, Extension};

use crate::{extract::Json, AppState};

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().route("/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(api.as_ref()).into_response()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_serves_openapi_document() {
		let server = server(database().await);

		let response = server.get("/docs/api.json").await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let api = response.json::<Value>();

		assert_eq!(api["info"]["title"], "IFCode API");
		assert!(api["paths"]["/posts/{id}/like"]["put"].is_object());
		assert!(api["paths"]["/reports/{id}"]["put"].is_object());
		assert!(api["components"]["securitySchemes"]["Bearer"].is_object());
	}
}
