//! Application router configuration.

use axum::{Router, middleware, response::Redirect, routing::get};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    internal_server_error::get_internal_server_error_page,
    logging::logging_middleware,
    not_found::get_404_not_found,
    statement::{get_ledger_export, get_ledger_page, get_statement},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::LEDGER_VIEW, get(get_ledger_page))
        .route(endpoints::LEDGER_EXPORT, get(get_ledger_export))
        .route(endpoints::STATEMENT_API, get(get_statement))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .layer(middleware::from_fn(logging_middleware))
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the ledger page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::LEDGER_VIEW)
}

#[cfg(test)]
mod routing_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use axum_test::TestServer;

    use crate::{
        AppState, backend::BackendClient, endpoints, pagination::PaginationConfig,
        routing::{build_router, get_index_page},
    };

    fn test_state() -> AppState {
        // Nothing in these tests reaches the backend, so any address works.
        let backend = BackendClient::new("http://127.0.0.1:1").unwrap();
        AppState::new(backend, "Etc/UTC", PaginationConfig::default())
    }

    #[tokio::test]
    async fn root_redirects_to_ledger() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::LEDGER_VIEW);
    }

    #[tokio::test]
    async fn unknown_routes_render_the_404_page() {
        let server = TestServer::new(build_router(test_state()));

        let response = server.get("/definitely-not-a-route").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("404"));
    }

    #[tokio::test]
    async fn error_route_renders_the_500_page() {
        let server = TestServer::new(build_router(test_state()));

        let response = server.get(endpoints::INTERNAL_ERROR_VIEW).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().contains("500"));
    }
}
