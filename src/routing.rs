//! Application router configuration with route and CORS definitions.

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::{
    AppState,
    csv_export::export_csv_endpoint,
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expenses_endpoint,
        update_expense_endpoint,
    },
    report::export_pdf_endpoint,
    stores::ExpenseStore,
};

/// Return a router with all the app's routes.
///
/// Cross-origin requests are allowed from `allowed_origins` with any method
/// or header and with credentials.
pub fn build_router<E>(state: AppState<E>, allowed_origins: Vec<HeaderValue>) -> Router
where
    E: ExpenseStore + Clone + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route(
            endpoints::EXPENSES,
            post(create_expense_endpoint::<E>).get(get_expenses_endpoint::<E>),
        )
        .route(
            endpoints::EXPENSE,
            put(update_expense_endpoint::<E>).delete(delete_expense_endpoint::<E>),
        )
        .route(endpoints::EXPORT_CSV, get(export_csv_endpoint::<E>))
        .route(endpoints::EXPORT_PDF, get(export_pdf_endpoint::<E>))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod routing_tests {
    use std::sync::{Arc, Mutex};

    use axum::http::{HeaderValue, StatusCode, header::ORIGIN};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, db::initialize, endpoints, stores::SQLiteExpenseStore};

    use super::build_router;

    fn get_test_server(allowed_origins: Vec<HeaderValue>) -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        let store = SQLiteExpenseStore::new(Arc::new(Mutex::new(connection)));
        let app = build_router(AppState::new(store), allowed_origins);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() {
        let server = get_test_server(Vec::new());

        let response = server.get("/does/not/exist").await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn allowed_origin_is_echoed_back() {
        let origin = "http://localhost:3000";
        let server = get_test_server(vec![HeaderValue::from_static(origin)]);

        let response = server
            .get(endpoints::EXPENSES)
            .add_header(ORIGIN, HeaderValue::from_static(origin))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.header("access-control-allow-origin"), origin);
        assert_eq!(response.header("access-control-allow-credentials"), "true");
    }

    #[tokio::test]
    async fn unlisted_origin_is_not_allowed() {
        let server = get_test_server(vec![HeaderValue::from_static("http://localhost:3000")]);

        let response = server
            .get(endpoints::EXPENSES)
            .add_header(ORIGIN, HeaderValue::from_static("http://evil.example.com"))
            .await;

        assert!(
            response
                .maybe_header("access-control-allow-origin")
                .is_none()
        );
    }
}
