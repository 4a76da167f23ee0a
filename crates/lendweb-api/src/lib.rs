//! HTTP server for the loan service
//!
//! Routes are organized into modules:
//! - routes::loans: the legacy route table, the JSON API and the loan page
//! - routes::settings: configuration display

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post, put},
    Router,
};
use lendweb_client::Presenter;
use lendweb_config::Config;
use lendweb_core::LoanController;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Ledger the route table dispatches to
    pub controller: Arc<dyn LoanController>,
    /// Presentation controller behind the page fragments
    pub presenter: Presenter,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::loans::{
        add_loan, api_loan_change_lender, api_loan_create, api_loan_detail, api_loans,
        change_lender, get_all_loan, get_loan, htmx_all_loan, htmx_change_lender,
        htmx_query_loan, htmx_record_loan, page_loans,
    };
    use routes::settings::{api_settings, page_settings};

    let cors = state.config.server.cors;

    let router = Router::new()
        // Legacy route table
        .route("/get_loan/:id", get(get_loan))
        .route("/add_loan/:loan", get(add_loan))
        .route("/get_all_loan", get(get_all_loan))
        .route("/get_all_loan/", get(get_all_loan))
        .route("/change_lender/:lender", get(change_lender))
        // JSON API
        .route("/api/health", get(health_check))
        .route("/api/loans", get(api_loans).post(api_loan_create))
        .route("/api/loans/:id", get(api_loan_detail))
        .route("/api/loans/:id/lender", put(api_loan_change_lender))
        .route("/api/settings", get(api_settings))
        // Pages
        .route("/", get(page_loans))
        .route("/settings", get(page_settings))
        // HTMX partial routes
        .route("/ui/loans/all", get(htmx_all_loan))
        .route("/ui/loans/query", get(htmx_query_loan))
        .route("/ui/loans/record", post(htmx_record_loan))
        .route("/ui/loans/lender", post(htmx_change_lender))
        .fallback(not_found)
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound { resource: uri.path().to_string() }
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Lendweb</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        lendweb_utils::escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [("/", "Loans"), ("/settings", "Settings")];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Lendweb</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label) in &links {
        let is_active = if *path == "/" {
            current_path == "/"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'><span>{}</span></a></li>"#,
            path, active_class, label
        ));
    }

    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Serve the router on an already bound listener
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router).await
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until the process stops.
pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let addr = state.config.bind_addr();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!(target: "lendweb::api", "Starting Lendweb server on http://{}", addr);
    log::info!(target: "lendweb::api", "Legacy routes: /get_loan/:id, /add_loan/:loan, /get_all_loan, /change_lender/:lender");
    log::info!(target: "lendweb::api", "JSON API: /api/loans, /api/loans/:id, /api/loans/:id/lender");

    let result = serve(listener, router).await;
    match &result {
        Ok(_) => log::info!(target: "lendweb::api", "Server stopped gracefully"),
        Err(e) => log::error!(target: "lendweb::api", "Server error: {}", e),
    }
    result
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use lendweb_client::LocalGateway;
    use lendweb_core::InMemoryLedger;

    /// State over a demo-seeded ledger, with the page wired to it in-process
    pub fn demo_state(config: Config) -> AppState {
        let controller: Arc<dyn LoanController> =
            Arc::new(InMemoryLedger::with_demo_data(&config.ledger));
        state_with(controller, config)
    }

    pub fn state_with(controller: Arc<dyn LoanController>, config: Config) -> AppState {
        let presenter = Presenter::new(Arc::new(LocalGateway::new(controller.clone())));
        AppState { controller, presenter, config }
    }

    pub async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{body_text, demo_state};
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use lendweb_client::{HttpGateway, LoanGateway, Reply};
    use lendweb_config::{ClientConfig, Protocol};
    use lendweb_core::{LenderChangeInput, LoanInput};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let router = create_router(demo_state(Config::default()));
        let response = router
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let router = create_router(demo_state(Config::default()));
        let response = router
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("/nope"));
    }

    #[test]
    fn test_page_response_partial_vs_full() {
        let mut headers = axum::http::HeaderMap::new();
        let full = page_response(&headers, "Loans", "/", "<p>x</p>");
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(full.contains("Lendweb"));

        headers.insert("hx-request", "true".parse().unwrap());
        let partial = page_response(&headers, "Loans", "/", "<p>x</p>");
        assert!(!partial.contains("<!DOCTYPE html>"));
        assert!(partial.contains("<p>x</p>"));
    }

    async fn spawn_server(config: Config) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = create_router(demo_state(config));
        tokio::spawn(serve(listener, router));
        format!("http://{}", addr)
    }

    fn gateway_for(base_url: String, protocol: Protocol) -> HttpGateway {
        HttpGateway::new(&ClientConfig {
            base_url,
            protocol,
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    async fn exercise_gateway(protocol: Protocol) {
        let base_url = spawn_server(Config::default()).await;
        let gateway = gateway_for(base_url, protocol);

        assert_eq!(gateway.query_all_loan().await.unwrap().len(), 8);

        let loan = gateway.query_loan("2").await.unwrap().found().unwrap();
        assert_eq!(loan["lender"], "Jenny");
        assert_eq!(gateway.query_loan("42").await.unwrap(), Reply::NotFound);

        let input = LoanInput {
            id: "9".to_string(),
            longitude: "10".to_string(),
            latitude: "20".to_string(),
            timestamp: "t1".to_string(),
            lender: "L1".to_string(),
            vessel: "V1".to_string(),
        };
        let receipt = gateway.record_loan(&input).await.unwrap();
        assert_eq!(receipt["key"], "9");

        let loan = gateway.query_loan("9").await.unwrap().found().unwrap();
        assert_eq!(loan["location"], "10, 20");
        assert_eq!(loan["vessel"], "V1");

        let change = LenderChangeInput { id: "9".to_string(), name: "Bob".to_string() };
        assert!(!gateway.change_lender(&change).await.unwrap().is_not_found());
        let missing = LenderChangeInput { id: "77".to_string(), name: "Bob".to_string() };
        assert_eq!(gateway.change_lender(&missing).await.unwrap(), Reply::NotFound);

        let loan = gateway.query_loan("9").await.unwrap().found().unwrap();
        assert_eq!(loan["lender"], "Bob");
    }

    #[tokio::test]
    async fn test_http_gateway_legacy_end_to_end() {
        exercise_gateway(Protocol::Legacy).await;
    }

    #[tokio::test]
    async fn test_http_gateway_structured_end_to_end() {
        exercise_gateway(Protocol::Structured).await;
    }

    #[tokio::test]
    async fn test_legacy_gateway_against_server_without_sentinels() {
        let mut config = Config::default();
        config.wire.legacy_sentinels = false;
        let gateway = gateway_for(spawn_server(config).await, Protocol::Legacy);

        assert_eq!(gateway.query_loan("42").await.unwrap(), Reply::NotFound);
        let missing = LenderChangeInput { id: "77".to_string(), name: "Bob".to_string() };
        assert_eq!(gateway.change_lender(&missing).await.unwrap(), Reply::NotFound);

        let presenter = Presenter::new(Arc::new(gateway));
        let view = presenter.query_loan(Default::default(), "42").await;
        assert!(view.is_applied());
        assert!(view.into_state().banners.error_query);

        let view = presenter.query_loan(Default::default(), "1").await.into_state();
        assert!(!view.banners.error_query);
    }
}
