//! Loan page rendering
//!
//! `render` turns a `ViewState` into the page body. The page starts from an
//! empty state; every form posts to a fragment endpoint that runs one
//! presenter action and swaps in the re-rendered panel. When the action
//! fails the response carries `HX-Reswap: none`, so the panel already in
//! the page (results and banners) stays as it was.

use crate::AppState;
use axum::extract::{Form, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use lendweb_client::{LoanRecord, Reply, Transition, ViewState};
use lendweb_core::{LenderChangeInput, LoanInput};
use lendweb_utils::escape_html;
use serde::Deserialize;
use serde_json::Value;

/// Query string of `GET /ui/loans/query`
#[derive(Debug, Deserialize)]
pub struct LoanIdQuery {
    #[serde(default)]
    pub id: String,
}

// ==================== Handlers ====================

/// Loans page
pub async fn page_loans(headers: HeaderMap) -> Html<String> {
    let inner_content = format!(
        r#"<div class='mb-6'>
            <h2 class='text-2xl font-bold'>Vessel loans</h2>
            <p class='text-gray-500 mt-1'>Record loans, look them up and re-assign lenders</p>
        </div>
        {}"#,
        render(&ViewState::default())
    );
    Html(crate::page_response(&headers, "Loans", "/", &inner_content))
}

/// Re-rendered panel, or an instruction to leave the current one in place
fn fragment(transition: Transition, render_panel: fn(&ViewState) -> String) -> Response {
    match transition {
        Transition::Applied(view) => Html(render_panel(&view)).into_response(),
        Transition::Unchanged(_) => ([("hx-reswap", "none")], Html(String::new())).into_response(),
    }
}

/// HTMX: list all loans
pub async fn htmx_all_loan(State(state): State<AppState>) -> Response {
    let transition = state.presenter.query_all_loan(ViewState::default()).await;
    fragment(transition, render_all_loan_panel)
}

/// HTMX: query one loan
pub async fn htmx_query_loan(
    State(state): State<AppState>,
    Query(query): Query<LoanIdQuery>,
) -> Response {
    let transition = state.presenter.query_loan(ViewState::default(), query.id.trim()).await;
    fragment(transition, render_query_panel)
}

/// HTMX: record a loan
pub async fn htmx_record_loan(
    State(state): State<AppState>,
    Form(input): Form<LoanInput>,
) -> Response {
    let transition = state.presenter.record_loan(ViewState::default(), &input).await;
    fragment(transition, render_record_panel)
}

/// HTMX: change a loan's lender
pub async fn htmx_change_lender(
    State(state): State<AppState>,
    Form(input): Form<LenderChangeInput>,
) -> Response {
    let transition = state.presenter.change_lender(ViewState::default(), &input).await;
    fragment(transition, render_lender_panel)
}

// ==================== Rendering ====================

/// Render the whole view state
pub fn render(view: &ViewState) -> String {
    format!(
        r#"<div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6 lg:col-span-2'>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'>{}</div>
        </div>"#,
        render_all_loan_panel(view),
        render_query_panel(view),
        render_record_panel(view),
        render_lender_panel(view)
    )
}

/// Status banner; hidden banners stay in the DOM so they can be toggled
fn banner(id: &str, visible: bool, tone: &str, text: &str) -> String {
    format!(
        r#"<div id='{}' data-visible='{}' class='mt-4 p-3 rounded-lg bg-{}-50 text-{}-700 border border-{}-200{}'>{}</div>"#,
        id,
        visible,
        tone,
        tone,
        tone,
        if visible { "" } else { " hidden" },
        text
    )
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => escape_html(s),
        other => escape_html(&other.to_string()),
    }
}

/// Key/value table for a JSON object, plain text for anything else
fn render_value(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let rows: String = map
                .iter()
                .map(|(k, v)| {
                    format!(
                        "<tr><td class='pr-4 py-1 text-sm text-gray-500'>{}</td><td class='py-1 font-medium'>{}</td></tr>",
                        escape_html(k),
                        display_value(v)
                    )
                })
                .collect();
            format!("<table class='mt-4'><tbody>{}</tbody></table>", rows)
        }
        other => format!("<p class='mt-4'>{}</p>", display_value(other)),
    }
}

const RECORD_COLUMNS: [&str; 4] = ["vessel", "location", "timestamp", "lender"];

fn render_loan_row(record: &LoanRecord) -> String {
    let key = record.key.map(|k| k.to_string()).unwrap_or_else(|| "-".to_string());
    let cells: String = RECORD_COLUMNS
        .iter()
        .map(|col| format!("<td class='px-4 py-2'>{}</td>", escape_html(&record.field(col))))
        .collect();
    format!("<tr class='hover:bg-gray-50'><td class='px-4 py-2 font-medium'>{}</td>{}</tr>", key, cells)
}

pub fn render_all_loan_panel(view: &ViewState) -> String {
    let table = if view.all_loan.is_empty() {
        "<div class='text-center py-8 text-gray-500'><p>No loans loaded</p></div>".to_string()
    } else {
        let rows: String = view.all_loan.iter().map(render_loan_row).collect();
        format!(
            r#"<div class='overflow-x-auto'>
            <table class='w-full'>
                <thead class='bg-gray-50'>
                    <tr>
                        <th class='px-4 py-2 text-left text-sm font-medium text-gray-600'>Key</th>
                        <th class='px-4 py-2 text-left text-sm font-medium text-gray-600'>Vessel</th>
                        <th class='px-4 py-2 text-left text-sm font-medium text-gray-600'>Location</th>
                        <th class='px-4 py-2 text-left text-sm font-medium text-gray-600'>Timestamp</th>
                        <th class='px-4 py-2 text-left text-sm font-medium text-gray-600'>Lender</th>
                    </tr>
                </thead>
                <tbody class='divide-y divide-gray-100'>{}</tbody>
            </table>
        </div>"#,
            rows
        )
    };

    format!(
        r#"<div id='all-loan-panel'>
            <div class='flex items-center justify-between mb-4'>
                <h3 class='text-lg font-semibold'>All loans</h3>
                <button hx-get='/ui/loans/all' hx-target='#all-loan-panel' hx-swap='outerHTML'
                    class='px-3 py-1.5 text-sm bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Query all loans</button>
            </div>
            {}
        </div>"#,
        table
    )
}

pub fn render_query_panel(view: &ViewState) -> String {
    let result = match &view.query_loan {
        Some(Reply::Found(value)) => render_value(value),
        _ => String::new(),
    };

    format!(
        r#"<div id='query-panel'>
            <h3 class='text-lg font-semibold mb-4'>Query a loan</h3>
            <form hx-get='/ui/loans/query' hx-target='#query-panel' hx-swap='outerHTML' class='flex gap-2'>
                <input name='id' placeholder='Loan id' class='flex-1 px-3 py-2 border rounded-lg'>
                <button class='px-3 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Query</button>
            </form>
            {}
            {}
        </div>"#,
        banner("error_query", view.banners.error_query, "red", "Could not locate loan"),
        result
    )
}

pub fn render_record_panel(view: &ViewState) -> String {
    let fields = [
        ("id", "Loan id"),
        ("longitude", "Longitude"),
        ("latitude", "Latitude"),
        ("timestamp", "Timestamp"),
        ("lender", "Lender"),
        ("vessel", "Vessel"),
    ];
    let inputs: String = fields
        .iter()
        .map(|(name, label)| {
            format!(
                "<input name='{}' placeholder='{}' class='w-full px-3 py-2 border rounded-lg'>",
                name, label
            )
        })
        .collect();
    let confirmation = view.create_loan.as_ref().map(render_value).unwrap_or_default();

    format!(
        r#"<div id='record-panel'>
            <h3 class='text-lg font-semibold mb-4'>Record a loan</h3>
            <form hx-post='/ui/loans/record' hx-target='#record-panel' hx-swap='outerHTML' class='space-y-2'>
                {}
                <button class='w-full px-3 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Record</button>
            </form>
            {}
            {}
        </div>"#,
        inputs,
        banner("success_create", view.banners.success_create, "green", "Loan recorded"),
        confirmation
    )
}

pub fn render_lender_panel(view: &ViewState) -> String {
    let confirmation = match &view.change_lender {
        Some(Reply::Found(value)) => render_value(value),
        _ => String::new(),
    };

    format!(
        r#"<div id='lender-panel'>
            <h3 class='text-lg font-semibold mb-4'>Change lender</h3>
            <form hx-post='/ui/loans/lender' hx-target='#lender-panel' hx-swap='outerHTML' class='space-y-2'>
                <input name='id' placeholder='Loan id' class='w-full px-3 py-2 border rounded-lg'>
                <input name='name' placeholder='New lender' class='w-full px-3 py-2 border rounded-lg'>
                <button class='w-full px-3 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Change</button>
            </form>
            {}
            {}
            {}
        </div>"#,
        banner("success_holder", view.banners.success_holder, "green", "Lender changed"),
        banner("error_holder", view.banners.error_holder, "red", "Error: no loan found"),
        confirmation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use crate::test_support::{body_text, demo_state};
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use lendweb_config::Config;
    use lendweb_core::LedgerEntry;
    use serde_json::json;
    use tower::ServiceExt;

    fn visible(html: &str, id: &str) -> bool {
        html.contains(&format!("id='{}' data-visible='true'", id))
    }

    #[test]
    fn test_render_empty_state_hides_banners() {
        let html = render(&ViewState::default());
        for id in ["error_query", "success_create", "success_holder", "error_holder"] {
            assert!(html.contains(&format!("id='{}' data-visible='false'", id)));
        }
        assert!(html.contains("No loans loaded"));
    }

    #[test]
    fn test_render_lender_banners() {
        let html = render_lender_panel(&ViewState::default().with_lender_change(Reply::NotFound));
        assert!(visible(&html, "error_holder"));
        assert!(!visible(&html, "success_holder"));

        let html = render_lender_panel(&ViewState::default().with_lender_change(Reply::Found(json!({}))));
        assert!(!visible(&html, "error_holder"));
        assert!(visible(&html, "success_holder"));
    }

    #[test]
    fn test_render_escapes_record_fields() {
        let view = ViewState::default().with_all_loan(vec![LedgerEntry {
            key: "1".to_string(),
            record: json!({ "vessel": "<b>Aurora</b>", "lender": "Irene" }),
        }]);
        let html = render_all_loan_panel(&view);
        assert!(html.contains("&lt;b&gt;Aurora&lt;/b&gt;"));
        assert!(!html.contains("<b>Aurora</b>"));
    }

    #[tokio::test]
    async fn test_page_loans_full_page() {
        let response = create_router(demo_state(Config::default()))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("id='all-loan-panel'"));
    }

    #[tokio::test]
    async fn test_htmx_all_loan_sorted() {
        let response = create_router(demo_state(Config::default()))
            .oneshot(Request::builder().uri("/ui/loans/all").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(response).await;
        let irene = html.find("Irene").unwrap();
        let patrick = html.find("Patrick").unwrap();
        assert!(irene < patrick);
    }

    #[tokio::test]
    async fn test_htmx_query_loan_banner() {
        let router = create_router(demo_state(Config::default()));

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/ui/loans/query?id=404").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(visible(&body_text(response).await, "error_query"));

        let response = router
            .oneshot(Request::builder().uri("/ui/loans/query?id=2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(!visible(&html, "error_query"));
        assert!(html.contains("Jenny"));
    }

    #[tokio::test]
    async fn test_htmx_record_then_change_lender() {
        let state = demo_state(Config::default());
        let controller = state.controller.clone();
        let router = create_router(state);

        let form = "id=12&longitude=10&latitude=20&timestamp=t1&lender=L1&vessel=V1";
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ui/loans/record")
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(visible(&body_text(response).await, "success_create"));
        assert_eq!(controller.get_loan("12").await.unwrap().location, "10, 20");

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ui/loans/lender")
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("id=99&name=Bob"))
                    .unwrap(),
            )
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(visible(&html, "error_holder"));
        assert!(!visible(&html, "success_holder"));
    }

    async fn post_record(router: &axum::Router, form: &'static str) -> axum::response::Response {
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ui/loans/record")
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_failed_record_leaves_panel_in_place() {
        let state = demo_state(Config::default());
        let controller = state.controller.clone();
        let router = create_router(state);

        let response =
            post_record(&router, "id=12&longitude=10&latitude=20&timestamp=t1&lender=L1&vessel=V1").await;
        assert!(response.headers().get("hx-reswap").is_none());
        let html = body_text(response).await;
        assert!(visible(&html, "success_create"));
        assert!(html.contains("12"));

        // the ledger refuses an empty id
        let response =
            post_record(&router, "id=&longitude=1&latitude=2&timestamp=t2&lender=L2&vessel=V2").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("hx-reswap").unwrap(), "none");
        assert!(body_text(response).await.is_empty());

        assert_eq!(controller.get_loan("12").await.unwrap().vessel, "V1");
    }

    #[tokio::test]
    async fn test_transition_fragment() {
        let view = ViewState::default().with_created_loan(json!({"key": "3"}));

        let response = fragment(Transition::Applied(view.clone()), render_record_panel);
        assert!(response.headers().get("hx-reswap").is_none());
        assert!(visible(&body_text(response).await, "success_create"));

        let response = fragment(Transition::Unchanged(view), render_record_panel);
        assert_eq!(response.headers().get("hx-reswap").unwrap(), "none");
    }
}
