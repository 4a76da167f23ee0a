//! Settings page rendering - Full page endpoints

use crate::AppState;
use lendweb_utils::escape_html;

fn setting(label: &str, value: &str) -> String {
    format!(
        "<div><p class='text-sm text-gray-500'>{}</p><p class='font-medium'>{}</p></div>",
        label,
        escape_html(value)
    )
}

fn enabled(flag: bool) -> &'static str {
    if flag { "Enabled" } else { "Disabled" }
}

pub async fn page_settings(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let config = &state.config;

    let timeout = config
        .client
        .timeout_secs
        .map(|s| format!("{} s", s))
        .unwrap_or_else(|| "None".to_string());

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Settings</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Server</h3>
            <div class='grid grid-cols-2 gap-4'>{}{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Ledger</h3>
            <div class='grid grid-cols-2 gap-4'>{}{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Wire</h3>
            <div class='grid grid-cols-2 gap-4'>{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Client</h3>
            <div class='grid grid-cols-2 gap-4'>{}{}{}{}</div>
        </div>"#,
        setting("Host", &config.server.host),
        setting("Port", &config.server.port.to_string()),
        setting("CORS", enabled(config.server.cors)),
        setting("Demo data", enabled(config.ledger.seed_demo_data)),
        setting("Range start", &config.ledger.range_start),
        setting("Range end", &config.ledger.range_end),
        setting("Sentinel bodies", enabled(config.wire.legacy_sentinels)),
        setting("Base URL", &config.client.base_url),
        setting("Protocol", &config.client.protocol.to_string()),
        setting("Timeout", &timeout),
        setting("Log level", &config.logging.level),
    );

    axum::response::Html(crate::page_response(&headers, "Settings", "/settings", &inner_content))
}
