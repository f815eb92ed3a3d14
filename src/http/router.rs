//! `(verb, path)` routing for the HTTP transport.

use serde_json::json;
use tracing::{error, warn};

use super::request::HttpRequest;
use super::response::HttpResponse;
use crate::mcp::context::StatusSnapshot;
use crate::mcp::dispatcher::DispatcherHandle;

/// Route one parsed request to a response.
pub async fn route(request: HttpRequest, dispatcher: &DispatcherHandle) -> HttpResponse {
    match (request.method.as_str(), request.path()) {
        ("GET", "/") => match dispatcher.status().await {
            Ok(status) => HttpResponse::html(200, status_page(&status)),
            Err(err) => unavailable(&err),
        },
        ("GET", "/status") => match dispatcher.status().await {
            Ok(status) => HttpResponse::json(200, &status),
            Err(err) => unavailable(&err),
        },
        ("GET", "/health") => match dispatcher.status().await {
            Ok(status) => HttpResponse::json(200, &json!({ "status": "ok", "port": status.port })),
            Err(err) => unavailable(&err),
        },
        ("POST", "/mcp") => {
            let HttpRequest { headers, body, .. } = request;
            match dispatcher.dispatch(body, headers).await {
                Ok(response) => match response.to_bytes() {
                    Ok(bytes) => HttpResponse::json_bytes(200, bytes),
                    Err(err) => {
                        error!(%err, "failed to serialize JSON-RPC response");
                        dispatcher.log(format!("response serialization failed: {err}"));
                        HttpResponse::internal_error()
                    }
                },
                Err(err) => {
                    error!(%err, "JSON-RPC dispatch failed");
                    dispatcher.log(format!("dispatch failed: {err}"));
                    HttpResponse::internal_error()
                }
            }
        }
        (method, path) => {
            warn!(%method, %path, "no route");
            dispatcher.log(format!("404 {method} {path}"));
            HttpResponse::not_found()
        }
    }
}

fn unavailable(err: &crate::AppError) -> HttpResponse {
    error!(%err, "status unavailable");
    HttpResponse::text(503, "Service Unavailable")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the human-readable status page served at `GET /`.
#[must_use]
pub fn status_page(status: &StatusSnapshot) -> String {
    let state = if status.running { "running" } else { "stopped" };
    let scripting = if status.scripting_available {
        "available"
    } else {
        "not available"
    };

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>{name} MCP server</title></head>\n\
         <body>\n\
         <h1>{name} {version}</h1>\n\
         <ul>\n\
         <li>Status: {state}</li>\n\
         <li>Port: {port}</li>\n\
         <li>Tools: {tools}</li>\n\
         <li>Script execution: {scripting}</li>\n\
         </ul>\n\
         <p>JSON-RPC endpoint: <code>POST /mcp</code>. \
         See also <a href=\"/status\">/status</a> and <a href=\"/health\">/health</a>.</p>\n\
         </body>\n\
         </html>\n",
        name = escape_html(&status.server),
        version = escape_html(&status.version),
        port = status.port,
        tools = status.tool_count,
    )
}
