//! Development server for the live preview.
//!
//! A lightweight HTTP server built on `tiny_http`:
//!
//! - Host page with the device frame and the console panel
//! - Freshly synthesized preview document on every request
//! - Console bridge endpoint fed by the host page
//! - Raw project files under `/files/`
//! - File watching and reload (via `watch` module)
//! - Graceful shutdown on Ctrl+C
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │  Watcher Thread  │
//! │  (HTTP Server)  │     │  (File Monitor)  │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//!    snapshot.load()        snapshot.store()
//!    synthesize preview     re-parse project
//! └─────────────────────────────────────────────┘
//!                    │
//!                    ▼
//!        ServeState (ArcSwap<Snapshot>)
//! ```
//!
//! # Routes
//!
//! | Method          | Path                  | Response                          |
//! |-----------------|-----------------------|-----------------------------------|
//! | GET             | `/`                   | host page                         |
//! | GET             | `/__preview`          | preview document                  |
//! | GET             | `/__revision`         | revision number, plain text       |
//! | GET             | `/__device?name=…`    | switch device, redirect to `/`    |
//! | GET/POST/DELETE | `/__console`          | list / append / clear console log |
//! | GET             | `/files/<name>`       | raw project file                  |

use crate::{
    config::{WebConfig, cfg},
    console::{ConsoleLog, ConsoleMessage},
    log,
    preview::{self, DeviceProfile, HostMode, render_host},
    project::ProjectStore,
    watch::watch_for_changes_blocking,
};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use std::{
    io::Read,
    net::{IpAddr, SocketAddr},
    path::Path,
    sync::Arc,
};
use tiny_http::{Header, Method, Request, Response, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Largest accepted console message body.
const MAX_BODY_BYTES: u64 = 1024 * 1024;

// ============================================================================
// Shared State
// ============================================================================

/// What the preview is computed from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Project text as read from disk
    pub source: String,
    pub store: ProjectStore,
    pub device: DeviceProfile,
    /// Bumped on every store or device change; the host page polls it.
    pub revision: u64,
}

/// State shared by the request loop and the watcher thread.
pub struct ServeState {
    snapshot: ArcSwap<Snapshot>,
    pub console: ConsoleLog,
    pub title: String,
}

impl ServeState {
    pub fn new(source: impl Into<String>, device: DeviceProfile, title: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot {
                store: ProjectStore::parse(&source),
                source,
                device,
                revision: 1,
            }),
            console: ConsoleLog::new(),
            title: title.into(),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Swap in new project text. Returns `false` when it equals the current one.
    pub fn replace_source(&self, source: String) -> bool {
        if self.snapshot.load().source == source {
            return false;
        }
        let store = ProjectStore::parse(&source);
        self.snapshot.rcu(|current| Snapshot {
            source: source.clone(),
            store: store.clone(),
            device: current.device,
            revision: current.revision + 1,
        });
        true
    }

    pub fn set_device(&self, device: DeviceProfile) {
        self.snapshot.rcu(|current| Snapshot {
            source: current.source.clone(),
            store: current.store.clone(),
            device,
            revision: current.revision + 1,
        });
    }
}

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the development server with optional file watching.
///
/// This function:
/// 1. Binds to the configured interface and port (with auto-retry on port conflict)
/// 2. Sets up Ctrl+C handler for graceful shutdown
/// 3. Spawns file watcher thread (if enabled)
/// 4. Enters the main request handling loop
///
/// The server blocks until Ctrl+C is received.
pub fn serve_project(state: Arc<ServeState>) -> Result<()> {
    let c = cfg();
    let interface: IpAddr = c.serve.interface.parse()?;
    let base_port = c.serve.port;

    let (server, addr) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    if c.serve.watch {
        let state = Arc::clone(&state);
        std::thread::spawn(move || {
            if let Err(err) = watch_for_changes_blocking(&state) {
                log!("watch"; "{err}");
            }
        });
    }

    // Handle requests in main thread (blocks until Ctrl+C)
    for request in server.incoming_requests() {
        // Re-load config on each request to pick up hot-reloaded changes
        if let Err(e) = handle_request(request, &state, &cfg()) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// A response independent of the transport, so routing can be tested directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub location: Option<&'static str>,
}

impl Reply {
    fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            location: None,
        }
    }

    fn html(body: String) -> Self {
        Self::new(200, "text/html; charset=utf-8", body)
    }

    fn text(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body)
    }

    fn no_content() -> Self {
        Self::text(204, Vec::new())
    }

    fn not_found() -> Self {
        Self::text(404, "404 Not Found")
    }

    fn method_not_allowed() -> Self {
        Self::text(405, "405 Method Not Allowed")
    }

    fn redirect(location: &'static str) -> Self {
        Self {
            location: Some(location),
            ..Self::text(303, Vec::new())
        }
    }
}

/// Read the body and dispatch a single HTTP request.
fn handle_request(mut request: Request, state: &ServeState, config: &WebConfig) -> Result<()> {
    let mut body = String::new();
    if *request.method() == Method::Post {
        request
            .as_reader()
            .take(MAX_BODY_BYTES)
            .read_to_string(&mut body)
            .context("Failed to read request body")?;
    }

    let reply = route(request.method(), request.url(), &body, state, config);
    respond(request, reply)
}

/// Resolve a request to a reply.
pub fn route(method: &Method, url: &str, body: &str, state: &ServeState, config: &WebConfig) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    match (method, path) {
        (Method::Get, "/") => {
            let snap = state.snapshot();
            Reply::html(render_host(
                &state.title,
                snap.device,
                HostMode::Live {
                    revision: snap.revision,
                },
            ))
        }
        (Method::Get, "/__preview") => {
            let snap = state.snapshot();
            Reply::html(preview::synthesize(&snap.store, &snap.source, &config.preview).html)
        }
        (Method::Get, "/__revision") => Reply::text(200, state.snapshot().revision.to_string()),
        (Method::Get, "/__device") => switch_device(query, state),
        (Method::Get, "/__console") => match state.console.to_json() {
            Ok(json) => Reply::new(200, "application/json; charset=utf-8", json),
            Err(e) => Reply::text(500, e.to_string()),
        },
        (Method::Post, "/__console") => match ConsoleMessage::from_json(body) {
            Ok(message) => {
                let at = chrono::Local::now().format("%H:%M:%S");
                log!("console"; "{at} [{}] {}", message.kind, message.content);
                state.console.record(message);
                Reply::no_content()
            }
            Err(e) => Reply::text(400, e.to_string()),
        },
        (Method::Delete, "/__console") => {
            state.console.clear();
            Reply::no_content()
        }
        (_, "/" | "/__preview" | "/__revision" | "/__device" | "/__console") => {
            Reply::method_not_allowed()
        }
        (Method::Get, path) if path.starts_with("/files/") => serve_project_file(path, state),
        _ => Reply::not_found(),
    }
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<std::borrow::Cow<'a, str>> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| urlencoding::decode(v).ok())
}

fn switch_device(query: &str, state: &ServeState) -> Reply {
    let Some(device) = query_param(query, "name").and_then(|name| DeviceProfile::from_name(&name))
    else {
        return Reply::text(400, "unknown device, expected compact, medium or wide");
    };

    state.set_device(device);
    log!("serve"; "device: {device}");
    Reply::redirect("/")
}

fn serve_project_file(path: &str, state: &ServeState) -> Reply {
    let Ok(name) = urlencoding::decode(path.trim_start_matches("/files/")) else {
        return Reply::not_found();
    };

    let snap = state.snapshot();
    match snap.store.find(&name) {
        Some(file) => Reply::new(200, guess_content_type(Path::new(&file.name)), file.content.clone()),
        None => Reply::not_found(),
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name, value).expect("static header is valid")
}

fn respond(request: Request, reply: Reply) -> Result<()> {
    let mut response = Response::from_data(reply.body)
        .with_status_code(reply.status)
        .with_header(header("Content-Type", reply.content_type))
        .with_header(header("Cache-Control", "no-store"));

    if let Some(location) = reply.location {
        response = response.with_header(header("Location", location));
    }

    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `text/plain` for unknown extensions; every project file is text.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs" | "cjs" | "jsx") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("md" | "markdown") => "text/markdown; charset=utf-8",
        _ => "text/plain; charset=utf-8",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        console::{CLEARED_MESSAGE, INIT_MESSAGE, LogKind},
        preview::FallbackKind,
    };

    fn state() -> ServeState {
        ServeState::new(
            "// FILE: index.html\n<body><h1>Hi</h1></body>\n\n// FILE: js/app.js\nconsole.log(1);",
            DeviceProfile::Compact,
            "demo",
        )
    }

    fn get(state: &ServeState, url: &str) -> Reply {
        route(&Method::Get, url, "", state, &WebConfig::default())
    }

    fn body(reply: &Reply) -> String {
        String::from_utf8_lossy(&reply.body).into_owned()
    }

    #[test]
    fn test_host_page() {
        let reply = get(&state(), "/");
        assert_eq!(reply.status, 200);
        assert!(body(&reply).contains(r#"src="/__preview""#));
        assert!(body(&reply).contains("var revision = '1';"));
    }

    #[test]
    fn test_preview_document() {
        let reply = get(&state(), "/__preview");
        assert_eq!(reply.status, 200);
        assert!(body(&reply).contains("<h1>Hi</h1>"));
        assert!(body(&reply).contains("console.log(1);"));
    }

    #[test]
    fn test_device_switch_bumps_revision() {
        let state = state();
        let reply = get(&state, "/__device?name=tablet");

        assert_eq!(reply.status, 303);
        assert_eq!(reply.location, Some("/"));
        assert_eq!(state.snapshot().device, DeviceProfile::Medium);
        assert_eq!(body(&get(&state, "/__revision")), "2");
    }

    #[test]
    fn test_device_switch_rejects_unknown() {
        let state = state();
        assert_eq!(get(&state, "/__device?name=watch").status, 400);
        assert_eq!(get(&state, "/__device").status, 400);
        assert_eq!(state.snapshot().revision, 1);
    }

    #[test]
    fn test_console_roundtrip() {
        let state = state();
        let config = WebConfig::default();
        for (kind, text) in [("info", "a"), ("error", "b"), ("warn", "c")] {
            let payload = serde_json::json!({ "type": "console", "logType": kind, "content": text });
            let reply = route(&Method::Post, "/__console", &payload.to_string(), &state, &config);
            assert_eq!(reply.status, 204);
        }

        let entries: serde_json::Value = serde_json::from_slice(&get(&state, "/__console").body).unwrap();
        let kinds: Vec<_> = entries.as_array().unwrap().iter().map(|e| e["kind"].clone()).collect();
        assert_eq!(kinds, ["info", "info", "error", "warn"]);
        assert_eq!(entries[0]["text"], INIT_MESSAGE);
    }

    #[test]
    fn test_console_rejects_bad_payload() {
        let state = state();
        let config = WebConfig::default();
        let bad = r#"{"type":"console","logType":"trace","content":"x"}"#;

        assert_eq!(route(&Method::Post, "/__console", bad, &state, &config).status, 400);
        assert_eq!(route(&Method::Post, "/__console", "{", &state, &config).status, 400);
        assert_eq!(state.console.snapshot().len(), 1);
    }

    #[test]
    fn test_console_clear() {
        let state = state();
        state.console.push(LogKind::Error, "boom");

        let reply = route(&Method::Delete, "/__console", "", &state, &WebConfig::default());
        assert_eq!(reply.status, 204);

        let entries = state.console.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, CLEARED_MESSAGE);
    }

    #[test]
    fn test_project_files() {
        let state = state();
        let reply = get(&state, "/files/js%2Fapp.js");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "application/javascript; charset=utf-8");
        assert_eq!(body(&reply), "console.log(1);");

        assert_eq!(get(&state, "/files/js/app.js").status, 200);
        assert_eq!(get(&state, "/files/missing.css").status, 404);
    }

    #[test]
    fn test_unknown_routes() {
        let state = state();
        assert_eq!(get(&state, "/nope").status, 404);
        let reply = route(&Method::Put, "/__console", "", &state, &WebConfig::default());
        assert_eq!(reply.status, 405);
    }

    #[test]
    fn test_replace_source() {
        let state = state();
        let same = state.snapshot().source.clone();
        assert!(!state.replace_source(same));
        assert_eq!(state.snapshot().revision, 1);

        assert!(state.replace_source("// FILE: a.js\nx".to_string()));
        let snap = state.snapshot();
        assert_eq!(snap.revision, 2);
        assert_eq!(snap.store, ProjectStore::parse("// FILE: a.js\nx"));
        assert_eq!(snap.device, DeviceProfile::Compact);
    }

    #[test]
    fn test_preview_fallback_uses_raw_text() {
        let state = ServeState::new(
            "A signup form:\n// FILE: app.js\nconsole.log(1);",
            DeviceProfile::Compact,
            "demo",
        );
        let html = body(&get(&state, "/__preview"));
        assert!(html.contains(FallbackKind::Form.markup()));
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("styles.css")), "text/css; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("Component.tsx")), "text/plain; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("LICENSE")), "text/plain; charset=utf-8");
    }
}
