use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use url::Url;

use crate::backend::build_client;
use crate::config::AppConfig;
use crate::dom::shell::BUNDLE_MODULE;
use crate::dom::{ATTR_ESCAPE_HTML, PageShell};
use crate::error::{Result, WidgetError};
use crate::i18n::{FsResourceSource, LanguageTag, ResourceBundle, load_bundle};
use crate::widget::renderer::update_ui;

/// State shared across all handlers.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: Arc<AppConfig>,
    /// Static directory, read for the first paint.
    pub resources: FsResourceSource,
    /// Client used to forward `/ask`.
    pub http: reqwest::Client,
    pub ask_upstream: Option<Url>,
}

impl ServerState {
    /// Whether the browser bundle has been built into the static directory.
    pub async fn bundle_available(&self) -> bool {
        tokio::fs::try_exists(self.resources.root().join(BUNDLE_MODULE))
            .await
            .unwrap_or(false)
    }

    pub fn new(config: Arc<AppConfig>) -> Result<Self> {
        let ask_upstream = config.backend.upstream_url()?;
        if let Some(url) = &ask_upstream
            && !matches!(url.scheme(), "http" | "https")
        {
            return Err(WidgetError::Config(format!(
                "backend.ask_upstream must be an http(s) URL, got {url}"
            )));
        }
        let http = build_client(config.backend.timeout())?;
        Ok(Self {
            resources: FsResourceSource::new(&config.server.static_dir),
            http,
            ask_upstream,
            config,
        })
    }
}

/// Build the application router.
pub fn router(state: ServerState) -> Router {
    let static_dir = ServeDir::new(state.resources.root());
    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(healthz))
        .route("/ask", post(ask_proxy))
        .nest_service("/static", static_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let state = ServerState::new(Arc::clone(&config))?;

    match &state.ask_upstream {
        Some(upstream) => info!(
            name: "ask.upstream.configured",
            upstream = %upstream,
            "Forwarding /ask"
        ),
        None => tracing::warn!("No ask upstream configured; POST /ask will answer 503"),
    }

    if !state.bundle_available().await {
        tracing::warn!(
            bundle = %state.resources.root().join(BUNDLE_MODULE).display(),
            "Browser bundle missing; pages will be served without it. Run tools/build-wasm.sh"
        );
    }

    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        static_dir = %config.server.static_dir,
        default_language = %config.widget.default_language,
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Render the page for `tag`, localized with `bundle` when it is available.
///
/// The browser bundle loader is included only when `with_bundle` is set.
pub fn render_index(
    config: &AppConfig,
    tag: &LanguageTag,
    bundle: Option<&ResourceBundle>,
    with_bundle: bool,
) -> String {
    let shell = PageShell {
        title: config.widget.title.clone(),
        default_language: tag.clone(),
        languages: config.widget.languages.clone(),
        with_bundle,
    };
    let doc = shell.build();
    doc.set_attribute(
        doc.root(),
        ATTR_ESCAPE_HTML,
        if config.widget.escape_html { "true" } else { "false" },
    );
    if let Some(bundle) = bundle {
        update_ui(&doc, tag, bundle);
    }
    doc.render()
}

/// GET / - First paint in the default language.
async fn index_handler(State(state): State<ServerState>) -> Html<String> {
    let tag = state.config.widget.default_language.clone();
    let bundle = match load_bundle(&state.resources, &tag).await {
        Ok(bundle) => Some(bundle),
        Err(e) => {
            // The browser bundle retries the load on its own.
            tracing::error!(lang = %tag, error = %e, "Failed to load default language");
            None
        }
    };
    let with_bundle = state.bundle_available().await;
    Html(render_index(&state.config, &tag, bundle.as_ref(), with_bundle))
}

async fn healthz() -> &'static str {
    "ok"
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// POST /ask - Forward the question to the configured backend.
async fn ask_proxy(State(state): State<ServerState>, body: Bytes) -> Response {
    let Some(upstream) = state.ask_upstream.clone() else {
        return json_error(StatusCode::SERVICE_UNAVAILABLE, "no answering backend configured");
    };

    let request_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        request_id = %request_id,
        body_length = body.len(),
        "Forwarding question"
    );

    let result = async {
        let resp = state
            .http
            .post(upstream.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        Ok::<_, WidgetError>((status, bytes))
    }
    .await;

    match result {
        Ok((status, bytes)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            if !status.is_success() {
                tracing::warn!(
                    request_id = %request_id,
                    status = %status,
                    "Upstream returned error status"
                );
            }
            (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream request failed");
            json_error(StatusCode::BAD_GATEWAY, "answering backend unreachable")
        }
    }
}
