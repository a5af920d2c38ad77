use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;

use anyhow::Context as _;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::cli::ServeArgs;
use crate::config::ContentConfig;
use crate::docs::{DocPage, DocsService};
use crate::formats::{BlogPost, Document};

const UPSTREAM_ERROR_MESSAGE: &str = "Content is temporarily unavailable.";

#[derive(Debug, Clone)]
pub struct AppState {
    pub docs: DocsService,
    pub catalog: Arc<Catalog>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: &'static str,
}

/// Upstream content failures. The cause is logged; clients only see a fixed
/// message.
struct UpstreamError(anyhow::Error);

impl From<anyhow::Error> for UpstreamError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        tracing::error!(err = ?self.0, "content request failed");
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorBody {
                message: UPSTREAM_ERROR_MESSAGE,
            }),
        )
            .into_response()
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            message: "not found",
        }),
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
struct BlogQuery {
    #[serde(default)]
    featured: bool,
}

#[derive(Debug, Serialize)]
struct BlogPostPage {
    meta: Option<BlogPost>,
    doc: Document,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/api/docs", get(list_docs))
        .route("/api/docs/*slug", get(get_doc))
        .route("/api/toc", get(get_toc))
        .route("/api/paths", get(get_paths))
        .route("/api/blog", get(list_blog))
        .route("/api/blog/*slug", get(get_blog_post))
        .route("/api/news", get(list_news))
        .route("/api/news/:slug", get(get_news_item))
        .route("/api/doc-listings", get(list_doc_listings))
        .route("/api/doc-listings/*slug", get(get_doc_listing))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_docs(State(state): State<AppState>) -> Result<Response, UpstreamError> {
    let docs = state.docs.get_all_docs().await?;
    Ok(Json(docs).into_response())
}

async fn get_doc(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let page = state.docs.load_page(&slug).await;
    let status = match &page {
        DocPage::Ready { .. } => StatusCode::OK,
        DocPage::NotFound { .. } => StatusCode::NOT_FOUND,
        DocPage::Error { .. } => StatusCode::BAD_GATEWAY,
    };
    (status, Json(page)).into_response()
}

async fn get_toc(State(state): State<AppState>) -> Result<Response, UpstreamError> {
    let toc = state.docs.table_of_contents().await?;
    Ok(Json(toc).into_response())
}

async fn get_paths(State(state): State<AppState>) -> Result<Response, UpstreamError> {
    let paths = state.docs.static_doc_paths().await?;
    Ok(Json(paths).into_response())
}

/// `?featured=true` narrows the listing to featured posts.
async fn list_blog(State(state): State<AppState>, Query(query): Query<BlogQuery>) -> Response {
    if query.featured {
        let featured: Vec<&BlogPost> = state.catalog.featured_blog_posts().collect();
        return Json(featured).into_response();
    }
    Json(state.catalog.blog_posts()).into_response()
}

async fn get_blog_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, UpstreamError> {
    let Some(doc) = state.docs.get_blog_post_by_slug(&slug).await? else {
        return Ok(not_found());
    };
    let meta = state.catalog.blog_post(&doc.slug).cloned();
    Ok(Json(BlogPostPage { meta, doc }).into_response())
}

async fn list_news(State(state): State<AppState>) -> Response {
    Json(state.catalog.news_items()).into_response()
}

async fn get_news_item(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.catalog.news_item(&slug) {
        Some(item) => Json(item).into_response(),
        None => not_found(),
    }
}

async fn list_doc_listings(State(state): State<AppState>) -> Response {
    Json(state.catalog.doc_listings()).into_response()
}

async fn get_doc_listing(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.catalog.doc_listing(&slug) {
        Some(listing) => Json(listing).into_response(),
        None => not_found(),
    }
}

pub async fn serve(config: &ContentConfig, args: ServeArgs) -> anyhow::Result<()> {
    let catalog = match args.catalog.as_deref() {
        Some(path) => Catalog::load(FsPath::new(path))?,
        None => Catalog::empty(),
    };
    let state = AppState {
        docs: DocsService::new(config.build_source().context("build content source")?),
        catalog: Arc::new(catalog),
    };

    let addr: SocketAddr = args
        .addr
        .parse()
        .with_context(|| format!("parse --addr: {}", args.addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {addr}: {err}"))?;
    tracing::info!(addr = %addr, origin = ?config.origin, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve http")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(?err, "install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
