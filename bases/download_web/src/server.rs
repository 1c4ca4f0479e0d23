// bases/download_web/src/server.rs
use crate::config::Config;
use crate::deliveries::{Deliveries, PendingFile};
use crate::error::AppError;
use crate::events::{ChannelProgress, DoneEvent, UiEvent};
use crate::forms::{DownloadForm, FormError, UrlForm};
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Form, Router,
};
use futures::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use video_downloader::{
    Delivery, DownloadError, DownloadRequest, DownloadResult, HistoryStore, PlatformTarget,
    PreviewInfo, TracingProgress, VideoDownloader, VideoReference,
};

const APP_JS: &str = include_str!("../static/app.js");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    downloader: Arc<VideoDownloader>,
    history: HistoryStore,
    deliveries: Arc<Deliveries>,
    config: Config,
}

impl AppState {
    pub fn new(config: Config, downloader: VideoDownloader) -> Self {
        Self {
            downloader: Arc::new(downloader),
            history: HistoryStore::new(&config.download_dir),
            deliveries: Arc::new(Deliveries::new()),
            config,
        }
    }
}

/// Main page: URL form, optional download panel, history
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    url: String,
    notice: Option<Notice>,
    panel: Option<DownloadPanel>,
    histories: Vec<HistoryView>,
    keeps_files: bool,
}

struct Notice {
    /// CSS class: success, warning or error
    kind: &'static str,
    message: String,
}

impl Notice {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: "warning",
            message: message.into(),
        }
    }

    fn from_result(result: &DownloadResult) -> Self {
        let kind = match result {
            DownloadResult::Success(_) => "success",
            DownloadResult::AlreadyExists { .. } => "warning",
            DownloadResult::Failure { .. } => "error",
        };
        Self {
            kind,
            message: result.to_string(),
        }
    }
}

/// Shown once a URL passed classification
struct DownloadPanel {
    url: String,
    platform: &'static str,
    preview: Option<PreviewInfo>,
}

struct HistoryView {
    name: &'static str,
    folder: &'static str,
    entries: Vec<HistoryItem>,
}

struct HistoryItem {
    filename: String,
    href: String,
    file_url: String,
}

#[derive(Default)]
struct Page {
    url: String,
    notice: Option<Notice>,
    panel: Option<DownloadPanel>,
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/preview", post(preview))
        .route("/download", post(download))
        .route("/download/events", get(download_events))
        .route("/deliveries/:id", get(claim_delivery))
        .route("/static/app.js", get(app_js));

    if state.config.keeps_files() {
        app = app.nest_service("/files", ServeDir::new(&state.config.download_dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Run the HTTP server
pub async fn run(state: AppState) -> color_eyre::Result<()> {
    let port = state.config.port;
    let app = router(state.clone());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Downloader listening on http://localhost:{}", port);
    if state.config.keeps_files() {
        info!("   Saving into {}", state.config.download_dir.display());
    } else {
        info!("   Memory delivery - nothing is kept on the server");
    }

    axum::serve(listener, app).await?;

    Ok(())
}

async fn render(state: &AppState, page: Page) -> Result<Html<String>, AppError> {
    let mut histories = Vec::new();
    if state.config.keeps_files() {
        for platform in PlatformTarget::ALL {
            let entries = state.history.list(platform).await?;
            histories.push(HistoryView {
                name: platform.display_name(),
                folder: platform.folder_name(),
                entries: entries
                    .into_iter()
                    .map(|e| HistoryItem {
                        href: format!(
                            "/files/{}/{}",
                            platform.folder_name(),
                            urlencoding::encode(&e.filename)
                        ),
                        file_url: e.file_url().unwrap_or_default(),
                        filename: e.filename,
                    })
                    .collect(),
            });
        }
    }

    let template = IndexTemplate {
        url: page.url,
        notice: page.notice,
        panel: page.panel,
        histories,
        keeps_files: state.config.keeps_files(),
    };
    Ok(Html(template.render()?))
}

/// Re-render the form with a warning for input that was turned away
async fn rejected(state: &AppState, url: String, message: String) -> Result<Response, AppError> {
    let page = Page {
        url,
        notice: Some(Notice::warning(message)),
        panel: None,
    };
    Ok((StatusCode::BAD_REQUEST, render(state, page).await?).into_response())
}

/// Handler for the main page
async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, Page::default()).await
}

/// Classify the URL and show a preview with the download controls
async fn preview(
    State(state): State<AppState>,
    Form(form): Form<UrlForm>,
) -> Result<Response, AppError> {
    let url = form.url.trim().to_string();

    let reference = match VideoReference::new(url.as_str()) {
        Ok(reference) => reference,
        Err(e) => {
            let message = FormError::Rejected(DownloadError::from_classification(&url, e)).message();
            return rejected(&state, url, message).await;
        }
    };

    let preview = state.downloader.fetch_preview(reference.url()).await;
    let panel = DownloadPanel {
        url: url.clone(),
        platform: reference.platform().display_name(),
        preview,
    };
    let page = Page {
        url,
        notice: None,
        panel: Some(panel),
    };
    Ok(render(&state, page).await?.into_response())
}

/// Download without JavaScript: blocks until done, then renders the result
/// or hands over the file
async fn download(
    State(state): State<AppState>,
    Form(form): Form<DownloadForm>,
) -> Result<Response, AppError> {
    let request = match form.to_request() {
        Ok(request) => request,
        Err(e) => return rejected(&state, form.url, e.message()).await,
    };

    let result = match state.downloader.download(&request, &TracingProgress).await {
        DownloadResult::Success(Delivery::Buffer { filename, bytes }) => {
            return Ok(PendingFile { filename, bytes }.into_response());
        }
        other => other,
    };

    let url = if result.clear_input() { String::new() } else { form.url };
    let page = Page {
        url,
        notice: Some(Notice::from_result(&result)),
        panel: None,
    };
    Ok(render(&state, page).await?.into_response())
}

/// Run one download and relay its progress as Server-Sent Events
async fn download_events(
    State(state): State<AppState>,
    Query(form): Query<DownloadForm>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, mut rx) = unbounded_channel();

    match form.to_request() {
        Ok(request) => {
            tokio::spawn(perform(state, request, tx));
        }
        Err(e) => {
            let _ = tx.send(UiEvent::Done(DoneEvent::rejected(e.message())));
        }
    }

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            let last = event.is_terminal();
            yield Ok::<Event, Infallible>(event.into_sse());
            if last {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Download `request`, sending progress and the final summary on `tx`
async fn perform(state: AppState, request: DownloadRequest, tx: UnboundedSender<UiEvent>) {
    let progress = ChannelProgress::new(tx.clone());
    let result = state.downloader.download(&request, &progress).await;

    let platform = request.reference().platform().folder_name();
    let mut done = DoneEvent::from_result(&result, platform, None);
    if let DownloadResult::Success(Delivery::Buffer { filename, bytes }) = result {
        let id = state.deliveries.register(PendingFile { filename, bytes }).await;
        done.delivery_url = Some(format!("/deliveries/{}", id));
    }
    let _ = tx.send(UiEvent::Done(done));
}

async fn claim_delivery(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<PendingFile, AppError> {
    state.deliveries.claim(id).await.ok_or(AppError::UnknownDelivery(id))
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], APP_JS)
}
