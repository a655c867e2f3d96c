//! HTTP routes for the upload form
//!
//! `GET /` shows the form, `POST /` converts an uploaded file, and the
//! uploads/outputs directories are served as static files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use axum::Router;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::Html;
use axum::routing::get;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::io::AsyncWriteExt;
use tower_http::services::ServeDir;
use crate::config::WebConfig;
use crate::error::{RemoverError, Result};
use crate::processing::GuitarRemover;
use super::page::PageView;
use super::upload::{output_file_name, random_token, upload_file_name};

pub const FILE_FIELD: &str = "audio_file";
pub const NO_FILE_MESSAGE: &str = "No file provided.";

/// Characters escaped in a single URL path segment
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

struct AppState {
    remover: GuitarRemover,
}

pub fn router(remover: GuitarRemover) -> Router {
    let web = remover.config().web.clone();
    let body_limit = remover.config().max_upload_bytes();
    let state = Arc::new(AppState { remover });

    Router::new()
        .route("/", get(index).post(submit))
        .nest_service("/uploads", ServeDir::new(&web.upload_dir))
        .nest_service("/outputs", ServeDir::new(&web.output_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Create the uploads and outputs directories
pub fn prepare_dirs(web: &WebConfig) -> Result<()> {
    for dir in [&web.upload_dir, &web.output_dir] {
        std::fs::create_dir_all(dir)
            .map_err(|e| RemoverError::io(format!("Failed to create {}: {}", dir.display(), e)))?;
    }
    Ok(())
}

pub async fn serve(remover: GuitarRemover) -> Result<()> {
    let web = remover.config().web.clone();
    prepare_dirs(&web)?;

    let addr = format!("{}:{}", web.host, web.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RemoverError::web(format!("Failed to bind {}: {}", addr, e)))?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, router(remover))
        .await
        .map_err(|e| RemoverError::web(e.to_string()))
}

async fn index() -> Html<String> {
    Html(PageView::form().render())
}

async fn submit(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let view = match handle_submission(&state, multipart).await {
        Ok(view) => view,
        Err(e) => {
            log::error!("Conversion failed: {}", e);
            PageView::error(e.to_string())
        }
    };
    Html(view.render())
}

async fn handle_submission(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<PageView> {
    let Ok(mut multipart) = multipart else {
        return Ok(PageView::error(NO_FILE_MESSAGE));
    };
    let web = &state.remover.config().web;
    let Some((upload_name, upload_path)) = save_upload(&mut multipart, &web.upload_dir).await? else {
        return Ok(PageView::error(NO_FILE_MESSAGE));
    };

    let output_name = output_file_name(&upload_name, &web.output_suffix, &web.output_extension);
    let output_path = web.output_dir.join(&output_name);

    // Blocks one worker for the lifetime of both tools
    let remover = state.remover.clone();
    let request = remover.request(upload_path, output_path);
    tokio::task::spawn_blocking(move || remover.remove_guitar(&request))
        .await
        .map_err(|e| RemoverError::web(format!("Conversion task failed: {}", e)))??;

    Ok(PageView::result(
        static_url("uploads", &upload_name),
        static_url("outputs", &output_name),
    ))
}

fn static_url(mount: &str, name: &str) -> String {
    format!("/{}/{}", mount, utf8_percent_encode(name, PATH_SEGMENT_ENCODE_SET))
}

/// Stream the first `audio_file` part with a non-empty filename into `upload_dir`
async fn save_upload(multipart: &mut Multipart, upload_dir: &Path) -> Result<Option<(String, PathBuf)>> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| RemoverError::web(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let client_name = field.file_name().unwrap_or_default().to_string();
        if client_name.is_empty() {
            return Ok(None);
        }

        let upload_name = upload_file_name(&random_token(), &client_name);
        let upload_path = upload_dir.join(&upload_name);
        match write_field(&mut field, &upload_path).await {
            Ok(size) => log::info!("Saved upload {} ({} bytes)", upload_path.display(), size),
            Err(e) => {
                let _ = tokio::fs::remove_file(&upload_path).await;
                return Err(e);
            }
        }
        return Ok(Some((upload_name, upload_path)));
    }
    Ok(None)
}

async fn write_field(field: &mut Field<'_>, path: &Path) -> Result<u64> {
    let save_err = |e: std::io::Error| RemoverError::io(format!("Failed to save upload {}: {}", path.display(), e));
    let mut file = tokio::fs::File::create(path).await.map_err(save_err)?;
    let mut size = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(|e| RemoverError::web(e.to_string()))? {
        file.write_all(&chunk).await.map_err(save_err)?;
        size += chunk.len() as u64;
    }
    file.flush().await.map_err(save_err)?;
    Ok(size)
}
