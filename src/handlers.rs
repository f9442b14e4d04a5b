use std::path::Path;
use std::time::Instant;

use actix_multipart::Multipart;
use actix_web::{http::StatusCode, web, Error, HttpResponse, Result};
use futures_util::StreamExt;
use image::ImageFormat;
use log::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::PredictError;
use crate::models::{ErrorResponse, HealthResponse, PredictionResponse, WarningResponse};
use crate::pipeline::{self, Prediction};
use crate::views::{self, Banner, Page, NO_IMAGE_WARNING};

/// Upload extensions the recognition form accepts.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(
            web::resource("/recognition")
                .route(web::get().to(recognition))
                .route(web::post().to(recognition_submit)),
        )
        .service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/assets/sidebar").route(web::get().to(sidebar_image)))
        .service(web::resource("/health").route(web::get().to(health)));
}

pub fn has_supported_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

enum Upload {
    Missing,
    TooLarge { filename: String },
    File { filename: String, bytes: Vec<u8> },
}

enum Outcome {
    NoImage,
    TooLarge(String),
    Unsupported(String),
    Predicted(Prediction),
    Failed(PredictError),
}

/// Pull the first file part out of the form. A part with an empty filename
/// is what browsers send when nothing was chosen. Reading stops as soon as
/// the part grows past `limit` bytes.
async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Upload, Error> {
    while let Some(item) = payload.next().await {
        let mut field = item?;
        let filename = match field.content_disposition().get_filename() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > limit {
                return Ok(Upload::TooLarge { filename });
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok(Upload::File { filename, bytes });
    }
    Ok(Upload::Missing)
}

async fn run_upload(
    config: &AppConfig,
    payload: Multipart,
    request_id: Uuid,
) -> Result<Outcome, Error> {
    let (filename, bytes) = match read_upload(payload, config.max_upload_bytes).await? {
        Upload::Missing => {
            warn!("[{}] Predict requested without an image", request_id);
            return Ok(Outcome::NoImage);
        }
        Upload::TooLarge { filename } => {
            warn!(
                "[{}] Rejected upload {:?}: larger than {} bytes",
                request_id, filename, config.max_upload_bytes
            );
            return Ok(Outcome::TooLarge(filename));
        }
        Upload::File { filename, bytes } => (filename, bytes),
    };

    if !has_supported_extension(&filename) {
        warn!("[{}] Rejected upload {:?}: unsupported extension", request_id, filename);
        return Ok(Outcome::Unsupported(filename));
    }

    info!("[{}] Received {} ({} bytes)", request_id, filename, bytes.len());

    let model_path = config.model_path.clone();
    let started = Instant::now();
    let result = web::block(move || pipeline::predict(&bytes, &model_path)).await?;

    match result {
        Ok(prediction) => {
            info!(
                "[{}] {} in {:.1} ms",
                request_id,
                prediction,
                started.elapsed().as_secs_f64() * 1000.0
            );
            Ok(Outcome::Predicted(prediction))
        }
        Err(e) => {
            if e.is_client_error() {
                warn!("[{}] {}", request_id, e);
            } else {
                error!("[{}] {}", request_id, e);
            }
            Ok(Outcome::Failed(e))
        }
    }
}

fn error_status(e: &PredictError) -> StatusCode {
    if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn unsupported_message(filename: &str) -> String {
    format!(
        "Unsupported file {:?}: choose a {} image",
        filename,
        SUPPORTED_EXTENSIONS.join("/")
    )
}

fn too_large_message(filename: &str, limit: usize) -> String {
    format!("File {:?} is larger than the {} byte upload limit", filename, limit)
}

/// JSON prediction endpoint.
pub async fn predict(
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    let request_id = Uuid::new_v4();

    let response = match run_upload(&config, payload, request_id).await? {
        Outcome::NoImage => HttpResponse::BadRequest().json(WarningResponse {
            warning: NO_IMAGE_WARNING.to_string(),
        }),
        Outcome::TooLarge(filename) => HttpResponse::PayloadTooLarge().json(ErrorResponse {
            request_id,
            error: too_large_message(&filename, config.max_upload_bytes),
        }),
        Outcome::Unsupported(filename) => {
            HttpResponse::UnsupportedMediaType().json(ErrorResponse {
                request_id,
                error: unsupported_message(&filename),
            })
        }
        Outcome::Predicted(prediction) => {
            HttpResponse::Ok().json(PredictionResponse::new(request_id, &prediction))
        }
        Outcome::Failed(e) => HttpResponse::build(error_status(&e)).json(ErrorResponse {
            request_id,
            error: e.to_string(),
        }),
    };

    Ok(response)
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub async fn home(config: web::Data<AppConfig>) -> HttpResponse {
    html(
        StatusCode::OK,
        views::render_page(&config.view, Page::Home, None),
    )
}

pub async fn recognition(config: web::Data<AppConfig>) -> HttpResponse {
    html(
        StatusCode::OK,
        views::render_page(&config.view, Page::DiseaseRecognition, None),
    )
}

/// Form submission from the recognition page; re-renders it with the outcome.
pub async fn recognition_submit(
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    let request_id = Uuid::new_v4();

    let (status, banner) = match run_upload(&config, payload, request_id).await? {
        Outcome::NoImage => (StatusCode::OK, Banner::Warning(NO_IMAGE_WARNING.to_string())),
        Outcome::TooLarge(filename) => (
            StatusCode::PAYLOAD_TOO_LARGE,
            Banner::Error(too_large_message(&filename, config.max_upload_bytes)),
        ),
        Outcome::Unsupported(filename) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Banner::Error(unsupported_message(&filename)),
        ),
        Outcome::Predicted(prediction) => (StatusCode::OK, Banner::Success(prediction.to_string())),
        Outcome::Failed(e) => (error_status(&e), Banner::Error(e.to_string())),
    };

    Ok(html(
        status,
        views::render_page(&config.view, Page::DiseaseRecognition, Some(&banner)),
    ))
}

/// Decorative sidebar image, read from disk on each request.
pub async fn sidebar_image(config: web::Data<AppConfig>) -> Result<HttpResponse, Error> {
    let path = config.sidebar_image.clone();
    let read_path = path.clone();

    match web::block(move || std::fs::read(&read_path)).await? {
        Ok(bytes) => {
            let content_type = match image::guess_format(&bytes) {
                Ok(ImageFormat::Png) => "image/png",
                Ok(ImageFormat::Jpeg) => "image/jpeg",
                _ => "application/octet-stream",
            };
            Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
        }
        Err(e) => {
            error!("Failed to read sidebar image {}: {}", path.display(), e);
            Ok(HttpResponse::NotFound().finish())
        }
    }
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_supported_extension("leaf.jpg"));
        assert!(has_supported_extension("leaf.JPEG"));
        assert!(has_supported_extension("scans/leaf.Png"));
        assert!(!has_supported_extension("leaf.gif"));
        assert!(!has_supported_extension("leaf"));
        assert!(!has_supported_extension("jpg"));
    }
}
