use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::ingest;

#[derive(Debug, MultipartForm)]
pub struct UploadForm {
    #[multipart(rename = "excelFile")]
    pub excel_file: Option<TempFile>,
}

/// Stores the upload under its original client filename. Same-name uploads
/// overwrite each other.
fn persist_upload(file: &TempFile, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let name = file.file_name.as_deref().unwrap_or("upload.xlsx");
    let dest = dir.join(name);
    fs::copy(file.file.path(), &dest)?;
    Ok(dest)
}

/// Roster upload: one row per employee with identity, name and department
#[utoipa::path(
    post,
    path = "/upload/roster",
    request_body(content = String, description = "multipart form with an `excelFile` spreadsheet field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload processed; success is false when some writes failed", body = Object, example = json!({
            "success": true,
            "report": { "inserted": 10, "updated": 5, "failures": [] }
        })),
        (status = 400, description = "No file field present", body = Object, example = json!({
            "message": "No files were uploaded."
        })),
        (status = 500, description = "Store, connection or sheet failure")
    ),
    tag = "Upload"
)]
pub async fn upload_roster(
    config: web::Data<Config>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> actix_web::Result<impl Responder> {
    let Some(file) = form.excel_file else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No files were uploaded."
        })));
    };

    let saved = persist_upload(&file, Path::new(&config.upload_dir)).map_err(|e| {
        error!(error = %e, "failed to store uploaded roster file");
        actix_web::error::ErrorInternalServerError("Failed to store uploaded file")
    })?;
    info!(path = %saved.display(), "roster file uploaded");

    let client = db::connect(&config.mongodb_uri).await.map_err(|e| {
        error!(error = %e, "database connection failed");
        actix_web::error::ErrorInternalServerError("Database unavailable")
    })?;
    let coll = db::collection(&client, &config);

    let outcome = ingest::roster::run(&coll, &saved, config.max_concurrent_writes).await;
    db::release(client).await;

    match outcome {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": report.success(),
            "report": report
        }))),
        Err(e) => {
            error!(error = %e, "roster ingest failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Attendance upload: per-identity blocks of date / check-in / check-out rows
#[utoipa::path(
    post,
    path = "/upload/attendance",
    request_body(content = String, description = "multipart form with an `excelFile` spreadsheet field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload processed; success is false when some writes failed", body = Object, example = json!({
            "success": true,
            "report": { "processed": 12, "cleared": 3, "failures": [] }
        })),
        (status = 400, description = "No file field present", body = Object, example = json!({
            "message": "No files were uploaded."
        })),
        (status = 500, description = "Store, connection or sheet failure")
    ),
    tag = "Upload"
)]
pub async fn upload_attendance(
    config: web::Data<Config>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> actix_web::Result<impl Responder> {
    let Some(file) = form.excel_file else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No files were uploaded."
        })));
    };

    let saved = persist_upload(&file, Path::new(&config.upload_dir)).map_err(|e| {
        error!(error = %e, "failed to store uploaded attendance file");
        actix_web::error::ErrorInternalServerError("Failed to store uploaded file")
    })?;
    info!(path = %saved.display(), "attendance file uploaded");

    let client = db::connect(&config.mongodb_uri).await.map_err(|e| {
        error!(error = %e, "database connection failed");
        actix_web::error::ErrorInternalServerError("Database unavailable")
    })?;
    let coll = db::collection(&client, &config);

    // the just-stored file is passed explicitly; the newest-in-folder scan
    // only kicks in for runs triggered without one
    let outcome = ingest::attendance::run(
        &coll,
        Path::new(&config.upload_dir),
        Some(saved.as_path()),
        config.max_concurrent_writes,
    )
    .await;
    db::release(client).await;

    match outcome {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": report.success(),
            "report": report
        }))),
        Err(e) => {
            error!(error = %e, "attendance ingest failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
