use actix_multipart::{Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use serde::Serialize;
use sqlx::SqlitePool;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use crate::config::Config;
use crate::db::files;
use crate::errors::AppError;
use crate::models::file::File;
use crate::utils::filename::{disambiguate, is_safe, stored_filename};

/// Multipart field that carries the uploaded bytes.
const FILE_FIELD: &str = "file";

/// Bytes read from the start of a file to guess its content type.
const SNIFF_BYTES: u64 = 8192;

const MAX_NAME_ATTEMPTS: usize = 8;

#[derive(Serialize)]
pub struct FileResponse {
    id: i64,
    name: String,
    path: String,
}

impl From<&File> for FileResponse {
    fn from(file: &File) -> Self {
        FileResponse {
            id: file.id,
            name: file.name.clone(),
            path: file.path(),
        }
    }
}

struct Upload {
    filename: Option<String>,
    data: web::BytesMut,
}

fn map_multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", err))
}

async fn read_file_field(payload: &mut Multipart, limit: usize) -> Result<Option<Upload>, AppError> {
    while let Some(mut field) = payload.try_next().await.map_err(map_multipart_error)? {
        let disposition = field.content_disposition();
        if disposition.get_name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = disposition.get_filename().map(str::to_owned);

        let mut data = web::BytesMut::new();
        while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
            if data.len() + chunk.len() > limit {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds the {} byte upload limit",
                    limit
                )));
            }
            data.extend_from_slice(&chunk);
        }
        return Ok(Some(Upload { filename, data }));
    }
    Ok(None)
}

/// Sniffs the content type from the leading bytes of a file.
fn content_type(head: &[u8]) -> String {
    match infer::get(head) {
        Some(kind) => kind.mime_type().to_string(),
        None if looks_like_text(head) => "text/plain; charset=utf-8".to_string(),
        None => "application/octet-stream".to_string(),
    }
}

/// Valid UTF-8, allowing a character cut off at the end of the sample.
fn looks_like_text(head: &[u8]) -> bool {
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}

/// Creates the upload target without touching existing files. A taken name
/// gets a uuid suffix.
async fn create_unique(dir: &Path, name: String) -> Result<(String, PathBuf, fs::File), AppError> {
    let mut candidate = name.clone();
    for _ in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(&candidate);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(handle) => return Ok((candidate, path, handle)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                debug!("Upload name {} is taken", candidate);
                candidate = disambiguate(&name);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(AppError::InternalServerError(format!(
        "Could not find a free upload name for {}",
        name
    )))
}

async fn store(pool: &SqlitePool, mut handle: fs::File, name: &str, data: &[u8]) -> Result<File, AppError> {
    handle.write_all(data).await?;
    handle.flush().await?;

    let mut tx = pool.begin().await?;
    let file = files::insert(&mut *tx, name).await?;
    tx.commit().await?;
    Ok(file)
}

pub async fn upload_file(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let upload = read_file_field(&mut payload, config.max_upload_bytes)
        .await?
        .ok_or_else(|| AppError::ValidationError("Could not find file data".to_string()))?;

    let wanted = stored_filename(upload.filename.as_deref());
    let (name, path, handle) = create_unique(&config.upload_path, wanted).await?;

    let file = match store(&pool, handle, &name, &upload.data).await {
        Ok(file) => file,
        Err(err) => {
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!("Could not remove {} after failed upload: {}", path.display(), cleanup);
            }
            return Err(err);
        }
    };

    info!(
        "Stored upload {} as file {} ({}, {} bytes)",
        file.name,
        file.id,
        content_type(&upload.data),
        upload.data.len()
    );
    Ok(HttpResponse::Created().json(FileResponse::from(&file)))
}

pub async fn uploaded_file(
    config: web::Data<Config>,
    filename: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = filename.into_inner();
    let missing = || AppError::NotFound(format!("Could not find upload {}", name));

    if !is_safe(&name) {
        debug!("Refusing to serve unsafe upload name {:?}", name);
        return Err(missing());
    }

    let mut handle = match fs::File::open(config.upload_path.join(&name)).await {
        Ok(handle) => handle,
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(missing()),
        Err(err) => return Err(err.into()),
    };

    let mut head = Vec::with_capacity(SNIFF_BYTES as usize);
    (&mut handle).take(SNIFF_BYTES).read_to_end(&mut head).await?;
    handle.seek(SeekFrom::Start(0)).await?;

    Ok(HttpResponse::Ok()
        .content_type(content_type(&head))
        .streaming(ReaderStream::new(handle)))
}
