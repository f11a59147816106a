use crate::db::{files, songs};
use crate::errors::AppError;
use crate::handlers::file::FileResponse;
use crate::models::file::File;
use crate::models::song::Song;
use crate::utils::validation::{validate, ValidationError, SONG_SCHEMA};
use actix_web::http::header::LOCATION;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Serialize)]
pub struct SongResponse {
    id: i64,
    file: FileResponse,
}

impl From<&Song> for SongResponse {
    fn from(song: &Song) -> Self {
        SongResponse {
            id: song.id,
            file: FileResponse::from(&song.file),
        }
    }
}

fn song_not_found(id: i64) -> AppError {
    debug!("Song {} not found", id);
    AppError::NotFound(format!("Could not find song with id {}", id))
}

fn map_validation_error(err: ValidationError) -> AppError {
    debug!("Rejected song body: {}", err);
    AppError::ValidationError(err.message)
}

fn parse_body(body: &web::Bytes) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|err| AppError::BadRequest(format!("Invalid JSON body: {}", err)))
}

/// Whole-valued numbers address a file; anything else cannot match one.
fn as_file_id(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64)
            .map(|n| n as i64)
    })
}

async fn find_file(conn: &mut SqliteConnection, id: &Value) -> Result<File, AppError> {
    let missing = || {
        debug!("File {} not found", id);
        AppError::NotFound(format!("Could not find file with id {}", id))
    };
    let file_id = as_file_id(id).ok_or_else(missing)?;
    files::find_by_id(conn, file_id).await?.ok_or_else(missing)
}

fn song_location(req: &HttpRequest, id: i64) -> Result<String, AppError> {
    req.url_for("song_get", [id.to_string()])
        .map(|url| url.to_string())
        .map_err(|err| AppError::InternalServerError(err.to_string()))
}

pub async fn get_songs(pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let songs = songs::list(&mut *conn).await?;

    let body: Vec<SongResponse> = songs.iter().map(SongResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_song(pool: web::Data<SqlitePool>, id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let mut conn = pool.acquire().await?;
    let song = songs::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| song_not_found(id))?;

    Ok(HttpResponse::Ok().json(SongResponse::from(&song)))
}

pub async fn create_song(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let data = parse_body(&body)?;
    validate(&data, &SONG_SCHEMA).map_err(map_validation_error)?;

    let mut tx = pool.begin().await?;
    let file = find_file(&mut *tx, &data["file"]["id"]).await?;
    let id = songs::insert(&mut *tx, file.id).await?;
    tx.commit().await?;

    let song = Song { id, file };
    info!("Created song {} for file {}", song.id, song.file.id);

    Ok(HttpResponse::Created()
        .insert_header((LOCATION, song_location(&req, id)?))
        .json(SongResponse::from(&song)))
}

pub async fn update_song(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    id: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let mut tx = pool.begin().await?;

    // Song existence is reported before anything about the body.
    songs::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| song_not_found(id))?;

    let data = parse_body(&body)?;
    validate(&data, &SONG_SCHEMA).map_err(map_validation_error)?;

    let file = find_file(&mut *tx, &data["file"]["id"]).await?;
    songs::update_file(&mut *tx, id, file.id).await?;
    tx.commit().await?;

    let song = Song { id, file };
    info!("Song {} now points at file {}", song.id, song.file.id);

    Ok(HttpResponse::Ok()
        .insert_header((LOCATION, song_location(&req, id)?))
        .json(SongResponse::from(&song)))
}

pub async fn delete_song(pool: web::Data<SqlitePool>, id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let mut tx = pool.begin().await?;

    songs::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| song_not_found(id))?;
    songs::delete(&mut *tx, id).await?;
    tx.commit().await?;

    info!("Deleted song {}", id);
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Successfully deleted song with id {}", id),
    })))
}
