#![allow(dead_code)]

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tuneful::config::Config;
use tuneful::db::{self, files, songs};
use tuneful::routes;

pub const BOUNDARY: &str = "tuneful-test-boundary";

pub struct TestContext {
    pub pool: SqlitePool,
    pub config: Config,
    _upload_dir: TempDir,
}

/// Fresh in-memory database and a private upload directory.
pub async fn setup() -> TestContext {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    db::init_schema(&pool).await.expect("schema");

    let upload_dir = TempDir::new().expect("upload dir");

    TestContext {
        pool,
        config: Config {
            database_url: "sqlite::memory:".to_string(),
            upload_path: upload_dir.path().to_path_buf(),
            bind_address: "127.0.0.1:0".to_string(),
            max_upload_bytes: 1024,
        },
        _upload_dir: upload_dir,
    }
}

pub fn app(
    ctx: &TestContext,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ctx.pool.clone()))
        .app_data(web::Data::new(ctx.config.clone()))
        .configure(routes::configure)
}

/// Inserts a file and a song that references it; returns `(file_id, song_id)`.
pub async fn seed_song(pool: &SqlitePool, name: &str) -> (i64, i64) {
    let mut conn = pool.acquire().await.unwrap();
    let file = files::insert(&mut conn, name).await.unwrap();
    let song_id = songs::insert(&mut conn, file.id).await.unwrap();
    (file.id, song_id)
}

pub async fn seed_file(pool: &SqlitePool, name: &str) -> i64 {
    let mut conn = pool.acquire().await.unwrap();
    files::insert(&mut conn, name).await.unwrap().id
}

pub async fn song_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn multipart_body(field: &str, filename: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
