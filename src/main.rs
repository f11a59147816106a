use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::io;
use tuneful::config::Config;
use tuneful::{db, routes};

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(startup_error)?;

    tokio::fs::create_dir_all(&config.upload_path).await?;

    // Initialize the database pool
    let pool = db::create_pool(&config).await.map_err(startup_error)?;
    db::init_schema(&pool).await.map_err(startup_error)?;

    info!(
        "Starting server at {} (uploads in {})",
        config.bind_address,
        config.upload_path.display()
    );

    let bind_address = config.bind_address.clone();
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .configure(routes::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
