use crate::errors::AppError;
use crate::handlers;
use crate::middleware::negotiation::{accept_json, negotiate_json};
use actix_web::middleware::from_fn;
use actix_web::web;

/// Routing table for the whole service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, req| AppError::NotFound(format!("Could not find {}: {}", req.path(), err)).into()),
    )
    .service(
        web::scope("/api")
            .service(
                web::scope("/songs")
                    .wrap(from_fn(negotiate_json))
                    .service(
                        web::resource("")
                            .route(web::get().to(handlers::song::get_songs))
                            .route(web::post().to(handlers::song::create_song)),
                    )
                    .service(
                        web::resource("/{id}")
                            .name("song_get")
                            .route(web::get().to(handlers::song::get_song))
                            .route(web::put().to(handlers::song::update_song))
                            .route(web::delete().to(handlers::song::delete_song)),
                    ),
            )
            .service(
                web::scope("/files")
                    .wrap(from_fn(accept_json))
                    .service(web::resource("").route(web::post().to(handlers::file::upload_file))),
            ),
    )
    .service(
        web::resource("/uploads/{filename}")
            .name("uploaded_file")
            .route(web::get().to(handlers::file::uploaded_file)),
    );
}
