//! Content negotiation gate.
//!
//! Runs before routing reaches a handler, so a rejected request never
//! touches the database or its path parameters.

use crate::errors::AppError;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::{Error, ResponseError};
use log::debug;

const JSON: &str = "application/json";

/// Requires `Accept` to allow JSON, and `Content-Type: application/json` on
/// POST and PUT.
pub async fn negotiate_json<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    if let Err(err) = check(&req, true) {
        return Ok(reject(req, err));
    }
    Ok(next.call(req).await?.map_into_left_body())
}

/// Requires `Accept` to allow JSON. For endpoints whose body is not JSON.
pub async fn accept_json<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    if let Err(err) = check(&req, false) {
        return Ok(reject(req, err));
    }
    Ok(next.call(req).await?.map_into_left_body())
}

fn check(req: &ServiceRequest, require_body: bool) -> Result<(), AppError> {
    let headers = req.headers();
    if !accepts_json(headers) {
        debug!("{} {} rejected: Accept does not allow JSON", req.method(), req.path());
        return Err(AppError::NotAcceptable);
    }
    let has_body = *req.method() == Method::POST || *req.method() == Method::PUT;
    if require_body && has_body && !sends_json(headers) {
        debug!("{} {} rejected: body is not JSON", req.method(), req.path());
        return Err(AppError::UnsupportedMediaType);
    }
    Ok(())
}

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response()).map_into_right_body()
}

/// True when some `Accept` media range covers JSON. A request without an
/// `Accept` header has not agreed to JSON and is refused.
pub fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|range| {
            let mut parts = range.split(';');
            let media = parts.next().unwrap_or("").trim();
            let matches = media.eq_ignore_ascii_case(JSON)
                || media.eq_ignore_ascii_case("application/*")
                || media == "*/*";
            matches && !refused(parts)
        })
}

fn refused<'a>(params: impl Iterator<Item = &'a str>) -> bool {
    params
        .filter_map(|param| param.trim().strip_prefix("q="))
        .any(|q| q.trim().parse::<f32>().map(|q| q <= 0.0).unwrap_or(false))
}

pub fn sends_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(JSON))
        .unwrap_or(false)
}
