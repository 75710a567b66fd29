use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::{ErrorBody, ErrorCode};
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::{BoxBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::{
        StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap},
    },
    web::Data,
};
use tracing::debug;

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    debug!(path = %req.path(), reason = message, "Access denied");
    let resp = HttpResponse::Unauthorized().json(ErrorBody::new(message, ErrorCode::Unauthorized));
    req.into_response(resp.map_into_boxed_body())
}

/// Requires a bearer access token on every request when the gate is
/// configured; passes everything through otherwise.
pub async fn access_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let Some(access) = config.access.clone() else {
        return next.call(req).await;
    };

    let header_value = match req.headers().get("Authorization") {
        Some(h) => match h.to_str() {
            Ok(v) => v,
            Err(_) => return Ok(unauthorized(req, "Invalid Authorization header encoding")),
        },
        None => return Ok(unauthorized(req, "Missing Authorization header")),
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => {
            return Ok(unauthorized(
                req,
                "Authorization header must start with Bearer",
            ));
        }
    };

    let claims = match verify_token(token, &access.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Token verification failed");
            return Ok(unauthorized(req, "Invalid or expired token"));
        }
    };

    req.extensions_mut().insert(claims);

    next.call(req).await
}

/// Gives the limiter's 429 the common error body. Its retry headers are kept.
pub async fn rate_limit_body(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let http_req = req.request().clone();

    let limiter_headers: HeaderMap = match next.call(req).await {
        Ok(res) if res.status() != StatusCode::TOO_MANY_REQUESTS => {
            return Ok(res.map_into_boxed_body());
        }
        Ok(res) => res.headers().clone(),
        Err(e) if e.as_response_error().status_code() == StatusCode::TOO_MANY_REQUESTS => {
            e.error_response().headers().clone()
        }
        Err(e) => return Err(e),
    };

    debug!(path = %http_req.path(), "Access attempt rate limited");

    let mut resp = HttpResponse::TooManyRequests().json(ErrorBody::new(
        "Too many access attempts, try again later",
        ErrorCode::RateLimited,
    ));
    for (name, value) in limiter_headers.iter() {
        if *name != CONTENT_TYPE && *name != CONTENT_LENGTH {
            resp.headers_mut().append(name.clone(), value.clone());
        }
    }

    Ok(ServiceResponse::new(http_req, resp))
}
