use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    error::{AppError, ErrorBody, ErrorCode},
    models::{AccessReqDto, AccessResponse},
};
use actix_web::{HttpResponse, web};
use tracing::{debug, error, info, instrument};

/// Exchange the access passcode for a bearer token
#[utoipa::path(
    post,
    path = "/api/access",
    request_body = AccessReqDto,
    responses(
        (status = 200, description = "Access granted", body = AccessResponse),
        (status = 400, description = "Passcode missing", body = ErrorBody),
        (status = 401, description = "Wrong passcode", body = ErrorBody),
        (status = 404, description = "Access gate is not enabled", body = ErrorBody),
        (status = 429, description = "Too many attempts", body = ErrorBody)
    ),
    tag = "Access"
)]
#[instrument(name = "access_unlock", skip(payload, config))]
pub async fn unlock(
    payload: web::Json<AccessReqDto>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Access request received");

    let Some(access) = config.access.as_ref() else {
        return Ok(HttpResponse::NotFound().json(ErrorBody::new(
            "Access gate is not enabled",
            ErrorCode::NotFound,
        )));
    };

    if payload.passcode.is_empty() {
        info!("Validation failed: empty passcode");
        return Err(AppError::MissingField { field: "passcode" });
    }

    if let Err(e) = verify_password(&payload.passcode, &access.passcode_hash) {
        info!(error = %e, "Access denied: passcode mismatch");
        return Err(AppError::Unauthorized("Invalid passcode".into()));
    }

    debug!("Passcode verified, generating access token");

    let access_token = generate_access_token(&access.jwt_secret, access.token_ttl).map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        AppError::Internal("Could not issue access token".into())
    })?;

    info!("Access granted");

    Ok(HttpResponse::Ok().json(AccessResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: access.token_ttl,
    }))
}
