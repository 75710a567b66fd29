use actix_web::{HttpResponse, Responder};
use serde_json::json;

pub mod employee;

pub async fn welcome() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the Employee Roster API"
    }))
}
