use crate::{
    api::{employee, welcome},
    auth::{
        handlers,
        middleware::{access_middleware, rate_limit_body},
    },
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::anyhow;

pub type AccessLimiter = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer limiter for passcode attempts.
pub fn access_limiter(requests_per_min: u32) -> anyhow::Result<AccessLimiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid access rate limit: {} per minute", requests_per_min))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: &AccessLimiter) {
    // malformed JSON bodies answer with the common error shape
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidBody(err.to_string()).into()),
    );
    // so do ids that are not a u64
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|_err, req| AppError::InvalidPath(req.path().to_string()).into()),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .service(web::resource("").route(web::get().to(welcome)))
            .service(
                web::resource("/access")
                    .wrap(Governor::new(limiter))
                    .wrap(from_fn(rate_limit_body))
                    .route(web::post().to(handlers::unlock)),
            )
            .service(
                web::scope("/employees")
                    .wrap(from_fn(access_middleware))
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/department/{dept}
                    .service(
                        web::resource("/department/{dept}")
                            .route(web::get().to(employee::list_department_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::config::AccessConfig;
    use crate::model::employee::Employee;
    use crate::store::{EmployeeStore, MemoryEmployeeStore};
    use actix_web::{App, http::StatusCode, test, web::Data};
    use serde_json::{Value, json};
    use std::sync::Arc;

    const PASSCODE: &str = "open sesame";

    macro_rules! app {
        ($store:expr, $config:expr) => {{
            let config: Config = $config;
            let limiter = access_limiter(config.rate_access_per_min).unwrap();
            let store: Arc<dyn EmployeeStore> = $store;
            test::init_service(
                App::new()
                    .app_data(Data::from(store))
                    .app_data(Data::new(config.clone()))
                    .configure(|cfg| configure(cfg, &config, &limiter)),
            )
            .await
        }};
    }

    fn open_config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    fn gated_config() -> Config {
        Config {
            access: Some(AccessConfig {
                passcode_hash: hash_password(PASSCODE).unwrap(),
                jwt_secret: "test-secret".into(),
                token_ttl: 60,
            }),
            ..open_config()
        }
    }

    fn create(body: Value) -> test::TestRequest {
        test::TestRequest::post().uri("/api/employees").set_json(body)
    }

    #[actix_web::test]
    async fn create_normalizes_fields() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        let resp = test::call_service(
            &app,
            create(json!({
                "name": "  Ann Lee ",
                "employeeId": " E100",
                "salary": "1500.5",
                "department": "GRADING"
            }))
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "Ann Lee");
        assert_eq!(body["employee_id"], "E100");
        assert_eq!(body["salary"], 1500.5);
        assert_eq!(body["department"], "grading");
        assert!(body["id"].as_u64().is_some());
        assert!(body["created_at"].is_string());
        assert!(body["updated_at"].is_string());
    }

    #[actix_web::test]
    async fn unparseable_salary_is_stored_as_zero() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        for salary in [json!("abc"), json!(null), json!(-5)] {
            let resp = test::call_service(
                &app,
                create(json!({
                    "name": "Bob",
                    "employeeId": "E2",
                    "salary": salary,
                    "department": "cutting"
                }))
                .to_request(),
            )
            .await;
            let body: Employee = test::read_body_json(resp).await;
            assert_eq!(body.salary, 0.0);
        }

        // salary omitted entirely
        let resp = test::call_service(
            &app,
            create(json!({ "name": "Cy", "employeeId": "E3", "department": "cutting" }))
                .to_request(),
        )
        .await;
        let body: Employee = test::read_body_json(resp).await;
        assert_eq!(body.salary, 0.0);
    }

    #[actix_web::test]
    async fn create_rejects_missing_or_non_string_text() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        let cases = [
            json!({ "employeeId": "E1", "department": "grading" }),
            json!({ "name": 5, "employeeId": "E1", "department": "grading" }),
            json!({ "name": "Ann", "department": "grading" }),
            json!({ "name": "Ann", "employeeId": "E1", "department": ["grading"] }),
        ];
        for case in cases {
            let resp = test::call_service(&app, create(case).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], "VALIDATION_FAILED");
            assert!(body["error"].is_string());
        }
    }

    #[actix_web::test]
    async fn malformed_json_uses_error_shape() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        let req = test::TestRequest::post()
            .uri("/api/employees")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INVALID_BODY");
    }

    #[actix_web::test]
    async fn lists_newest_first_and_filter_exactly() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        for (name, dept) in [("A", "grading"), ("B", "cutting"), ("C", "Grading")] {
            let resp = test::call_service(
                &app,
                create(json!({ "name": name, "employeeId": name, "department": dept }))
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri("/api/employees").to_request();
        let all: Vec<Employee> = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);

        let req = test::TestRequest::get()
            .uri("/api/employees/department/grading")
            .to_request();
        let grading: Vec<Employee> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(grading.len(), 2);
        assert!(grading.iter().all(|e| e.department == "grading"));

        // the tag is not normalized on read
        let req = test::TestRequest::get()
            .uri("/api/employees/department/GRADING")
            .to_request();
        let upper: Vec<Employee> = test::call_and_read_body_json(&app, req).await;
        assert!(upper.is_empty());
    }

    #[actix_web::test]
    async fn salary_only_update_leaves_other_fields() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        let created: Employee = test::call_and_read_body_json(
            &app,
            create(json!({
                "name": "Ann Lee",
                "employeeId": "E100",
                "salary": 10,
                "department": "grading"
            }))
            .to_request(),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/employees/{}", created.id))
            .set_json(json!({ "salary": "2000" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: Employee = test::read_body_json(resp).await;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.salary, 2000.0);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.employee_id, created.employee_id);
        assert_eq!(updated.department, created.department);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[actix_web::test]
    async fn update_normalizes_present_fields() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        let created: Employee = test::call_and_read_body_json(
            &app,
            create(json!({ "name": "Ann", "employeeId": "E1", "salary": 50, "department": "grading" }))
                .to_request(),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/employees/{}", created.id))
            .set_json(json!({ "employee_id": " E7 ", "department": "CUTTING", "name": null }))
            .to_request();
        let updated: Employee = test::call_and_read_body_json(&app, req).await;

        assert_eq!(updated.employee_id, "E7");
        assert_eq!(updated.department, "cutting");
        assert_eq!(updated.name, "Ann");
        assert_eq!(updated.salary, 50.0);
    }

    #[actix_web::test]
    async fn update_of_unknown_id_is_not_found() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        let req = test::TestRequest::put()
            .uri("/api/employees/999")
            .set_json(json!({ "name": "Ghost" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[actix_web::test]
    async fn delete_is_idempotent() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        let created: Employee = test::call_and_read_body_json(
            &app,
            create(json!({ "name": "Ann", "employeeId": "E1", "department": "grading" }))
                .to_request(),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::delete()
                .uri(&format!("/api/employees/{}", created.id))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NO_CONTENT);
            assert!(test::read_body(resp).await.is_empty());
        }

        let req = test::TestRequest::get().uri("/api/employees").to_request();
        let all: Vec<Employee> = test::call_and_read_body_json(&app, req).await;
        assert!(all.iter().all(|e| e.id != created.id));
    }

    #[actix_web::test]
    async fn store_failures_are_server_errors() {
        let store = Arc::new(MemoryEmployeeStore::new());
        let app = app!(store.clone(), open_config());
        store.set_offline(true);

        let requests = [
            test::TestRequest::get().uri("/api/employees").to_request(),
            test::TestRequest::get()
                .uri("/api/employees/department/grading")
                .to_request(),
            create(json!({ "name": "Ann", "employeeId": "E1", "department": "grading" }))
                .to_request(),
            test::TestRequest::put()
                .uri("/api/employees/1")
                .set_json(json!({ "salary": 10 }))
                .to_request(),
            test::TestRequest::delete().uri("/api/employees/1").to_request(),
        ];
        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Record store unavailable: record store offline");
            assert_eq!(body["code"], "STORE_ERROR");
        }
    }

    #[actix_web::test]
    async fn non_numeric_id_uses_error_shape() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        let requests = [
            test::TestRequest::delete().uri("/api/employees/abc").to_request(),
            test::TestRequest::put()
                .uri("/api/employees/abc")
                .set_json(json!({ "salary": 10 }))
                .to_request(),
            // one past u64::MAX
            test::TestRequest::delete()
                .uri("/api/employees/18446744073709551616")
                .to_request(),
        ];
        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], "NOT_FOUND");
            assert!(body["error"].as_str().unwrap().contains("/api/employees/"));
        }
    }

    #[actix_web::test]
    async fn camel_case_code_wins_over_snake_case() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());

        let resp = test::call_service(
            &app,
            create(json!({
                "name": "Ann",
                "employeeId": "E1",
                "employee_id": "E2",
                "department": "grading"
            }))
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Employee = test::read_body_json(resp).await;
        assert_eq!(created.employee_id, "E1");

        let req = test::TestRequest::put()
            .uri(&format!("/api/employees/{}", created.id))
            .set_json(json!({ "employee_id": " E3 " }))
            .to_request();
        let updated: Employee = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.employee_id, "E3");
    }

    #[actix_web::test]
    async fn welcome_message() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());
        let req = test::TestRequest::get().uri("/api").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["message"].as_str().unwrap().contains("Roster"));
    }

    fn unlock(passcode: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/access")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .set_json(json!({ "passcode": passcode }))
    }

    #[actix_web::test]
    async fn access_route_is_absent_when_gate_disabled() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), open_config());
        let resp = test::call_service(&app, unlock(PASSCODE).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn access_attempts_over_the_limit_use_error_shape() {
        let config = Config {
            rate_access_per_min: 1,
            ..gated_config()
        };
        let app = app!(Arc::new(MemoryEmployeeStore::new()), config);

        let resp = test::call_service(&app, unlock("wrong").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(&app, unlock(PASSCODE).to_request()).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("content-type"));
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "RATE_LIMITED");
        assert_eq!(body["error"], "Too many access attempts, try again later");
    }

    #[actix_web::test]
    async fn gate_requires_a_token_from_the_passcode() {
        let app = app!(Arc::new(MemoryEmployeeStore::new()), gated_config());

        let req = test::TestRequest::get().uri("/api/employees").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "UNAUTHORIZED");

        let resp = test::call_service(&app, unlock("wrong").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(&app, unlock("").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(&app, unlock(PASSCODE).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let grant: Value = test::read_body_json(resp).await;
        assert_eq!(grant["token_type"], "Bearer");
        assert_eq!(grant["expires_in"], 60);
        let token = grant["access_token"].as_str().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/employees")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/employees")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
