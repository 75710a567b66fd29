use crate::api::employee::EmployeePayload;
use crate::error::ErrorBody;
use crate::model::employee::Employee;
use crate::models::{AccessReqDto, AccessResponse};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Roster API",
        version = "0.1.0",
        description = r#"
## Employee Roster

CRUD over employee records grouped by department.

### Records
- `name` and `employee_id` are trimmed on write
- `department` is stored lowercase
- `salary` is a non-negative number; values that do not parse are stored as `0`

### Access
When an access passcode is configured, exchange it at `POST /api/access`
for a bearer token and send it on every `/api/employees` call.

### Errors
Every error body has the shape `{ "error": "...", "code": "..." }`.
"#,
    ),
    paths(
        crate::auth::handlers::unlock,

        crate::api::employee::list_employees,
        crate::api::employee::list_department_employees,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            Employee,
            EmployeePayload,
            ErrorBody,
            AccessReqDto,
            AccessResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Access", description = "Passcode exchange"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
