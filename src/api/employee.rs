use crate::{
    error::{AppError, ErrorBody},
    model::{
        department,
        employee::{Employee, EmployeePatch, NewEmployee},
    },
    store::{EmployeeStore, StoreError},
    utils::coerce,
};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};
use utoipa::ToSchema;

/// Raw create/update body. Values are read leniently and normalized by
/// [`EmployeePayload::into_new`] / [`EmployeePayload::into_patch`].
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EmployeePayload {
    #[schema(example = "Ann Lee", value_type = Option<String>)]
    pub name: Option<Value>,

    #[serde(rename = "employeeId")]
    #[schema(example = "E100", value_type = Option<String>)]
    pub employee_id: Option<Value>,

    /// Snake-case spelling of `employeeId`, read only when that key is absent or null.
    #[serde(rename = "employee_id")]
    #[schema(value_type = Option<String>)]
    pub employee_id_snake: Option<Value>,

    /// Number or numeric string; anything else is stored as 0.
    #[schema(example = "1500.5", value_type = Option<String>)]
    pub salary: Option<Value>,

    #[schema(example = "GRADING", value_type = Option<String>)]
    pub department: Option<Value>,
}

fn string_field(value: Option<&Value>, field: &'static str) -> Result<Option<String>, AppError> {
    coerce::trimmed(value).map_err(|_| AppError::Validation { field })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    value.ok_or(AppError::MissingField { field })
}

impl EmployeePayload {
    fn code(&self) -> Option<&Value> {
        self.employee_id
            .as_ref()
            .filter(|v| !v.is_null())
            .or(self.employee_id_snake.as_ref())
    }

    pub fn into_new(self) -> Result<NewEmployee, AppError> {
        let name = required(string_field(self.name.as_ref(), "name")?, "name")?;
        let employee_id = required(string_field(self.code(), "employeeId")?, "employeeId")?;
        let department = required(
            department_field(self.department.as_ref())?,
            "department",
        )?;

        Ok(NewEmployee {
            name,
            employee_id,
            salary: coerce::salary(self.salary.as_ref()),
            department,
        })
    }

    /// Absent and `null` fields stay untouched; `updated_at` is always set.
    pub fn into_patch(self, updated_at: chrono::DateTime<Utc>) -> Result<EmployeePatch, AppError> {
        Ok(EmployeePatch {
            name: string_field(self.name.as_ref(), "name")?,
            employee_id: string_field(self.code(), "employeeId")?,
            salary: self
                .salary
                .as_ref()
                .filter(|v| !v.is_null())
                .map(|v| coerce::salary(Some(v))),
            department: department_field(self.department.as_ref())?,
            updated_at,
        })
    }
}

fn department_field(value: Option<&Value>) -> Result<Option<String>, AppError> {
    // lowercased, never trimmed
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(department::normalize(s))),
        Some(_) => Err(AppError::Validation {
            field: "department",
        }),
    }
}

fn store_failure(context: &'static str) -> impl Fn(StoreError) -> AppError {
    move |e| {
        match &e {
            StoreError::NotFound(id) => debug!(id, "{}: no such employee", context),
            _ => error!(error = %e, "{}", context),
        }
        AppError::Store(e)
    }
}

/// List all employees
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees, newest first", body = [Employee]),
        (status = 401, description = "Access token missing or invalid", body = ErrorBody),
        (status = 500, description = "Record store error", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    store: web::Data<dyn EmployeeStore>,
) -> Result<HttpResponse, AppError> {
    let employees = store
        .list(None)
        .await
        .map_err(store_failure("Failed to fetch employees"))?;

    debug!(count = employees.len(), "Fetched employees");
    Ok(HttpResponse::Ok().json(employees))
}

/// List employees of one department
#[utoipa::path(
    get,
    path = "/api/employees/department/{dept}",
    params(
        ("dept", Path, description = "Department tag, matched exactly as given")
    ),
    responses(
        (status = 200, description = "Employees of the department, newest first", body = [Employee]),
        (status = 401, description = "Access token missing or invalid", body = ErrorBody),
        (status = 500, description = "Record store error", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_department_employees(
    store: web::Data<dyn EmployeeStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let dept = path.into_inner();

    let employees = store.list(Some(&dept)).await.map_err(|e| {
        error!(error = %e, department = %dept, "Failed to fetch department employees");
        AppError::Store(e)
    })?;

    Ok(HttpResponse::Ok().json(employees))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeePayload,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "A text field is missing or not a string", body = ErrorBody),
        (status = 401, description = "Access token missing or invalid", body = ErrorBody),
        (status = 500, description = "Record store error or empty insert", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    store: web::Data<dyn EmployeeStore>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, AppError> {
    let new_employee = payload.into_inner().into_new()?;

    info!(
        name = %new_employee.name,
        employee_id = %new_employee.employee_id,
        salary = new_employee.salary,
        department = %new_employee.department,
        "Adding employee"
    );

    let created = store
        .insert(new_employee)
        .await
        .map_err(store_failure("Failed to create employee"))?;

    Ok(HttpResponse::Created().json(created))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(
        ("id", Path, description = "Employee record ID")
    ),
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "A text field is not a string", body = ErrorBody),
        (status = 401, description = "Access token missing or invalid", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody),
        (status = 500, description = "Record store error", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    store: web::Data<dyn EmployeeStore>,
    path: web::Path<u64>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let patch = payload.into_inner().into_patch(Utc::now())?;

    debug!(id, ?patch, "Updating employee");

    let updated = store
        .update(id, patch)
        .await
        .map_err(store_failure("Failed to update employee"))?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete Employee
///
/// Deleting an id that does not exist also answers 204.
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(
        ("id", Path, description = "Employee record ID")
    ),
    responses(
        (status = 204, description = "Employee removed (or already absent)"),
        (status = 401, description = "Access token missing or invalid", body = ErrorBody),
        (status = 404, description = "Id is not a record id", body = ErrorBody),
        (status = 500, description = "Record store error", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    store: web::Data<dyn EmployeeStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let removed = store
        .delete(id)
        .await
        .map_err(store_failure("Failed to delete employee"))?;

    if !removed {
        debug!(id, "Delete of absent employee treated as success");
    }

    Ok(HttpResponse::NoContent().finish())
}
