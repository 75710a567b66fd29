use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Ann Lee",
        "employee_id": "E100",
        "salary": 1500.5,
        "department": "grading",
        "created_at": "2026-01-01T08:00:00Z",
        "updated_at": "2026-01-01T08:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ann Lee")]
    pub name: String,

    /// Employee code; not unique.
    #[schema(example = "E100")]
    pub employee_id: String,

    #[schema(example = 1500.5)]
    pub salary: f64,

    #[schema(example = "grading")]
    pub department: String,

    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

/// A normalized row ready for insertion. The store assigns `id` and both
/// timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub employee_id: String,
    pub salary: f64,
    pub department: String,
}

/// Merge-by-presence update: `None` leaves the column untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub employee_id: Option<String>,
    pub salary: Option<f64>,
    pub department: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl EmployeePatch {
    pub fn touch(updated_at: DateTime<Utc>) -> Self {
        Self {
            name: None,
            employee_id: None,
            salary: None,
            department: None,
            updated_at,
        }
    }

    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(name) = &self.name {
            employee.name = name.clone();
        }
        if let Some(code) = &self.employee_id {
            employee.employee_id = code.clone();
        }
        if let Some(salary) = self.salary {
            employee.salary = salary;
        }
        if let Some(department) = &self.department {
            employee.department = department.clone();
        }
        employee.updated_at = self.updated_at;
    }
}

/// Body of `POST /employees` as sent by [`crate::client::ApiClient`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[schema(example = "Ann Lee")]
    pub name: String,
    #[schema(example = "E100")]
    pub employee_id: String,
    #[schema(example = 1500.5)]
    pub salary: f64,
    #[schema(example = "grading")]
    pub department: String,
}

/// Body of `PUT /employees/{id}`. Absent fields are not serialized, so the
/// service leaves them unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}
