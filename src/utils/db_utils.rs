use sqlx::MySqlPool;

use crate::model::employee::EmployeePatch;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    F64(f64),
    /// Rendered inline as `CURRENT_TIMESTAMP(6)`; nothing is bound.
    CurrentTimestamp,
}

impl SqlValue {
    fn placeholder(&self) -> &'static str {
        match self {
            SqlValue::CurrentTimestamp => "CURRENT_TIMESTAMP(6)",
            _ => "?",
        }
    }
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug, PartialEq)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Column assignments for the fields present in `patch`, in table order.
///
/// `updated_at` is stamped by the database clock, the same clock that fills
/// `created_at`, so `patch.updated_at` is not sent.
pub fn patch_assignments(patch: &EmployeePatch) -> Vec<(&'static str, SqlValue)> {
    let mut set = Vec::with_capacity(5);

    if let Some(name) = &patch.name {
        set.push(("name", SqlValue::String(name.clone())));
    }
    if let Some(code) = &patch.employee_id {
        set.push(("employee_id", SqlValue::String(code.clone())));
    }
    if let Some(salary) = patch.salary {
        set.push(("salary", SqlValue::F64(salary)));
    }
    if let Some(department) = &patch.department {
        set.push(("department", SqlValue::String(department.clone())));
    }
    set.push(("updated_at", SqlValue::CurrentTimestamp));

    set
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Column names come from [`patch_assignments`], never from request input.
pub fn build_update_sql(
    table: &str,
    assignments: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> SqlUpdate {
    let set_clause = assignments
        .iter()
        .map(|(column, value)| format!("{} = {}", column, value.placeholder()))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = assignments
        .into_iter()
        .map(|(_, v)| v)
        .filter(|v| *v != SqlValue::CurrentTimestamp)
        .collect();
    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    SqlUpdate { sql, values }
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::CurrentTimestamp => query,
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}
