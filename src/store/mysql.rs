use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::debug;

use super::{EmployeeStore, StoreError};
use crate::model::employee::{Employee, EmployeePatch, NewEmployee};
use crate::utils::db_utils::{build_update_sql, execute_update, patch_assignments};

const SELECT_COLUMNS: &str =
    "SELECT id, name, employee_id, salary, department, created_at, updated_at FROM employees";

pub struct MySqlEmployeeStore {
    pool: MySqlPool,
}

impl MySqlEmployeeStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl EmployeeStore for MySqlEmployeeStore {
    async fn list(&self, department: Option<&str>) -> Result<Vec<Employee>, StoreError> {
        let rows = match department {
            Some(dept) => {
                // BINARY keeps the match case-sensitive under the default collation
                let sql = format!(
                    "{} WHERE BINARY department = ? ORDER BY created_at DESC, id DESC",
                    SELECT_COLUMNS
                );
                debug!(sql = %sql, department = dept, "Fetching department employees");
                sqlx::query_as::<_, Employee>(&sql)
                    .bind(dept)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} ORDER BY created_at DESC, id DESC", SELECT_COLUMNS);
                debug!(sql = %sql, "Fetching employees");
                sqlx::query_as::<_, Employee>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees (name, employee_id, salary, department)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.employee_id)
        .bind(employee.salary)
        .bind(&employee.department)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        debug!(id, "Inserted employee row");

        self.find(id).await?.ok_or(StoreError::EmptyInsert)
    }

    async fn update(&self, id: u64, patch: EmployeePatch) -> Result<Employee, StoreError> {
        let update = build_update_sql("employees", patch_assignments(&patch), "id", id);
        debug!(sql = %update.sql, id, "Updating employee");

        let affected = execute_update(&self.pool, update).await?;
        debug!(id, affected, "Employee update executed");

        // rows_affected is 0 for unchanged rows too, so existence is read back
        self.find(id).await?.ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
