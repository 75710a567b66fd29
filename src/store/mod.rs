//! Record store seam. Handlers only see [`EmployeeStore`]; the backing
//! table lives in MySQL or, without a database, in process memory.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::employee::{Employee, EmployeePatch, NewEmployee};

pub mod memory;
pub mod mysql;

pub use memory::MemoryEmployeeStore;
pub use mysql::MySqlEmployeeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Employee {0} not found")]
    NotFound(u64),

    #[error("No data returned from insert")]
    EmptyInsert,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Code reported by the database itself (SQLSTATE for MySQL), if any.
    pub fn db_code(&self) -> Option<String> {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().map(|c| c.into_owned())
            }
            _ => None,
        }
    }
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Rows ordered by `created_at` descending, optionally restricted to one
    /// department by exact, case-sensitive match.
    async fn list(&self, department: Option<&str>) -> Result<Vec<Employee>, StoreError>;

    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError>;

    async fn update(&self, id: u64, patch: EmployeePatch) -> Result<Employee, StoreError>;

    /// Returns whether a row was removed. Missing ids are not an error.
    async fn delete(&self, id: u64) -> Result<bool, StoreError>;
}
