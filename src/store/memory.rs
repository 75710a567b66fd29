use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use super::{EmployeeStore, StoreError};
use crate::model::employee::{Employee, EmployeePatch, NewEmployee};

#[derive(Default)]
struct Table {
    rows: Vec<Employee>,
    next_id: u64,
}

/// Process-local employee table. Used when no `DATABASE_URL` is configured
/// and by tests.
#[derive(Default)]
pub struct MemoryEmployeeStore {
    table: Mutex<Table>,
    offline: AtomicBool,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn with_table<T>(&self, f: impl FnOnce(&mut Table) -> T) -> Result<T, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("record store offline".into()));
        }
        let mut table = self
            .table
            .lock()
            .map_err(|_| StoreError::Unavailable("employee table lock poisoned".into()))?;
        Ok(f(&mut table))
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn list(&self, department: Option<&str>) -> Result<Vec<Employee>, StoreError> {
        self.with_table(|table| {
            let mut rows: Vec<Employee> = table
                .rows
                .iter()
                .filter(|e| department.is_none_or(|d| e.department == d))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            rows
        })
    }

    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        self.with_table(|table| {
            table.next_id += 1;
            let now = Utc::now();
            let row = Employee {
                id: table.next_id,
                name: employee.name,
                employee_id: employee.employee_id,
                salary: employee.salary,
                department: employee.department,
                created_at: now,
                updated_at: now,
            };
            table.rows.push(row.clone());
            row
        })
    }

    async fn update(&self, id: u64, patch: EmployeePatch) -> Result<Employee, StoreError> {
        self.with_table(|table| {
            let row = table.rows.iter_mut().find(|e| e.id == id)?;
            patch.apply_to(row);
            Some(row.clone())
        })?
        .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        self.with_table(|table| {
            let before = table.rows.len();
            table.rows.retain(|e| e.id != id);
            table.rows.len() != before
        })
    }
}
