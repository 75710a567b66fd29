//! View-model behind the roster screen: the employee list split by
//! department, one inline-editable row, the add-employee draft and an error
//! banner. All traffic goes through an [`EmployeeApi`].

use tracing::{debug, warn};

use crate::client::{ClientError, EmployeeApi};
use crate::model::department;
use crate::model::employee::{CreateEmployee, Employee, UpdateEmployee};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name and Employee ID are required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Name,
    EmployeeId,
    Salary,
}

/// Values typed into the add form, scoped to one department.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub department: String,
    pub name: String,
    pub employee_id: String,
    pub salary: f64,
}

impl Draft {
    fn empty(department: &str) -> Self {
        Self {
            department: department.to_string(),
            name: String::new(),
            employee_id: String::new(),
            salary: 0.0,
        }
    }
}

/// Form input to a salary; blank or garbage is 0.
pub fn salary_input(value: &str) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

pub struct RosterView<A> {
    api: A,
    employees: Vec<Employee>,
    editing: Option<u64>,
    draft: Option<Draft>,
    banner: Option<String>,
    loading: bool,
}

impl<A: EmployeeApi> RosterView<A> {
    /// Starts in the loading state; call [`RosterView::refresh`] to fill it.
    pub fn new(api: A) -> Self {
        Self {
            api,
            employees: Vec::new(),
            editing: None,
            draft: None,
            banner: None,
            loading: true,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    fn show_error(&mut self, context: &str, err: ClientError) {
        warn!(error = %err, "{}", context);
        self.banner = Some(err.to_string());
    }

    pub async fn refresh(&mut self) {
        self.loading = true;
        self.banner = None;
        match self.api.list_all().await {
            Ok(employees) => {
                debug!(count = employees.len(), "Roster refreshed");
                self.employees = employees;
            }
            Err(e) => self.show_error("Error fetching employees", e),
        }
        self.loading = false;
    }

    /// Opens the add form for `department` with empty values.
    pub fn begin_add(&mut self, department: &str) {
        self.draft = Some(Draft::empty(department));
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        self.draft.as_mut()
    }

    pub fn cancel_add(&mut self) {
        self.draft = None;
    }

    /// Creates the drafted employee. The returned record is shown at the top
    /// right away, then the whole list is reloaded.
    pub async fn submit_add(&mut self) -> Option<Employee> {
        let draft = self.draft.as_ref()?;
        let name = draft.name.trim();
        let employee_id = draft.employee_id.trim();
        if name.is_empty() || employee_id.is_empty() {
            self.banner = Some(REQUIRED_FIELDS_MESSAGE.to_string());
            return None;
        }

        let body = CreateEmployee {
            name: name.to_string(),
            employee_id: employee_id.to_string(),
            salary: if department::has_salary(&draft.department)
                && draft.salary.is_finite()
                && draft.salary > 0.0
            {
                draft.salary
            } else {
                0.0
            },
            department: draft.department.clone(),
        };

        self.banner = None;
        match self.api.create(&body).await {
            Ok(created) => {
                self.employees.insert(0, created.clone());
                self.draft = None;
                self.refresh().await;
                Some(created)
            }
            Err(e) => {
                self.show_error("Error adding employee", e);
                None
            }
        }
    }

    /// Marks `id` as the single editable row.
    pub fn begin_edit(&mut self, id: u64) {
        self.editing = Some(id);
    }

    pub fn editing(&self) -> Option<u64> {
        self.editing
    }

    /// Leaves edit mode. Field changes were already saved as they happened.
    pub fn save_edit(&mut self) {
        self.editing = None;
    }

    /// Saves one field of the row being edited. Rows not in edit mode,
    /// unchanged values and salaries outside grading are ignored. On failure
    /// the list is reloaded.
    pub async fn edit_field(&mut self, id: u64, field: EditField, value: &str) {
        if self.editing != Some(id) {
            return;
        }
        let Some(current) = self.employees.iter().find(|e| e.id == id) else {
            return;
        };

        let mut changes = UpdateEmployee::default();
        match field {
            EditField::Name => {
                let name = value.trim();
                if name == current.name {
                    return;
                }
                changes.name = Some(name.to_string());
            }
            EditField::EmployeeId => {
                let code = value.trim();
                if code == current.employee_id {
                    return;
                }
                changes.employee_id = Some(code.to_string());
            }
            EditField::Salary => {
                if !department::has_salary(&current.department) {
                    return;
                }
                let salary = salary_input(value);
                if salary == current.salary {
                    return;
                }
                changes.salary = Some(salary);
            }
        }

        self.banner = None;
        match self.api.update(id, &changes).await {
            Ok(updated) => {
                if let Some(row) = self.employees.iter_mut().find(|e| e.id == id) {
                    *row = updated;
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %e, id, "Error updating employee");
                self.refresh().await;
                // keep the update failure visible unless the reload failed too
                if self.banner.is_none() {
                    self.banner = Some(message);
                }
            }
        }
    }

    /// Deletes `id` once `confirm` agrees. Returns whether the row went away.
    pub async fn delete(&mut self, id: u64, confirm: impl FnOnce(&Employee) -> bool) -> bool {
        let Some(employee) = self.employees.iter().find(|e| e.id == id) else {
            return false;
        };
        if !confirm(employee) {
            return false;
        }

        self.banner = None;
        match self.api.delete(id).await {
            Ok(()) => {
                self.employees.retain(|e| e.id != id);
                if self.editing == Some(id) {
                    self.editing = None;
                }
                true
            }
            Err(e) => {
                self.show_error("Error deleting employee", e);
                false
            }
        }
    }

    /// Rows of one department; empty while a load is in progress.
    pub fn department_view(&self, department: &str) -> Vec<&Employee> {
        if self.loading {
            return Vec::new();
        }
        self.employees
            .iter()
            .filter(|e| e.department == department)
            .collect()
    }

    /// The two displayed departments, in display order.
    pub fn views(&self) -> Vec<(&'static str, Vec<&Employee>)> {
        department::DISPLAYED
            .iter()
            .map(|&dept| (dept, self.department_view(dept)))
            .collect()
    }

    /// Loaded rows that belong to neither displayed department.
    pub fn hidden(&self) -> Vec<&Employee> {
        self.employees
            .iter()
            .filter(|e| !department::is_displayed(&e.department))
            .collect()
    }
}
