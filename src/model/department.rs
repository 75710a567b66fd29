//! Department tags. The set is open; only two tags get a view in the roster.

pub const GRADING: &str = "grading";
pub const CUTTING: &str = "cutting";

/// Departments the roster renders, in display order.
pub const DISPLAYED: [&str; 2] = [GRADING, CUTTING];

/// Departments are always stored lowercase.
pub fn normalize(tag: &str) -> String {
    tag.to_lowercase()
}

pub fn is_displayed(tag: &str) -> bool {
    DISPLAYED.contains(&tag)
}

/// Only grading keeps a salary; everyone else is recorded at 0.
pub fn has_salary(tag: &str) -> bool {
    tag == GRADING
}
