//! sea-orm entities for the employee directory.

pub mod departments;
pub mod employees;
pub mod roles;

/// Width of the short text columns (`email`, `username`, names).
pub const SHORT_TEXT_LEN: usize = 60;
/// Width of the `description` columns.
pub const DESCRIPTION_LEN: usize = 200;

pub mod prelude {
    pub use super::departments::Entity as Departments;
    pub use super::employees::Entity as Employees;
    pub use super::roles::Entity as Roles;
}
