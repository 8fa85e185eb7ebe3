//! HR vertical slice: the employee directory.
//!
//! [`Directory`] owns a connection pool and a password hasher and exposes
//! CRUD for employees, departments and roles, the password contract and
//! session-user loading. Integrity rules:
//!
//! * email, username and department/role names are unique; collisions come
//!   back as [`DirectoryError::UniqueConstraintViolation`];
//! * `department_id` / `role_id` may be null but must otherwise point at an
//!   existing row ([`DirectoryError::ForeignKeyViolation`]);
//! * a department or role that still has employees cannot be deleted
//!   ([`DirectoryError::StillReferenced`]).

mod departments;
mod employees;
mod error;
mod id;
mod principal;
mod roles;
mod validate;

use platform_authn::PasswordHasher;
use platform_db::DbPool;

pub use entity;
pub use departments::{DepartmentChanges, NewDepartment};
pub use employees::{EmployeeChanges, NewEmployee};
pub use error::{DirectoryError, DirectoryResult};
pub use id::IntoRecordId;
pub use principal::{EmployeeLoader, EmployeePrincipal, login_manager};
pub use roles::{NewRole, RoleChanges};

#[derive(Clone, Debug)]
pub struct Directory {
    db: DbPool,
    hasher: PasswordHasher,
}

impl Directory {
    /// Directory using the default Argon2id parameters.
    pub fn new(db: DbPool) -> Self {
        Self::with_hasher(db, PasswordHasher::default())
    }

    pub fn with_hasher(db: DbPool, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }
}
