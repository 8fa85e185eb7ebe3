use std::sync::Arc;

use async_trait::async_trait;
use entity::employees;
use platform_authn::{AuthnError, AuthnResult, LoginManager, UserLoader, UserPrincipal};
use tracing::warn;

use crate::{Directory, DirectoryError};

/// An employee acting as a logged-in user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeePrincipal {
    employee: employees::Model,
}

impl EmployeePrincipal {
    pub fn new(employee: employees::Model) -> Self {
        Self { employee }
    }

    pub fn employee(&self) -> &employees::Model {
        &self.employee
    }

    pub fn into_employee(self) -> employees::Model {
        self.employee
    }

    pub fn is_admin(&self) -> bool {
        self.employee.is_admin
    }
}

impl UserPrincipal for EmployeePrincipal {
    fn id(&self) -> Option<String> {
        Some(self.employee.id.to_string())
    }
}

/// [`UserLoader`] backed by the directory. A session id that does not parse
/// is treated as "no user" so a tampered cookie degrades to anonymous.
#[derive(Clone, Debug)]
pub struct EmployeeLoader {
    directory: Directory,
}

impl EmployeeLoader {
    pub fn new(directory: Directory) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl UserLoader for EmployeeLoader {
    type Principal = EmployeePrincipal;

    async fn load_user(&self, user_id: &str) -> AuthnResult<Option<EmployeePrincipal>> {
        match self.directory.load_user_by_id(user_id).await {
            Ok(found) => Ok(found.map(EmployeePrincipal::new)),
            Err(DirectoryError::MalformedId(raw)) => {
                warn!(user_id = %raw, "ignoring malformed session user id");
                Ok(None)
            }
            Err(err) => Err(AuthnError::Loader(err.to_string())),
        }
    }
}

/// Login manager wired to the directory, for the session middleware.
pub fn login_manager(directory: Directory) -> LoginManager<EmployeePrincipal> {
    LoginManager::new(Arc::new(EmployeeLoader::new(directory)))
}
