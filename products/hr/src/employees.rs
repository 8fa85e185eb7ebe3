use entity::{departments, employees, roles};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder,
};
use tracing::{debug, info, instrument};

use crate::{
    Directory, DirectoryError, DirectoryResult, IntoRecordId,
    error::WriteTarget,
    validate::{normalize_email, required_text, username},
};

pub(crate) const ENTITY: &str = "employee";
const UNIQUE_FIELDS: &[&str] = &["email", "username"];

/// Input for provisioning an account.
#[derive(Clone, Default)]
pub struct NewEmployee {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Hashed before it reaches the store; never persisted as given.
    pub password: Option<String>,
    pub department_id: Option<i32>,
    pub role_id: Option<i32>,
    pub is_admin: bool,
}

/// Partial update. `None` leaves a field alone; for the references,
/// `Some(None)` clears them.
#[derive(Clone, Debug, Default)]
pub struct EmployeeChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department_id: Option<Option<i32>>,
    pub role_id: Option<Option<i32>>,
    pub is_admin: Option<bool>,
}

impl EmployeeChanges {
    pub fn assign(department_id: Option<i32>, role_id: Option<i32>) -> Self {
        Self {
            department_id: Some(department_id),
            role_id: Some(role_id),
            ..Self::default()
        }
    }
}

fn write_target(department_id: Option<i32>, role_id: Option<i32>) -> WriteTarget {
    WriteTarget::new(ENTITY, UNIQUE_FIELDS)
        .reference(crate::departments::ENTITY, department_id)
        .reference(crate::roles::ENTITY, role_id)
}

impl Directory {
    #[instrument(name = "directory.create_employee", skip_all, fields(username = %input.username))]
    pub async fn create_employee(&self, input: NewEmployee) -> DirectoryResult<employees::Model> {
        let email = normalize_email(&input.email)?;
        let username = username(&input.username)?;
        let first_name = required_text("first_name", &input.first_name)?;
        let last_name = required_text("last_name", &input.last_name)?;
        self.ensure_references(input.department_id, input.role_id)
            .await?;

        let mut active = employees::ActiveModel::new();
        active.email = Set(email);
        active.username = Set(username);
        active.first_name = Set(first_name);
        active.last_name = Set(last_name);
        active.department_id = Set(input.department_id);
        active.role_id = Set(input.role_id);
        active.is_admin = Set(input.is_admin);
        if let Some(raw) = input.password.as_deref() {
            active.set_password(self.hasher(), raw)?;
        }

        let model = active
            .insert(self.db())
            .await
            .map_err(|err| write_target(input.department_id, input.role_id).classify(err))?;
        info!(employee_id = model.id, is_admin = model.is_admin, "employee created");
        Ok(model)
    }

    pub async fn get_employee(&self, id: i32) -> DirectoryResult<Option<employees::Model>> {
        Ok(employees::Entity::find_by_id(id).one(self.db()).await?)
    }

    /// Like [`Directory::get_employee`] but a missing row is an error.
    pub async fn require_employee(&self, id: i32) -> DirectoryResult<employees::Model> {
        self.get_employee(id)
            .await?
            .ok_or_else(|| DirectoryError::not_found(ENTITY, id))
    }

    pub async fn find_employee_by_email(
        &self,
        email: &str,
    ) -> DirectoryResult<Option<employees::Model>> {
        let email = email.trim().to_lowercase();
        Ok(employees::Entity::find()
            .filter(employees::Column::Email.eq(email))
            .one(self.db())
            .await?)
    }

    pub async fn find_employee_by_username(
        &self,
        username: &str,
    ) -> DirectoryResult<Option<employees::Model>> {
        Ok(employees::Entity::find()
            .filter(employees::Column::Username.eq(username.trim()))
            .one(self.db())
            .await?)
    }

    /// Resolve a login name: anything containing `@` is treated as an email.
    pub async fn find_employee_by_login(
        &self,
        login: &str,
    ) -> DirectoryResult<Option<employees::Model>> {
        if login.contains('@') {
            self.find_employee_by_email(login).await
        } else {
            self.find_employee_by_username(login).await
        }
    }

    pub async fn list_employees(&self) -> DirectoryResult<Vec<employees::Model>> {
        Ok(employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(self.db())
            .await?)
    }

    #[instrument(name = "directory.update_employee", skip(self, changes))]
    pub async fn update_employee(
        &self,
        id: i32,
        changes: EmployeeChanges,
    ) -> DirectoryResult<employees::Model> {
        let current = self.require_employee(id).await?;
        let department_id = changes.department_id.unwrap_or(current.department_id);
        let role_id = changes.role_id.unwrap_or(current.role_id);
        if changes.department_id.is_some() || changes.role_id.is_some() {
            self.ensure_references(department_id, role_id).await?;
        }

        let mut active = current.clone().into_active_model();
        if let Some(email) = changes.email.as_deref() {
            active.email = Set(normalize_email(email)?);
        }
        if let Some(value) = changes.username.as_deref() {
            active.username = Set(username(value)?);
        }
        if let Some(first_name) = changes.first_name.as_deref() {
            active.first_name = Set(required_text("first_name", first_name)?);
        }
        if let Some(last_name) = changes.last_name.as_deref() {
            active.last_name = Set(required_text("last_name", last_name)?);
        }
        if changes.department_id.is_some() {
            active.department_id = Set(department_id);
        }
        if changes.role_id.is_some() {
            active.role_id = Set(role_id);
        }
        if let Some(is_admin) = changes.is_admin {
            active.is_admin = Set(is_admin);
        }

        if !active.is_changed() {
            debug!("no employee fields changed");
            return Ok(current);
        }
        active
            .update(self.db())
            .await
            .map_err(|err| write_target(department_id, role_id).classify(err))
    }

    /// Replace both references at once; `None` clears one. Use
    /// [`Directory::update_employee`] to change only one of them.
    pub async fn assign(
        &self,
        id: i32,
        department_id: Option<i32>,
        role_id: Option<i32>,
    ) -> DirectoryResult<employees::Model> {
        self.update_employee(id, EmployeeChanges::assign(department_id, role_id))
            .await
    }

    pub async fn set_admin(&self, id: i32, is_admin: bool) -> DirectoryResult<employees::Model> {
        self.update_employee(
            id,
            EmployeeChanges {
                is_admin: Some(is_admin),
                ..EmployeeChanges::default()
            },
        )
        .await
    }

    #[instrument(name = "directory.delete_employee", skip(self))]
    pub async fn delete_employee(&self, id: i32) -> DirectoryResult<()> {
        let result = employees::Entity::delete_by_id(id).exec(self.db()).await?;
        if result.rows_affected == 0 {
            return Err(DirectoryError::not_found(ENTITY, id));
        }
        info!(employee_id = id, "employee deleted");
        Ok(())
    }

    /// Hash `raw` and store it as the employee's only credential.
    #[instrument(name = "directory.set_password", skip(self, raw))]
    pub async fn set_password(&self, id: i32, raw: &str) -> DirectoryResult<()> {
        let current = self.require_employee(id).await?;
        let mut active = current.into_active_model();
        active.set_password(self.hasher(), raw)?;
        active.update(self.db()).await?;
        info!(employee_id = id, "password updated");
        Ok(())
    }

    pub async fn verify_password(&self, id: i32, candidate: &str) -> DirectoryResult<bool> {
        Ok(self.require_employee(id).await?.verify_password(candidate))
    }

    /// Look an account up by email or username and check the password.
    /// Unknown logins and wrong passwords are indistinguishable to the caller.
    #[instrument(name = "directory.authenticate", skip(self, password))]
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> DirectoryResult<Option<employees::Model>> {
        let Some(employee) = self.find_employee_by_login(login).await? else {
            debug!("unknown login");
            return Ok(None);
        };
        if employee.verify_password(password) {
            Ok(Some(employee))
        } else {
            debug!(employee_id = employee.id, "password mismatch");
            Ok(None)
        }
    }

    /// Session restoration lookup. Malformed identifiers are an error;
    /// well-formed ones with no row are `None`.
    pub async fn load_user_by_id(
        &self,
        id: impl IntoRecordId,
    ) -> DirectoryResult<Option<employees::Model>> {
        let id = id.into_record_id()?;
        self.get_employee(id).await
    }

    pub async fn department_of(
        &self,
        employee: &employees::Model,
    ) -> DirectoryResult<Option<departments::Model>> {
        Ok(employee
            .find_related(departments::Entity)
            .one(self.db())
            .await?)
    }

    pub async fn role_of(
        &self,
        employee: &employees::Model,
    ) -> DirectoryResult<Option<roles::Model>> {
        Ok(employee.find_related(roles::Entity).one(self.db()).await?)
    }

    async fn ensure_references(
        &self,
        department_id: Option<i32>,
        role_id: Option<i32>,
    ) -> DirectoryResult<()> {
        if let Some(id) = department_id {
            if self.get_department(id).await?.is_none() {
                return Err(DirectoryError::ForeignKeyViolation {
                    entity: crate::departments::ENTITY,
                    id,
                });
            }
        }
        if let Some(id) = role_id {
            if self.get_role(id).await?.is_none() {
                return Err(DirectoryError::ForeignKeyViolation {
                    entity: crate::roles::ENTITY,
                    id,
                });
            }
        }
        Ok(())
    }
}
