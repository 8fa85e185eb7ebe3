use std::{convert::Infallible, fmt};

use platform_authn::{AuthnError, PasswordHasher, verify_password};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::Serialize;
use tracing::warn;

/// An account record: directory entry and login principal at once.
///
/// `password_hash` holds an Argon2id PHC string or nothing. It is written only
/// through [`ActiveModel::set_password`] and is skipped when serializing.
#[derive(Clone, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, indexed, column_type = "String(Some(60))")]
    pub email: String,
    #[sea_orm(unique, indexed, column_type = "String(Some(60))")]
    pub username: String,
    #[sea_orm(indexed, column_type = "String(Some(60))")]
    pub first_name: String,
    #[sea_orm(indexed, column_type = "String(Some(60))")]
    pub last_name: String,
    #[sea_orm(column_type = "String(Some(128))", nullable)]
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[sea_orm(nullable)]
    pub department_id: Option<i32>,
    #[sea_orm(nullable)]
    pub role_id: Option<i32>,
    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id",
        on_delete = "Restrict"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::roles::Entity",
        from = "Column::RoleId",
        to = "super::roles::Column::Id",
        on_delete = "Restrict"
    )]
    Role,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            is_admin: Set(false),
            ..ActiveModelTrait::default()
        }
    }
}

impl ActiveModel {
    /// Replace the stored hash with a fresh salted hash of `raw`.
    pub fn set_password(&mut self, hasher: &PasswordHasher, raw: &str) -> Result<(), AuthnError> {
        let hash = hasher.hash(raw)?;
        self.password_hash = Set(Some(hash));
        Ok(())
    }
}

impl Model {
    /// The raw password is write-only; reading it is always a usage error.
    pub fn password(&self) -> Result<Infallible, AuthnError> {
        Err(AuthnError::WriteOnlyPassword)
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// True iff `candidate` matches the stored hash. Accounts without a
    /// password never verify.
    pub fn verify_password(&self, candidate: &str) -> bool {
        let Some(hash) = self.password_hash.as_deref() else {
            return false;
        };
        match verify_password(hash, candidate) {
            Ok(matches) => matches,
            Err(err) => {
                warn!(employee_id = self.id, error = %err, "stored password hash is unreadable");
                false
            }
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Employee: {}>", self.username)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field(
                "password_hash",
                &self.password_hash.as_ref().map(|_| "<redacted>"),
            )
            .field("department_id", &self.department_id)
            .field("role_id", &self.role_id)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}
