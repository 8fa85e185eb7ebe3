use entity::{employees, roles};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::{info, instrument};

use crate::{
    Directory, DirectoryError, DirectoryResult,
    error::WriteTarget,
    validate::{description, required_text},
};

pub(crate) const ENTITY: &str = "role";
const UNIQUE_FIELDS: &[&str] = &["name"];

#[derive(Clone, Debug, Default)]
pub struct NewRole {
    pub name: String,
    pub description: Option<String>,
}

impl NewRole {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Partial update; `description: Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct RoleChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl Directory {
    #[instrument(name = "directory.create_role", skip_all, fields(name = %input.name))]
    pub async fn create_role(&self, input: NewRole) -> DirectoryResult<roles::Model> {
        let model = roles::ActiveModel {
            name: Set(required_text("name", &input.name)?),
            description: Set(description(input.description.as_deref())?),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .map_err(|err| WriteTarget::new(ENTITY, UNIQUE_FIELDS).classify(err))?;
        info!(role_id = model.id, "role created");
        Ok(model)
    }

    pub async fn get_role(&self, id: i32) -> DirectoryResult<Option<roles::Model>> {
        Ok(roles::Entity::find_by_id(id).one(self.db()).await?)
    }

    pub async fn require_role(&self, id: i32) -> DirectoryResult<roles::Model> {
        self.get_role(id)
            .await?
            .ok_or_else(|| DirectoryError::not_found(ENTITY, id))
    }

    pub async fn find_role_by_name(
        &self,
        name: &str,
    ) -> DirectoryResult<Option<roles::Model>> {
        Ok(roles::Entity::find()
            .filter(roles::Column::Name.eq(name.trim()))
            .one(self.db())
            .await?)
    }

    pub async fn list_roles(&self) -> DirectoryResult<Vec<roles::Model>> {
        Ok(roles::Entity::find()
            .order_by_asc(roles::Column::Id)
            .all(self.db())
            .await?)
    }

    pub async fn update_role(
        &self,
        id: i32,
        changes: RoleChanges,
    ) -> DirectoryResult<roles::Model> {
        let current = self.require_role(id).await?;
        let mut active = current.clone().into_active_model();
        if let Some(name) = changes.name.as_deref() {
            active.name = Set(required_text("name", name)?);
        }
        if let Some(value) = changes.description.as_ref() {
            active.description = Set(description(value.as_deref())?);
        }
        if !active.is_changed() {
            return Ok(current);
        }
        active
            .update(self.db())
            .await
            .map_err(|err| WriteTarget::new(ENTITY, UNIQUE_FIELDS).classify(err))
    }

    /// Deletion is restricted: a role held by employees stays put.
    #[instrument(name = "directory.delete_role", skip(self))]
    pub async fn delete_role(&self, id: i32) -> DirectoryResult<()> {
        let role = self.require_role(id).await?;
        let assigned = role
            .find_related(employees::Entity)
            .count(self.db())
            .await?;
        if assigned > 0 {
            return Err(DirectoryError::StillReferenced {
                entity: ENTITY,
                id,
                employees: assigned,
            });
        }
        role.delete(self.db()).await.map_err(|err| {
            match WriteTarget::new(ENTITY, UNIQUE_FIELDS).classify(err) {
                // An employee took the role between the count and the delete.
                DirectoryError::ForeignKeyViolation { .. } => DirectoryError::StillReferenced {
                    entity: ENTITY,
                    id,
                    employees: 1,
                },
                other => other,
            }
        })?;
        info!(role_id = id, "role deleted");
        Ok(())
    }

    /// Employees currently holding the role, by id.
    pub async fn employees_of_role(&self, id: i32) -> DirectoryResult<Vec<employees::Model>> {
        let role = self.require_role(id).await?;
        Ok(role
            .find_related(employees::Entity)
            .order_by_asc(employees::Column::Id)
            .all(self.db())
            .await?)
    }
}
