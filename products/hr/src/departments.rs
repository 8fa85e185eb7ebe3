use entity::{departments, employees};
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

pub(crate) const ENTITY: &str = "department";
const UNIQUE_FIELDS: &[&str] = &["name"];

#[derive(Clone, Debug, Default)]
pub struct NewDepartment {
    pub name: String,
    pub description: Option<String>,
}

impl NewDepartment {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Partial update; `description: Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct DepartmentChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl Directory {
    #[instrument(name = "directory.create_department", skip_all, fields(name = %input.name))]
    pub async fn create_department(
        &self,
        input: NewDepartment,
    ) -> DirectoryResult<departments::Model> {
        let model = departments::ActiveModel {
            name: Set(required_text("name", &input.name)?),
            description: Set(description(input.description.as_deref())?),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .map_err(|err| WriteTarget::new(ENTITY, UNIQUE_FIELDS).classify(err))?;
        info!(department_id = model.id, "department created");
        Ok(model)
    }

    pub async fn get_department(&self, id: i32) -> DirectoryResult<Option<departments::Model>> {
        Ok(departments::Entity::find_by_id(id).one(self.db()).await?)
    }

    pub async fn require_department(&self, id: i32) -> DirectoryResult<departments::Model> {
        self.get_department(id)
            .await?
            .ok_or_else(|| DirectoryError::not_found(ENTITY, id))
    }

    pub async fn find_department_by_name(
        &self,
        name: &str,
    ) -> DirectoryResult<Option<departments::Model>> {
        Ok(departments::Entity::find()
            .filter(departments::Column::Name.eq(name.trim()))
            .one(self.db())
            .await?)
    }

    pub async fn list_departments(&self) -> DirectoryResult<Vec<departments::Model>> {
        Ok(departments::Entity::find()
            .order_by_asc(departments::Column::Id)
            .all(self.db())
            .await?)
    }

    pub async fn update_department(
        &self,
        id: i32,
        changes: DepartmentChanges,
    ) -> DirectoryResult<departments::Model> {
        let current = self.require_department(id).await?;
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

    /// Deletion is restricted: a department with employees stays put.
    #[instrument(name = "directory.delete_department", skip(self))]
    pub async fn delete_department(&self, id: i32) -> DirectoryResult<()> {
        let department = self.require_department(id).await?;
        let assigned = department
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
        department.delete(self.db()).await.map_err(|err| {
            match WriteTarget::new(ENTITY, UNIQUE_FIELDS).classify(err) {
                // An employee was assigned between the count and the delete.
                DirectoryError::ForeignKeyViolation { .. } => DirectoryError::StillReferenced {
                    entity: ENTITY,
                    id,
                    employees: 1,
                },
                other => other,
            }
        })?;
        info!(department_id = id, "department deleted");
        Ok(())
    }

    /// Employees currently assigned to the department, by id.
    pub async fn employees_of_department(
        &self,
        id: i32,
    ) -> DirectoryResult<Vec<employees::Model>> {
        let department = self.require_department(id).await?;
        Ok(department
            .find_related(employees::Entity)
            .order_by_asc(employees::Column::Id)
            .all(self.db())
            .await?)
    }
}
