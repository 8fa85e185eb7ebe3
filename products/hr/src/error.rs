use platform_authn::AuthnError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{entity} with this {field} already exists")]
    UniqueConstraintViolation {
        entity: &'static str,
        field: &'static str,
    },
    #[error("referenced {entity} {id} does not exist")]
    ForeignKeyViolation { entity: &'static str, id: i32 },
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    #[error("password is not a readable attribute")]
    InvalidCredentialAccess,
    #[error("malformed identifier {0:?}")]
    MalformedId(String),
    #[error("{entity} {id} is still assigned to {employees} employee(s)")]
    StillReferenced {
        entity: &'static str,
        id: i32,
        employees: u64,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Credential(AuthnError),
    #[error("database error: {0}")]
    Database(DbErr),
}

impl DirectoryError {
    /// Stable machine-readable code for callers that render errors.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UniqueConstraintViolation { .. } => "UNIQUE_VIOLATION",
            Self::ForeignKeyViolation { .. } => "FOREIGN_KEY_VIOLATION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidCredentialAccess => "INVALID_CREDENTIAL_ACCESS",
            Self::MalformedId(_) => "MALFORMED_ID",
            Self::StillReferenced { .. } => "STILL_REFERENCED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Credential(_) => "CREDENTIAL",
            Self::Database(_) => "INTERNAL",
        }
    }

    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<DbErr> for DirectoryError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}

impl From<AuthnError> for DirectoryError {
    fn from(err: AuthnError) -> Self {
        match err {
            AuthnError::EmptyPassword => Self::InvalidInput("password must not be empty".into()),
            AuthnError::WriteOnlyPassword => Self::InvalidCredentialAccess,
            other => Self::Credential(other),
        }
    }
}

/// What a failed write was touching, used to turn store constraint errors
/// into typed variants.
pub(crate) struct WriteTarget {
    pub entity: &'static str,
    pub unique_fields: &'static [&'static str],
    pub references: Vec<(&'static str, i32)>,
}

impl WriteTarget {
    pub fn new(entity: &'static str, unique_fields: &'static [&'static str]) -> Self {
        Self {
            entity,
            unique_fields,
            references: Vec::new(),
        }
    }

    pub fn reference(mut self, entity: &'static str, id: Option<i32>) -> Self {
        if let Some(id) = id {
            self.references.push((entity, id));
        }
        self
    }

    pub fn classify(&self, err: DbErr) -> DirectoryError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                DirectoryError::UniqueConstraintViolation {
                    entity: self.entity,
                    field: matching_name(&detail, self.unique_fields.iter().copied())
                        .unwrap_or("value"),
                }
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                let (entity, id) = self
                    .references
                    .iter()
                    .copied()
                    .find(|(entity, _)| detail.contains(entity))
                    .or_else(|| self.references.first().copied())
                    .unwrap_or((self.entity, 0));
                DirectoryError::ForeignKeyViolation { entity, id }
            }
            _ => DirectoryError::Database(err),
        }
    }
}

// Longest match first so "username" is not mistaken for a shorter column.
fn matching_name<'a>(
    detail: &str,
    names: impl Iterator<Item = &'a str>,
) -> Option<&'a str> {
    names
        .filter(|name| detail.contains(name))
        .max_by_key(|name| name.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_column_named_in_the_store_message() {
        let fields = ["email", "username"];
        assert_eq!(
            matching_name("UNIQUE constraint failed: employees.username", fields.into_iter()),
            Some("username")
        );
        assert_eq!(
            matching_name(
                "duplicate key value violates unique constraint \"idx_employees_email\"",
                fields.into_iter()
            ),
            Some("email")
        );
        assert_eq!(matching_name("something else", fields.into_iter()), None);
    }

    #[test]
    fn unclassified_errors_stay_database_errors() {
        let target = WriteTarget::new("employee", &["email"]);
        let err = target.classify(DbErr::Custom("boom".into()));
        assert!(matches!(err, DirectoryError::Database(_)));
        assert_eq!(err.code(), "INTERNAL");
    }

    #[test]
    fn credential_errors_map_to_directory_kinds() {
        assert!(matches!(
            DirectoryError::from(AuthnError::WriteOnlyPassword),
            DirectoryError::InvalidCredentialAccess
        ));
        assert!(matches!(
            DirectoryError::from(AuthnError::EmptyPassword),
            DirectoryError::InvalidInput(_)
        ));
        assert_eq!(
            DirectoryError::from(AuthnError::Hashing("x".into())).code(),
            "CREDENTIAL"
        );
    }
}
