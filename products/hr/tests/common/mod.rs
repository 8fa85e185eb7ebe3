#![allow(dead_code)]

use migration::{Migrator, MigratorTrait};
use platform_authn::{HashingParams, PasswordHasher};
use platform_db::DatabaseSettings;
use products_hr::{Directory, NewEmployee, entity::employees};

/// Fresh in-memory directory with the schema applied. Hashing uses the
/// cheapest Argon2 parameters so tests stay fast.
pub async fn directory() -> Directory {
    let mut settings = DatabaseSettings::new("sqlite::memory:");
    // Every pooled connection would get its own in-memory database.
    settings.max_connections = 1;
    let db = platform_db::connect(&settings)
        .await
        .expect("connect sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    Directory::with_hasher(db, cheap_hasher())
}

pub fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(HashingParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid params")
}

pub fn new_employee(username: &str) -> NewEmployee {
    NewEmployee {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        first_name: "Test".into(),
        last_name: username.to_uppercase(),
        ..NewEmployee::default()
    }
}

pub async fn employee(directory: &Directory, username: &str) -> employees::Model {
    directory
        .create_employee(new_employee(username))
        .await
        .expect("create employee")
}
