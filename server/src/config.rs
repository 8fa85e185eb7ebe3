use anyhow::{Context, Result, anyhow};
use platform_authn::{HashingParams, PasswordHasher};

const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub hashing: HashingParams,
    pub min_password_length: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = HashingParams::default();
        let hashing = HashingParams {
            memory_kib: env_u32(&lookup, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: env_u32(&lookup, "ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: env_u32(&lookup, "ARGON2_PARALLELISM", defaults.parallelism)?,
        };
        let min_password_length = match lookup("MIN_PASSWORD_LENGTH") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid MIN_PASSWORD_LENGTH {raw:?}"))?,
            None => DEFAULT_MIN_PASSWORD_LENGTH,
        };
        if min_password_length == 0 {
            return Err(anyhow!("MIN_PASSWORD_LENGTH must be at least 1"));
        }

        Ok(Self {
            hashing,
            min_password_length,
        })
    }

    pub fn hasher(&self) -> Result<PasswordHasher> {
        PasswordHasher::new(self.hashing).context("invalid Argon2 parameters")
    }

    /// Operator-side policy; the directory itself only refuses empty passwords.
    pub fn check_password_policy(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_password_length {
            return Err(anyhow!(
                "password must be at least {} characters",
                self.min_password_length
            ));
        }
        Ok(())
    }
}

fn env_u32(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> Result<u32> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("invalid {key} {raw:?}")),
        None => Ok(default),
    }
}
