use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::{AuthnError, AuthnResult};

/// Argon2id cost parameters. Defaults follow the OWASP baseline
/// (19 MiB memory, 2 iterations, parallelism 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Produces salted Argon2id PHC strings.
#[derive(Clone)]
pub struct PasswordHasher {
    params: HashingParams,
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(params: HashingParams) -> AuthnResult<Self> {
        let argon_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|err| AuthnError::InvalidParams(err.to_string()))?;
        Ok(Self {
            params,
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params),
        })
    }

    pub fn params(&self) -> HashingParams {
        self.params
    }

    /// Hash `raw` with a fresh random salt.
    pub fn hash(&self, raw: &str) -> AuthnResult<String> {
        if raw.is_empty() {
            return Err(AuthnError::EmptyPassword);
        }
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AuthnError::Hashing(err.to_string()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: HashingParams::default(),
            argon2: Argon2::default(),
        }
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", &self.params)
            .finish()
    }
}

/// Check `candidate` against a stored PHC string.
///
/// Algorithm, version, cost and salt are read back from the hash itself, so
/// hashes produced under older parameters keep verifying. The final digest
/// comparison is constant-time.
pub fn verify_password(hash: &str, candidate: &str) -> AuthnResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|err| AuthnError::Hashing(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::new(HashingParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "correct horsf").unwrap());
        assert!(!verify_password(&hash, "").unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = cheap_hasher();
        let first = hasher.hash("hunter2").unwrap();
        let second = hasher.hash("hunter2").unwrap();
        assert_ne!(first, second);
        assert!(verify_password(&first, "hunter2").unwrap());
        assert!(verify_password(&second, "hunter2").unwrap());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert_eq!(cheap_hasher().hash(""), Err(AuthnError::EmptyPassword));
    }

    #[test]
    fn invalid_params_are_reported() {
        let err = PasswordHasher::new(HashingParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, AuthnError::InvalidParams(_)));
    }

    #[test]
    fn garbage_hash_is_an_error() {
        let err = verify_password("not-a-phc-string", "secret").unwrap_err();
        assert!(matches!(err, AuthnError::Hashing(_)));
    }

    #[test]
    fn debug_does_not_leak_internals() {
        let rendered = format!("{:?}", PasswordHasher::default());
        assert!(rendered.contains("memory_kib: 19456"));
    }
}
