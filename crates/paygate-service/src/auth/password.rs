//! Salted password hashing with Argon2id.
//!
//! Salts and digests are kept as raw bytes next to each other in the credential
//! record instead of a PHC string, so the derivation is a pure function of
//! `(password, salt)` under fixed cost parameters.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::rand_core::{OsRng, RngCore},
};

use paygate_core::config::HasherConfig;
use paygate_store::model::{PasswordDigest, Salt};

use crate::error::{AuthError, AuthResult};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Salt generation, key derivation and verification.
///
/// Implementations must be deterministic in `hash_password` and must compare
/// digests in constant time.
pub trait CredentialHasher: Send + Sync {
    /// ## Summary
    /// Draws a fresh salt from the OS CSPRNG.
    ///
    /// ## Errors
    /// Returns `Hashing` if the entropy source fails. Callers must treat this
    /// as fatal.
    fn generate_salt(&self) -> AuthResult<Salt>;

    /// ## Summary
    /// Derives the digest of `password` under `salt`.
    ///
    /// ## Errors
    /// Returns `Hashing` if the key derivation fails.
    fn hash_password(&self, password: &str, salt: &Salt) -> AuthResult<PasswordDigest>;

    /// ## Summary
    /// Recomputes the digest and compares it to `expected` in constant time.
    ///
    /// Never errors: a derivation failure is logged and reported as a mismatch.
    fn verify(&self, password: &str, expected: &PasswordDigest, salt: &Salt) -> bool {
        match self.hash_password(password, salt) {
            Ok(actual) => constant_time_eq(actual.as_bytes(), expected.as_bytes()),
            Err(err) => {
                tracing::error!(error = %err, "Password verification could not derive digest");
                false
            }
        }
    }
}

/// Argon2id (v0x13) hasher with fixed cost and an optional pepper.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    pepper: Option<Vec<u8>>,
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("memory_kib", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}

impl Argon2Hasher {
    /// ## Summary
    /// Builds a hasher from the configured cost parameters.
    ///
    /// ## Errors
    /// Returns `ConfigurationError` if Argon2 rejects the parameters.
    pub fn new(config: &HasherConfig) -> AuthResult<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(DIGEST_LEN),
        )
        .map_err(|e| AuthError::ConfigurationError(format!("Invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            params,
            pepper: config.pepper.as_ref().map(|p| p.as_bytes().to_vec()),
        })
    }

    fn argon2(&self) -> AuthResult<Argon2<'_>> {
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper,
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
            .map_err(|e| AuthError::ConfigurationError(format!("Invalid Argon2 pepper: {e}"))),
            None => Ok(Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn generate_salt(&self) -> AuthResult<Salt> {
        let mut bytes = vec![0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AuthError::Hashing(format!("Entropy source unavailable: {e}")))?;
        Ok(Salt::from_bytes(bytes))
    }

    fn hash_password(&self, password: &str, salt: &Salt) -> AuthResult<PasswordDigest> {
        let mut digest = vec![0u8; DIGEST_LEN];
        self.argon2()?
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut digest)
            .map_err(|e| AuthError::Hashing(format!("Failed to hash password: {e}")))?;
        Ok(PasswordDigest::from_bytes(digest))
    }
}

/// Compares two byte strings without an early exit on the first difference.
///
/// The running time depends only on the length of the inputs. A length
/// mismatch returns `false` immediately; digest lengths are public.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let diff = a
        .iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}
