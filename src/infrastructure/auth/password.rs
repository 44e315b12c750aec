use argon2::{
    password_hash::{
        rand_core::OsRng,
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, Error as Argon2Error
    },
    Argon2, Algorithm, Params, Version
};

use once_cell::sync::Lazy;

use crate::errors::PasswordError;

// Argon2id, 15 MiB, 2 passes, single lane.
const MEMORY_COST_KIB: u32 = 15_000;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Produces the PHC string stored in the `password_hash` column of
/// `clients` and `companies`. Account rows are seeded outside this service;
/// here it also backs the dummy hash used for unknown accounts.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingError(e.to_string()))
        .map(|hash| hash.to_string())
}

/// Ok(false) for a mismatch; Err only when the stored hash is unusable.
pub fn verify_password(
    password: &str,
    hashed: &str,
) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hashed)
        .map_err(|e| PasswordError::InvalidHashFormat(e.to_string()))?;

    match hasher()?.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(Argon2Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationError(e.to_string())),
    }
}

// Hashed once with the live parameters so a dummy check costs the same as a real one.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    hash_password("dummy-password-for-unknown-accounts")
        .map_err(|e| tracing::error!("Failed to prepare dummy password hash: {}", e))
        .ok()
});

/// Runs a full verification against a fixed hash. Callers treat any outcome as a mismatch.
pub fn verify_dummy_password(password: &str) -> bool {
    match DUMMY_HASH.as_deref() {
        Some(hash) => verify_password(password, hash).unwrap_or(false),
        None => false,
    }
}
