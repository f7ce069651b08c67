use crate::error::Error;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// A hash of a password nobody knows, used to make a lookup of a missing user take as long as
/// a real password check.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$PUpyHXvHTSOKvr9Sc6vK8g$8nqXzDRQiIJFhFOVMZXbSIuRJD+FUnUtKUyLbHbCYPU";

pub fn new_hash(password: &str) -> Result<String, Error> {
    let saltstring = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &saltstring)
        .map_err(|e| Error::PasswordHasherError(e.to_string()))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash_str: &str) -> Result<(), Error> {
    let hash =
        PasswordHash::new(hash_str).map_err(|e| Error::PasswordHasherError(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .map_err(|_| Error::InvalidPassword)
}

/// Run a verification that always fails. Call this when there is no user to check against.
pub fn verify_nothing(password: &str) -> Error {
    match verify_password(password, DUMMY_HASH) {
        Ok(()) | Err(Error::InvalidPassword) => Error::InvalidPassword,
        Err(e) => e,
    }
}
