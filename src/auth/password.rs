use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

/// Produces the PHC string expected in `ACCESS_PASSCODE_HASH`.
pub fn hash_password(passcode: &str) -> Result<String, argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    Ok(argon2.hash_password(passcode.as_bytes(), &salt)?.to_string())
}

/// A malformed hash is reported as an error, same as a mismatch.
pub fn verify_password(passcode: &str, hashed: &str) -> Result<(), argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    argon2.verify_password(passcode.as_bytes(), &parsed)
}
