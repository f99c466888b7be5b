use sqlx::FromRow;

/// An account as stored by the user store.
///
/// Deliberately not `Serialize`: the credential never leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    #[sqlx(rename = "name")]
    pub username: String,
    pub email: String,
    /// bcrypt verifier, salt included.
    pub password_hash: String,
}

/// Account data ready to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
