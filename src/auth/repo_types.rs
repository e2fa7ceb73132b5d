use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub name: String,     // display name, stored in the session on login
    pub email: String,    // login identifier, unique
    pub password: String, // Argon2 PHC string
}

/// Row to insert on registration. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}
