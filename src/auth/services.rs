use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::auth::{
    dto::{LoginForm, RegisterForm},
    password::{hash_password, verify_password},
    repo::{StoreError, UserStore},
    repo_types::{NewUser, User},
};

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("invalid registration input")]
    InvalidInput,
    #[error("email already registered")]
    EmailTaken,
    #[error("password hashing failed: {0}")]
    Hash(anyhow::Error),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegisterError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => RegisterError::EmailTaken,
            other => RegisterError::Store(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates the form and inserts one user row.
pub async fn register_user(store: &dyn UserStore, form: RegisterForm) -> Result<(), RegisterError> {
    let name = form.name.trim();
    let email = normalize_email(&form.email);

    if name.is_empty() || form.password.is_empty() || !is_valid_email(&email) {
        warn!(email = %email, "rejected registration input");
        return Err(RegisterError::InvalidInput);
    }

    let password = hash_password(&form.password).map_err(RegisterError::Hash)?;
    store
        .insert(&NewUser {
            name: name.to_string(),
            email,
            password,
        })
        .await?;
    Ok(())
}

/// Finds the user whose email and password both match.
pub async fn authenticate(store: &dyn UserStore, form: LoginForm) -> Result<User, AuthError> {
    let email = normalize_email(&form.email);
    if email.is_empty() || form.password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let Some(user) = store.find_by_email(&email).await? else {
        debug!(email = %email, "login unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    // Rows written before hashing hold a non-PHC value that can never verify.
    let matches = verify_password(&form.password, &user.password).unwrap_or_else(|e| {
        warn!(email = %email, error = %e, "stored password is not an argon2 hash");
        false
    });
    if !matches {
        debug!(email = %email, "login password mismatch");
        return Err(AuthError::InvalidCredentials);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::memory::{MemoryUserStore, UnreachableUserStore};

    fn register_form(name: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("ann@x.com"));
        assert!(!is_valid_email("ann"));
        assert!(!is_valid_email("ann@x"));
        assert!(!is_valid_email("a nn@x.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn register_creates_exactly_one_row() {
        let store = MemoryUserStore::default();
        register_user(&store, register_form("Ann", " Ann@X.com ", "p1"))
            .await
            .expect("register");

        let rows = store.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Ann");
        assert_eq!(rows[0].email, "ann@x.com");
        assert_ne!(rows[0].password, "p1");
    }

    #[tokio::test]
    async fn register_rejects_blank_fields_and_bad_email() {
        let store = MemoryUserStore::default();
        for form in [
            register_form("", "ann@x.com", "p1"),
            register_form("Ann", "not-an-email", "p1"),
            register_form("Ann", "ann@x.com", ""),
            RegisterForm::default(),
        ] {
            let err = register_user(&store, form).await.unwrap_err();
            assert!(matches!(err, RegisterError::InvalidInput));
        }
        assert!(store.rows().await.is_empty());
    }

    #[tokio::test]
    async fn second_registration_with_same_email_is_rejected() {
        let store = MemoryUserStore::default();
        register_user(&store, register_form("Ann", "ann@x.com", "p1"))
            .await
            .expect("first register");
        let err = register_user(&store, register_form("Other Ann", "ANN@x.com", "p2"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::EmailTaken));
        assert_eq!(store.rows().await.len(), 1);
    }

    #[tokio::test]
    async fn register_surfaces_store_failure() {
        let err = register_user(&UnreachableUserStore, register_form("Ann", "ann@x.com", "p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::Store(_)));
    }

    #[tokio::test]
    async fn authenticate_matches_exact_credentials_only() {
        let store = MemoryUserStore::default();
        register_user(&store, register_form("Ann", "ann@x.com", "p1"))
            .await
            .expect("register");

        let user = authenticate(&store, login_form("ann@x.com", "p1"))
            .await
            .expect("login");
        assert_eq!(user.name, "Ann");

        let wrong = authenticate(&store, login_form("ann@x.com", "wrong")).await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let unknown = authenticate(&store, login_form("bob@x.com", "p1")).await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));

        let empty = authenticate(&store, LoginForm::default()).await;
        assert!(matches!(empty, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn row_without_hash_is_rejected_not_errored() {
        let store = MemoryUserStore::default();
        store
            .insert(&NewUser {
                name: "Legacy".into(),
                email: "legacy@x.com".into(),
                password: "p1".into(),
            })
            .await
            .expect("insert");

        let res = authenticate(&store, login_form("legacy@x.com", "p1")).await;
        assert!(matches!(res, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn authenticate_distinguishes_store_failure_from_bad_credentials() {
        let err = authenticate(&UnreachableUserStore, login_form("ann@x.com", "p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }
}
