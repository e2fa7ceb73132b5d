use serde::Deserialize;

/// Form body of `POST /register`. Missing fields arrive as empty strings
/// so they fail validation instead of being rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Form body of `POST /login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `?error=...` on the login and register views.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorFlag {
    pub error: Option<String>,
}
