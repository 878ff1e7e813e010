//! Login client for the tracking backend's REST endpoint.
//!
//! The engine only consumes the `{token, user_id}` pair; the rest of the
//! response is kept for the stored session.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "idUsuario")]
    pub user_id: i64,
    #[serde(rename = "nombreCompleto")]
    pub full_name: String,
    #[serde(rename = "rol")]
    pub role: String,
}

#[derive(Debug, Deserialize)]
struct LoginFailure {
    #[serde(default)]
    message: Option<String>,
}

pub async fn login(login_url: &str, username: &str, password: &str) -> Result<LoginResponse> {
    let client = reqwest::Client::new();
    let resp = client
        .post(login_url)
        .json(&LoginRequest { username, password })
        .send()
        .await
        .context("login request")?;

    let status = resp.status();
    if status.is_success() {
        return resp.json::<LoginResponse>().await.context("parse login response");
    }

    let body = resp.text().await.unwrap_or_default();
    anyhow::bail!("{}", rejection_message(status.as_u16(), &body))
}

/// Prefers the backend's own `message` field, falls back to the status.
fn rejection_message(status: u16, body: &str) -> String {
    serde_json::from_str::<LoginFailure>(body)
        .ok()
        .and_then(|f| f.message)
        .unwrap_or_else(|| format!("login rejected with status {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_backend_field_names() {
        let parsed: LoginResponse = serde_json::from_str(
            r#"{"token":"abc","idUsuario":42,"nombreCompleto":"Ana Pérez","rol":"CHOFER"}"#,
        )
        .unwrap();
        assert_eq!(parsed.token, "abc");
        assert_eq!(parsed.user_id, 42);
        assert_eq!(parsed.full_name, "Ana Pérez");
        assert_eq!(parsed.role, "CHOFER");
    }

    #[test]
    fn rejection_prefers_backend_message() {
        assert_eq!(
            rejection_message(401, r#"{"message":"Credenciales incorrectas"}"#),
            "Credenciales incorrectas"
        );
        assert_eq!(rejection_message(502, "<html>bad gateway</html>"), "login rejected with status 502");
    }
}
