//! Durable session store: token and user identity across process restarts.
//!
//! A small JSON state file stands in for the device keychain the real
//! clients use. Read at startup, written after login, cleared at logout.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::auth::LoginResponse;
use crate::session::Credentials;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user_id: Option<i64>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    pub fn from_login(login: &LoginResponse) -> Self {
        Self {
            token: Some(login.token.clone()),
            user_id: Some(login.user_id),
            full_name: Some(login.full_name.clone()),
            role: Some(login.role.clone()),
            saved_at: Some(Utc::now()),
        }
    }

    /// The pair the engine actually consumes, when both halves are present.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.token, self.user_id) {
            (Some(token), Some(user_id)) => Some(Credentials {
                token: token.clone(),
                user_id,
            }),
            _ => None,
        }
    }
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Missing or unreadable state degrades to an empty session; the caller
    /// falls back to a fresh login.
    pub async fn load(&self) -> StoredSession {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => StoredSession::default(),
        }
    }

    pub async fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create state dir for {}", self.path.display()))?;
        }
        let raw = serde_json::to_vec_pretty(session).context("serialize session state")?;
        fs::write(&self.path, raw)
            .await
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    /// Logout: forget the stored identity.
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", self.path.display())),
        }
    }
}
