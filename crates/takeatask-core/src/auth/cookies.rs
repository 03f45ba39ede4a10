//! Cookie jar mirroring the credential for the route guard.
//!
//! Cookies carry an absolute expiry. An expired cookie reads as absent and is
//! dropped on the next write.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::{write_json_atomic, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredCookie {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct CookieJar {
    path: Option<PathBuf>,
    cookies: Mutex<BTreeMap<String, StoredCookie>>,
}

impl CookieJar {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cookies: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let cookies: BTreeMap<String, StoredCookie> = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), cookies = cookies.len(), "Cookie jar opened");
        Ok(Self {
            path: Some(path),
            cookies: Mutex::new(cookies),
        })
    }

    /// Value of a live, non-empty cookie.
    pub fn get(&self, name: &str) -> Option<String> {
        let now = Utc::now();
        let cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies
            .get(name)
            .filter(|c| !c.is_expired(now) && !c.value.is_empty())
            .map(|c| c.value.clone())
    }

    pub fn set(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StoreError> {
        self.set_with_expiry(name, value, Utc::now() + max_age)
    }

    pub fn set_with_expiry(
        &self,
        name: &str,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();
        cookies.retain(|_, c| !c.is_expired(now));
        cookies.insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires_at,
            },
        );
        self.flush(&cookies)
    }

    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        if cookies.remove(name).is_some() {
            self.flush(&cookies)?;
        }
        Ok(())
    }

    /// Expiry of a stored cookie, live or not.
    pub fn expires_at(&self, name: &str) -> Option<DateTime<Utc>> {
        let cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.get(name).map(|c| c.expires_at)
    }

    fn flush(&self, cookies: &BTreeMap<String, StoredCookie>) -> Result<(), StoreError> {
        match self.path {
            Some(ref path) => write_json_atomic(path, cookies),
            None => Ok(()),
        }
    }
}
