// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Password hashing, server-side sessions and the `AuthSession` extractor.

use crate::api::AppState;
use crate::db;
use crate::error::ApiError;
use crate::models::User;
use anyhow::Result;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use sha2::Sha256;

pub const SESSION_COOKIE: &str = "sessionid";

const ALGORITHM: &str = "pbkdf2_sha256";
pub const DEFAULT_ITERATIONS: u32 = 600_000;
const DIGEST_LEN: usize = 32;

/// Encodes as `pbkdf2_sha256$<iterations>$<salt>$<hex digest>`.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let digest = derive(password, &salt, iterations);
    format!("{}${}${}${}", ALGORITHM, iterations, salt, hex::encode(digest))
}

pub fn verify_password(password: &str, encoded: &str) -> bool {
    let parts: Vec<&str> = encoded.split('$').collect();
    let [algorithm, iterations, salt, expected] = parts.as_slice() else {
        return false;
    };
    if *algorithm != ALGORITHM {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };
    let actual = derive(password, salt, iterations);
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut out);
    out
}

/// The active user for these credentials, or `None`.
pub fn authenticate(conn: &Connection, username: &str, password: &str) -> Result<Option<User>> {
    let Some(user) = db::find_user_by_username(conn, username)? else {
        return Ok(None);
    };
    if !user.is_active || !verify_password(password, &user.password_hash) {
        return Ok(None);
    }
    Ok(Some(user))
}

/// Same check as [`authenticate`], for the server. The user row is read
/// under the connection lock, and key derivation then runs on the blocking
/// pool with the lock released.
pub async fn check_credentials(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<Option<User>, ApiError> {
    let Some(user) = state.with_conn(|conn| db::find_user_by_username(conn, username))? else {
        return Ok(None);
    };
    if !user.is_active {
        return Ok(None);
    }
    let password = password.to_string();
    let encoded = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &encoded))
        .await
        .map_err(|e| anyhow::anyhow!("password check did not complete: {}", e))?;
    Ok(matches.then_some(user))
}

pub fn new_session_key() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Stores a fresh session for `user_id` and returns its key.
pub fn start_session(
    conn: &Connection,
    user_id: i64,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String> {
    db::purge_expired_sessions(conn, now)?;
    let key = new_session_key();
    db::insert_session(conn, &key, user_id, now + ttl)?;
    db::touch_last_login(conn, user_id, now)?;
    Ok(key)
}

pub fn session_cookie(key: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        key,
        ttl.num_seconds()
    )
}

pub fn expired_cookie() -> String {
    format!(
        "{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE
    )
}

/// First value of cookie `name` across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Identity of the caller, resolved from the session cookie. Handlers that
/// take this argument reject anonymous requests with 403.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub session_key: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = cookie_value(&parts.headers, SESSION_COOKIE)
            .ok_or(ApiError::AuthenticationRequired)?
            .to_string();
        let now = Utc::now();
        let user = state
            .with_conn(|conn| db::find_session_user(conn, &key, now))?
            .ok_or(ApiError::AuthenticationRequired)?;
        Ok(AuthSession {
            user,
            session_key: key,
        })
    }
}
