// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::{self, AuthSession, SESSION_COOKIE};
use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::export;
use crate::extract::{Fields, PathId};
use crate::pagination::{self, Page, PageQuery};
use crate::schema;
use crate::utils::parse_amount;
use crate::views::{CampaignDetail, CampaignSummary, LineItemView, Message};
use anyhow::anyhow;
use axum::extract::{OriginalUri, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HOST, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(conn: Connection, config: Config) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        }
    }

    /// Runs `f` with the connection locked. Never hold the guard across an await.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> anyhow::Result<T>,
    ) -> Result<T, ApiError> {
        let conn = self
            .db
            .lock()
            .map_err(|_| anyhow!("database lock poisoned"))?;
        Ok(f(&conn)?)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login/", post(login))
        .route("/logout/", post(logout))
        .route("/ping_pong/", get(ping_pong))
        .route("/campaign/", get(list_campaigns))
        .route("/campaign/csv/", post(export_campaigns_csv))
        .route("/campaign/:id/", get(campaign_detail))
        .route("/campaign/:id/line_item/csv/", post(export_line_items_csv))
        .route("/line_item/:id/", patch(patch_line_item))
        .route("/schema/", get(describe))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "campaignbook API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    fields: Fields,
) -> Result<Response, ApiError> {
    let (Some(username), Some(password)) = (
        fields.text("username").filter(|s| !s.is_empty()),
        fields.text("password").filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::MissingCredentials);
    };

    let Some(user) = auth::check_credentials(&state, username, password).await? else {
        tracing::warn!(%username, "login rejected");
        return Err(ApiError::InvalidCredentials);
    };

    let previous = auth::cookie_value(&headers, SESSION_COOKIE).map(str::to_string);
    let ttl = state.config.session_ttl;
    let now = Utc::now();
    let key = state.with_conn(|conn| {
        if let Some(old) = previous.as_deref() {
            db::delete_session(conn, old)?;
        }
        auth::start_session(conn, user.id, ttl, now)
    })?;
    tracing::info!(%username, "login succeeded");
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, auth::session_cookie(&key, ttl))],
        Json(Message {
            message: "Login successful",
        }),
    )
        .into_response())
}

async fn logout(State(state): State<AppState>, session: AuthSession) -> Result<Response, ApiError> {
    state.with_conn(|conn| db::delete_session(conn, &session.session_key))?;
    tracing::info!(username = %session.user.username, "logout");
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, auth::expired_cookie())],
        Json(Message {
            message: "Logout successful",
        }),
    )
        .into_response())
}

async fn ping_pong(_session: AuthSession) -> Json<Message> {
    Json(Message { message: "pong" })
}

async fn list_campaigns(
    State(state): State<AppState>,
    _session: AuthSession,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CampaignSummary>>, ApiError> {
    let (window, rows) = state.with_conn(|conn| {
        let count = db::count_campaigns(conn)?;
        let window = match pagination::resolve(&query, count) {
            Ok(w) => w,
            Err(_) => return Ok(None),
        };
        let rows = db::list_campaigns_page(conn, window.offset(), window.size)?;
        Ok(Some((window, rows)))
    })?
    .ok_or(ApiError::InvalidPage)?;

    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let base = format!("http://{}{}", host, uri.path());
    let results = rows
        .iter()
        .map(CampaignSummary::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(Page::new(&window, &query, &base, results)))
}

async fn campaign_detail(
    PathId(id): PathId,
    State(state): State<AppState>,
    _session: AuthSession,
) -> Result<Json<CampaignDetail>, ApiError> {
    let detail = state
        .with_conn(|conn| db::get_campaign_detail(conn, id))?
        .ok_or(ApiError::NotFound("Campaign"))?;
    Ok(Json(CampaignDetail::try_from(&detail)?))
}

fn csv_attachment(filename: String, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

async fn export_campaigns_csv(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Response, ApiError> {
    let campaigns = state.with_conn(db::all_campaigns_with_items)?;
    let mut body = Vec::new();
    export::write_campaigns(&mut body, &campaigns)?;
    tracing::info!(
        username = %session.user.username,
        rows = campaigns.len(),
        "campaign CSV exported"
    );
    Ok(csv_attachment(
        export::campaigns_filename(&Utc::now()),
        body,
    ))
}

async fn export_line_items_csv(
    PathId(id): PathId,
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Response, ApiError> {
    let (campaign, items) = state
        .with_conn(|conn| {
            let Some(campaign) = db::get_campaign(conn, id)? else {
                return Ok(None);
            };
            let items = db::line_items_for_campaign(conn, id)?;
            Ok(Some((campaign, items)))
        })?
        .ok_or(ApiError::CampaignNotFound)?;
    let mut body = Vec::new();
    export::write_line_items(&mut body, &campaign, &items)?;
    tracing::info!(
        username = %session.user.username,
        campaign_id = id,
        rows = items.len(),
        "line item CSV exported"
    );
    Ok(csv_attachment(
        export::line_items_filename(id, &Utc::now()),
        body,
    ))
}

/// Reads `adjustment_amount` from a patch body. Other keys are ignored.
fn adjustment_from_body(body: &Value) -> Result<Option<Decimal>, ApiError> {
    let Some(obj) = body.as_object() else {
        return Err(ApiError::Validation {
            field: "non_field_errors",
            message: "Invalid data. Expected a dictionary.".to_string(),
        });
    };
    let invalid = |message: String| ApiError::Validation {
        field: "adjustment_amount",
        message,
    };
    let raw = match obj.get("adjustment_amount") {
        None => return Ok(None),
        Some(Value::Null) => return Err(invalid("This field may not be null.".to_string())),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err(invalid("A valid number is required.".to_string())),
    };
    let amount = parse_amount(&raw).map_err(|e| invalid(e.to_string()))?;
    Ok(Some(amount))
}

async fn patch_line_item(
    PathId(id): PathId,
    State(state): State<AppState>,
    session: AuthSession,
    Fields(body): Fields,
) -> Result<Json<LineItemView>, ApiError> {
    let current = state
        .with_conn(|conn| db::get_line_item(conn, id))?
        .ok_or(ApiError::NotFound("LineItem"))?;
    let adjustment = adjustment_from_body(&body)?;

    let now = Utc::now();
    let updated = state
        .with_conn(|conn| {
            if !db::update_adjustment(conn, id, adjustment, now)? {
                return Ok(None);
            }
            db::get_line_item(conn, id)
        })?
        .ok_or(ApiError::NotFound("LineItem"))?;
    match adjustment {
        Some(to) => tracing::info!(
            username = %session.user.username,
            line_item_id = id,
            from = %current.adjustment_amount,
            %to,
            "adjustment updated"
        ),
        None => tracing::debug!(
            username = %session.user.username,
            line_item_id = id,
            "line item touched"
        ),
    }
    Ok(Json(LineItemView::try_from(&updated)?))
}

async fn describe() -> Json<Value> {
    Json(json!({
        "endpoints": schema::ENDPOINTS,
        "definitions": schema::DEFINITIONS,
    }))
}
