/// WebSocket upgrade
///
/// ```text
/// GET /v1/ws
/// Authorization: Bearer <token>        (or ?token=<token>)
/// ```
///
/// Browsers cannot set headers on a WebSocket handshake, so the token may
/// also come as a query parameter. The header wins when both are present.

use crate::{app::AppState, error::ApiError, ws::session};
use axum::{
    extract::{ws::rejection::WebSocketUpgradeRejection, Query, State, WebSocketUpgrade},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use meetuj_shared::auth::credentials::CredentialError;
use meetuj_shared::auth::middleware::{bearer_token, AuthContext};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

pub async fn upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)
        .map(str::to_owned)
        .or(params.token)
        .ok_or(CredentialError::MissingToken)?;

    let account_id = state.credentials.verify_token(&token)?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    Ok(ws.on_upgrade(move |socket| {
        session::run(socket, state, token, AuthContext::new(account_id))
    }))
}
