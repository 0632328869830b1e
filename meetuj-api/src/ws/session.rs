/// Per-connection loop
///
/// Frames are handled one at a time, in order. The token is re-verified on
/// every frame, so a session ends once its token expires.

use axum::extract::ws::{Message, WebSocket};
use meetuj_shared::auth::middleware::AuthContext;
use serde_json::Value;
use tracing::{debug, error, info};

use super::dispatch::dispatch;
use super::protocol::{parse_frame, Response, INVALID_REQUEST};
use crate::app::AppState;
use crate::error::ApiError;

/// Outcome of one frame
struct Reply {
    response: Response,
    keep_open: bool,
}

async fn handle_text(state: &AppState, token: &str, text: &str) -> Reply {
    let (id, request) = match parse_frame(text) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(message = %err.message, "Rejected WebSocket frame");
            return Reply {
                response: Response::invalid(err),
                keep_open: true,
            };
        }
    };

    let auth = match state.credentials.verify_token(token) {
        Ok(account_id) => AuthContext::new(account_id),
        Err(err) => {
            return Reply {
                response: Response::from_error(id, &ApiError::from(err)),
                keep_open: false,
            };
        }
    };

    let op = request.op();
    let response = match dispatch(state, auth, request).await {
        Ok(data) => Response::success(id, data),
        Err(err) => {
            if let ApiError::InternalError(detail) = &err {
                error!(op, error = %detail, "WebSocket operation failed");
            } else {
                debug!(op, code = err.code(), "WebSocket operation rejected");
            }
            Response::from_error(id, &err)
        }
    };

    Reply {
        response,
        keep_open: true,
    }
}

/// Serves one upgraded socket until the client leaves or the token expires
pub async fn run(mut socket: WebSocket, state: AppState, token: String, auth: AuthContext) {
    let guard = state.sessions.register(auth.account_id);
    let session_id = guard.session_id();

    info!(
        %session_id,
        account_id = %auth.account_id,
        open_for_account = state.sessions.sessions_for(auth.account_id).len(),
        "WebSocket connected"
    );

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                debug!(%session_id, error = %e, "WebSocket receive failed");
                break;
            }
        };

        let reply = match message {
            Message::Text(text) => handle_text(&state, &token, &text).await,
            Message::Binary(_) => Reply {
                response: Response::failure(
                    Value::Null,
                    INVALID_REQUEST,
                    "Binary frames are not supported",
                ),
                keep_open: true,
            },
            Message::Ping(_) | Message::Pong(_) => continue,
            Message::Close(_) => break,
        };

        let payload = match serde_json::to_string(&reply.response) {
            Ok(payload) => payload,
            Err(e) => {
                error!(%session_id, error = %e, "Failed to encode WebSocket response");
                break;
            }
        };

        if socket.send(Message::Text(payload)).await.is_err() || !reply.keep_open {
            break;
        }
    }

    let _ = socket.close().await;
    info!(%session_id, "WebSocket disconnected");
}
