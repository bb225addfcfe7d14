use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AppInfo {
    pub app: String,
    pub message: String,
}

/// GET / - Static identity of the receiver
pub async fn root(State(state): State<AppState>) -> Json<AppInfo> {
    Json(AppInfo {
        app: state.cfg.app.name.clone(),
        message: state.cfg.app.message.clone(),
    })
}
