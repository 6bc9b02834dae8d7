//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::{handlers::*, types::AppState};

/// 创建 API 路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/fetch-page", get(fetch_page).post(fetch_page_post))
        .route("/api/translate", post(translate))
        .route("/api/translate/cancel", post(cancel_translation))
}
