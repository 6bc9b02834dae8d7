//! Web 路由处理器

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::core::{Pipeline, PipelineError};
use crate::network::FetchError;
use crate::translation::TranslationEngine;
use crate::utils::url::parse_http_url;
use crate::web::types::{
    AppState, CancelResponse, FetchPageQuery, FetchPageResponse, TranslateRequest,
    TranslateResponse,
};

/// 获取页面内容：`GET /api/fetch-page?url=...`
pub async fn fetch_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FetchPageQuery>,
) -> Response {
    let Some(url) = query.url.filter(|url| !url.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "URL parameter is required" })),
        )
            .into_response();
    };

    tracing::info!("获取页面请求: {}", url);

    let (status, body) = match state.fetcher.fetch(&url, &CancellationToken::new()).await {
        Ok(html) => {
            tracing::info!("页面获取成功，内容长度: {}", html.len());
            (StatusCode::OK, Json(json!(FetchPageResponse { html })))
        }
        Err(e) => {
            tracing::error!("页面获取失败: {}", e);
            let status = match e {
                FetchError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(json!({ "error": e.to_string(), "name": e.name() })),
            )
        }
    };

    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}

/// `POST /api/fetch-page` 暂未支持
pub async fn fetch_page_post() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "POST method not implemented yet" })),
    )
}

/// 执行完整的翻译流程：`POST /api/translate`
///
/// 开始新的运行会取消正在进行的运行。
pub async fn translate(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<TranslateRequest>,
) -> Response {
    let config = state.translation.clone().with_overrides(
        request.base_url.as_deref(),
        request.model_name.as_deref(),
        request.api_key.as_deref(),
    );

    if let Err(e) = config.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "failed",
                "kind": "config",
                "error": e.to_string(),
                "message": e.to_string(),
            })),
        )
            .into_response();
    }

    // 无效地址不能取消正在进行的运行
    if parse_http_url(&request.url).is_none() {
        let error = PipelineError::InvalidUrl(request.url.clone());
        tracing::warn!("翻译请求地址无效: {}", request.url);
        return failure_response(&error);
    }

    tracing::info!("开始处理翻译请求: {}", request.url);

    let backend = state.backend_for(&config);
    let engine = TranslationEngine::new(config, backend);
    let mut pipeline = Pipeline::new(state.fetcher.clone(), engine);

    let run = state.runs.begin(&request.url);
    let result = pipeline.run(&request.url, run.token()).await;
    drop(run);

    match result {
        Ok(output) => Json(TranslateResponse {
            status: "done",
            url: output.url.to_string(),
            original_html: output.original_html(),
            translated_html: output.translated_html(),
            units: output.units,
            translated: output.translated_units,
        })
        .into_response(),
        Err(PipelineError::Cancelled) => (
            StatusCode::OK,
            Json(json!({
                "status": "cancelled",
                "message": PipelineError::Cancelled.user_message(),
            })),
        )
            .into_response(),
        Err(e) => failure_response(&e),
    }
}

fn failure_response(error: &PipelineError) -> Response {
    (
        failure_status(error),
        Json(json!({
            "status": "failed",
            "kind": error.kind(),
            "error": error.to_string(),
            "message": error.user_message(),
        })),
    )
        .into_response()
}

/// 取消当前运行：`POST /api/translate/cancel`
pub async fn cancel_translation(State(state): State<Arc<AppState>>) -> Json<CancelResponse> {
    let cancelled = state.runs.cancel();
    if !cancelled {
        tracing::debug!("没有正在进行的运行");
    }
    Json(CancelResponse { cancelled })
}

fn failure_status(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        PipelineError::EmptyContent => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Fetch(_) | PipelineError::Translation(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Cancelled => StatusCode::OK,
    }
}
