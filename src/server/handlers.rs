use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;

use crate::ai::{self, prompt};
use crate::error::ReviewError;
use crate::review::{self, ReviewReport, DEFAULT_SCHEMA};
use crate::server::AppState;

pub async fn health() -> &'static str {
    "ok"
}

/// POST /review：接收上传文件，调用上游模型，返回校验过的审查报告
pub async fn review(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ReviewReport>, ReviewError> {
    let (bytes, file_name) = read_upload(&mut multipart).await?;

    // 空文件与不可解码文件直接拒绝，不触发上游调用
    if bytes.is_empty() {
        return Err(ReviewError::EmptyFile);
    }
    let source = String::from_utf8(bytes).map_err(|_| ReviewError::Decode)?;
    if source.trim().is_empty() {
        return Err(ReviewError::EmptyFile);
    }

    tracing::info!(file = %file_name, bytes = source.len(), "reviewing uploaded file");

    let prompt = prompt::get_prompt(&source, &file_name);
    let raw = ai::generate_review(&state.client, &state.config, &prompt).await?;
    let report = review::parse_report(&raw, &DEFAULT_SCHEMA)?;

    tracing::info!(file = %file_name, "review completed");
    Ok(Json(report))
}

async fn read_upload(multipart: &mut Multipart) -> Result<(Vec<u8>, String), ReviewError> {
    // 只取第一个携带数据的字段，文件名仅用于展示和日志
    if let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ReviewError::invalid_upload(e.to_string()))?
    {
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ReviewError::invalid_upload(e.to_string()))?;
        return Ok((data.to_vec(), file_name));
    }
    Err(ReviewError::invalid_upload(
        "multipart request contained no file field",
    ))
}
