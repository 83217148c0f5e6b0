use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// 审查服务错误类型
///
/// 客户端输入错误映射为 4xx，上游依赖错误映射为 5xx。
#[derive(Error, Debug, Clone)]
pub enum ReviewError {
    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("uploaded file is not valid UTF-8 text")]
    Decode,

    #[error("invalid upload: {message}")]
    InvalidUpload { message: String },

    #[error("upstream AI service error: {message}")]
    Upstream {
        message: String,
        status: Option<u16>,
    },

    #[error("AI response could not be parsed into a review report: {message}")]
    MalformedResponse { message: String },
}

impl ReviewError {
    /// 创建上游传输/状态错误
    pub fn upstream(message: impl Into<String>, status: Option<u16>) -> Self {
        ReviewError::Upstream {
            message: message.into(),
            status,
        }
    }

    /// 创建响应格式错误
    pub fn malformed(message: impl Into<String>) -> Self {
        ReviewError::MalformedResponse {
            message: message.into(),
        }
    }

    /// 创建上传格式错误
    pub fn invalid_upload(message: impl Into<String>) -> Self {
        ReviewError::InvalidUpload {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ReviewError::EmptyFile => StatusCode::BAD_REQUEST,
            ReviewError::Decode => StatusCode::BAD_REQUEST,
            ReviewError::InvalidUpload { .. } => StatusCode::BAD_REQUEST,
            ReviewError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ReviewError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// 错误是否由客户端输入引起
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "review request failed");
        } else {
            tracing::warn!(%status, error = %self, "review request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
