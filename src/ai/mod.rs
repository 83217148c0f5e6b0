use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ReviewError;

pub mod prompt;

#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
}

#[derive(Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize)]
pub struct ChatResponseMessage {
    pub content: String,
}

#[derive(Serialize)]
pub struct OllamaRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

#[derive(Deserialize)]
pub struct OllamaResponse {
    pub response: String,
}

async fn make_request<T: Serialize>(
    client: &Client,
    url: &str,
    api_key: Option<&String>,
    request: &T,
) -> Result<reqwest::Response, ReviewError> {
    let mut builder = client.post(url);
    if let Some(key) = api_key {
        builder = builder.bearer_auth(key);
    }
    builder
        .json(request)
        .send()
        .await
        .map_err(|e| ReviewError::upstream(format!("请求失败: {e}"), None))
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ReviewError> {
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        tracing::error!(%status, body = %text, "upstream returned error status");
        return Err(ReviewError::upstream(
            format!("状态码 {status}, 响应体: {text}"),
            Some(status.as_u16()),
        ));
    }
    Ok(res)
}

/// 调用上游模型生成审查文本
///
/// 单次同步调用，不做重试；超时由 `client` 上的请求超时控制，
/// 超时与网络错误一律归为 `Upstream`。
pub async fn generate_review(
    client: &Client,
    config: &Config,
    prompt: &str,
) -> Result<String, ReviewError> {
    match config.provider.as_str() {
        "siliconflow" | "deepseek" => {
            let request = ChatRequest {
                model: &config.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                stream: false,
            };
            let (url, api_key) = if config.provider == "siliconflow" {
                (
                    &config.siliconflow_url,
                    config.siliconflow_api_key.as_ref(),
                )
            } else {
                (&config.deepseek_url, config.deepseek_api_key.as_ref())
            };
            let res = make_request(client, url, api_key, &request).await?;
            let res = check_status(res).await?;

            let body: ChatResponse = res
                .json()
                .await
                .map_err(|e| ReviewError::upstream(format!("响应解析失败: {e}"), None))?;
            let content = body
                .choices
                .first()
                .map(|c| c.message.content.clone())
                .ok_or_else(|| ReviewError::upstream("响应中没有 choices", None))?;
            Ok(content)
        }
        _ => {
            let request = OllamaRequest {
                model: &config.model,
                prompt,
                stream: false,
            };
            let res = make_request(client, &config.ollama_url, None, &request).await?;
            let res = check_status(res).await?;

            let body: OllamaResponse = res
                .json()
                .await
                .map_err(|e| ReviewError::upstream(format!("响应解析失败: {e}"), None))?;
            Ok(body.response)
        }
    }
}
