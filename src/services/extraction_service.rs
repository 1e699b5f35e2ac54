//! 字段抽取服务 - 业务能力层
//!
//! 只负责"图片 + 提示词 → 字段"的能力：调用模型、宽松解析、按需校验文档类型。
//! 任何一次尝试失败（调用失败、超时、无法解析、文档类型不符）都计入同一个重试预算，
//! 预算耗尽后返回 `ExtractionFailure`。

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AttemptError, ExtractionFailure};
use crate::infrastructure::{VisionModel, VisionRequest};
use crate::models::{value_text, DocumentType, EncodedImage, ExtractedFields};
use crate::services::field_parser::parse_field_text;
use crate::utils::logging::truncate_text;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（至少 1 次）
    pub max_attempts: usize,
    /// 两次尝试之间的固定等待
    pub retry_delay: Duration,
    /// 单次模型调用超时
    pub request_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay: config.retry_delay(),
            request_timeout: config.request_timeout(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 抽取提示词（对本服务不透明）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPrompt {
    pub system: String,
    pub user: String,
}

/// 字段抽取服务
///
/// 职责：
/// - 对单张图片执行带重试的抽取
/// - 不认识期望输出
/// - 不做统计
#[derive(Clone)]
pub struct ExtractionService {
    model: Arc<dyn VisionModel>,
    policy: RetryPolicy,
}

impl ExtractionService {
    pub fn new(model: Arc<dyn VisionModel>, policy: RetryPolicy) -> Self {
        Self { model, policy }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 抽取字段
    ///
    /// # 参数
    /// - `image`: 已编码的图片
    /// - `prompt`: 系统/用户提示词
    /// - `expected_document_types`: 可接受的 `document_type` 标签；
    ///   解析成功但标签不在其中的结果会被重新采样
    ///
    /// # 返回
    /// 成功时返回解析后的结构；预算耗尽时返回最后一次错误和尝试次数
    pub async fn extract(
        &self,
        image: &EncodedImage,
        prompt: &ExtractionPrompt,
        expected_document_types: Option<&[DocumentType]>,
    ) -> Result<ExtractedFields, ExtractionFailure> {
        let request = VisionRequest {
            system_prompt: prompt.system.clone(),
            user_prompt: prompt.user.clone(),
            image_data_url: image.data_url(),
        };
        let max_attempts = self.policy.max_attempts.max(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(&request, expected_document_types).await {
                Ok(fields) => {
                    debug!("抽取成功 (第 {}/{} 次尝试)", attempt, max_attempts);
                    return Ok(fields);
                }
                Err(last) if attempt >= max_attempts => {
                    warn!("抽取失败，已用尽 {} 次尝试: {}", attempt, last);
                    return Err(ExtractionFailure {
                        attempts: attempt,
                        last,
                    });
                }
                Err(e) => {
                    warn!("抽取尝试失败 ({}/{}): {}", attempt, max_attempts, e);
                    if !self.policy.retry_delay.is_zero() {
                        sleep(self.policy.retry_delay).await;
                    }
                }
            }
        }
    }

    /// 单次尝试
    async fn attempt(
        &self,
        request: &VisionRequest,
        expected_document_types: Option<&[DocumentType]>,
    ) -> Result<ExtractedFields, AttemptError> {
        let raw = match timeout(self.policy.request_timeout, self.model.complete(request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AttemptError::Timeout {
                    timeout: self.policy.request_timeout,
                })
            }
        };

        debug!("模型原始响应: {}", truncate_text(&raw, 500));

        let fields = parse_field_text(&raw)?;

        if let Some(expected) = expected_document_types {
            check_document_type(&fields, expected)?;
        }

        Ok(fields)
    }
}

/// 校验 `document_type` 是否在可接受范围内
fn check_document_type(fields: &JsonValue, expected: &[DocumentType]) -> Result<(), AttemptError> {
    let found = fields.get("document_type");
    let accepted = found
        .and_then(JsonValue::as_str)
        .and_then(DocumentType::from_label)
        .is_some_and(|doc| expected.contains(&doc));

    if accepted {
        Ok(())
    } else {
        Err(AttemptError::DocumentTypeMismatch {
            found: found.map(value_text),
            expected: expected.iter().map(|d| d.label().to_string()).collect(),
        })
    }
}
