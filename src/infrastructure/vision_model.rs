//! 视觉模型客户端 - 基础设施层
//!
//! 持有唯一的模型客户端资源，只暴露"图片 + 提示词 → 文本"的能力
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Fireworks 等）

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// 模型调用错误
#[derive(Debug, Error)]
pub enum ModelError {
    /// 构建请求失败
    #[error("构建请求失败: {0}")]
    Request(#[source] OpenAIError),

    /// API 调用失败
    #[error("API 调用失败 (模型: {model}): {source}")]
    Api {
        model: String,
        #[source]
        source: OpenAIError,
    },

    /// 返回内容为空
    #[error("模型返回内容为空 (模型: {model})")]
    EmptyContent { model: String },

    /// 其他实现（如测试桩）报告的失败
    #[error("{0}")]
    Other(String),
}

/// 一次视觉模型请求
///
/// 系统消息为纯文本，用户消息包含文本提示词和一张内联图片
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// `data:image/<ext>;base64,<data>`
    pub image_data_url: String,
}

/// 视觉模型能力
///
/// 职责：
/// - 发送一次请求并返回原始文本
/// - 不解析文本
/// - 不重试
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// 模型名称（仅用于日志和报告）
    fn model_name(&self) -> &str;

    /// 发送请求，返回模型原始文本
    async fn complete(&self, request: &VisionRequest) -> Result<String, ModelError>;
}

/// 基于 async-openai 的视觉模型客户端
pub struct OpenAiVisionModel {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl OpenAiVisionModel {
    /// 创建新的视觉模型客户端
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.model_name.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    fn build_messages(
        &self,
        request: &VisionRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_prompt.as_str())
            .build()?;

        // 文本部分 + 图片部分
        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: request.user_prompt.clone(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: request.image_data_url.clone(),
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()?;

        Ok(vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ])
    }
}

#[async_trait]
impl VisionModel for OpenAiVisionModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: &VisionRequest) -> Result<String, ModelError> {
        debug!("调用视觉模型 API，模型: {}", self.model_name);
        debug!("用户提示词长度: {} 字符", request.user_prompt.len());

        let messages = self.build_messages(request).map_err(ModelError::Request)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model_name)
            .messages(messages)
            .max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let chat_request = builder.build().map_err(ModelError::Request)?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| {
                warn!("视觉模型 API 调用失败: {}", e);
                ModelError::Api {
                    model: self.model_name.clone(),
                    source: e,
                }
            })?;

        debug!("视觉模型 API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ModelError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}
