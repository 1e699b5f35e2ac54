//! KYC 文档处理流程 - 流程层
//!
//! 核心职责：定义"一张证件"的完整处理流程
//!
//! 流程顺序：
//! 1. 分类（护照 / 驾照），标签不符时由抽取服务重新采样
//! 2. 按分类结果选择提示词抽取字段

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::info;

use crate::error::ExtractionFailure;
use crate::models::{value_text, DocumentType, EncodedImage, ExtractedFields};
use crate::services::{prompts, ExtractionService};

/// 分类结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub document_type: DocumentType,
    /// 驾照签发州（护照为空）
    pub state: Option<String>,
    /// 模型原始输出
    pub raw: JsonValue,
}

impl Classification {
    /// 从模型输出构建分类结果
    ///
    /// 非护照标签一律按驾照处理
    pub fn from_fields(raw: JsonValue) -> Self {
        let document_type = raw
            .get("document_type")
            .and_then(JsonValue::as_str)
            .and_then(DocumentType::from_label)
            .unwrap_or(DocumentType::DriversLicence);

        let state = raw
            .get("state")
            .filter(|v| !v.is_null())
            .map(value_text)
            .filter(|s| !s.trim().is_empty() && !s.eq_ignore_ascii_case("none"));

        Self {
            document_type,
            state,
            raw,
        }
    }
}

/// 一张证件的处理结果
#[derive(Debug, Clone, Serialize)]
pub struct KycResult {
    pub classification: Classification,
    pub fields: ExtractedFields,
}

/// KYC 文档处理流程
///
/// - 编排分类与字段抽取
/// - 不持有任何资源
/// - 只依赖抽取服务
pub struct KycFlow {
    extraction: ExtractionService,
}

impl KycFlow {
    pub fn new(extraction: ExtractionService) -> Self {
        Self { extraction }
    }

    /// 判断证件类型
    pub async fn classify(&self, image: &EncodedImage) -> Result<Classification, ExtractionFailure> {
        info!("🔍 正在判断证件类型...");
        let raw = self
            .extraction
            .extract(image, &prompts::classification_prompt(), Some(&DocumentType::ALL))
            .await?;

        let classification = Classification::from_fields(raw);
        info!(
            "✓ 证件类型: {} (州: {})",
            classification.document_type,
            classification.state.as_deref().unwrap_or("-")
        );
        Ok(classification)
    }

    /// 按证件类型抽取字段
    pub async fn extract_fields(
        &self,
        image: &EncodedImage,
        document: DocumentType,
    ) -> Result<ExtractedFields, ExtractionFailure> {
        info!("📄 正在抽取{}字段...", document);
        self.extraction
            .extract(image, &prompts::extraction_prompt(document), None)
            .await
    }

    /// 分类 → 抽取
    pub async fn run(&self, image: &EncodedImage) -> Result<KycResult, ExtractionFailure> {
        let classification = self.classify(image).await?;
        let fields = self
            .extract_fields(image, classification.document_type)
            .await?;
        info!("✓ 字段抽取完成");

        Ok(KycResult {
            classification,
            fields,
        })
    }
}
