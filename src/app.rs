//! 应用入口
//!
//! 持有配置和模型客户端，向命令行暴露"分类"与"评估"两种模式

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::infrastructure::{OpenAiVisionModel, VisionModel};
use crate::models::{load_eval_case, DocumentType, EvalCase, FieldMapping, ImageSource};
use crate::orchestrator::{CancellationToken, EvaluationDriver, EvaluationJob, EvaluationReport};
use crate::services::{ExtractionService, ImageService, RetryPolicy};
use crate::workflow::{KycFlow, KycResult};

/// 一次评估请求
#[derive(Debug, Clone)]
pub struct EvaluateRequest {
    pub case_name: Option<String>,
    pub image: ImageSource,
    pub rotation: i64,
    pub expected: FieldMapping,
    pub document: DocumentType,
    pub iterations: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
    image_service: ImageService,
    extraction: ExtractionService,
}

impl App {
    /// 使用托管视觉模型初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.require_api_key()?;
        let model = Arc::new(OpenAiVisionModel::new(&config));
        Self::with_model(config, model)
    }

    /// 使用任意模型实现初始化应用
    pub fn with_model(config: Config, model: Arc<dyn VisionModel>) -> AppResult<Self> {
        config.validate()?;

        let extraction = ExtractionService::new(model, RetryPolicy::from_config(&config));
        let policy = extraction.policy();
        info!(
            "🤖 模型: {} (最多尝试 {} 次, 超时 {:?})",
            extraction.model_name(),
            policy.max_attempts,
            policy.request_timeout
        );

        Ok(Self {
            image_service: ImageService::new(config.max_image_bytes),
            extraction,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 分类并抽取一张证件
    pub async fn classify(&self, image: &ImageSource, rotation: i64) -> AppResult<KycResult> {
        let encoded = self.image_service.prepare(image, rotation)?;
        let flow = KycFlow::new(self.extraction.clone());
        Ok(flow.run(&encoded).await?)
    }

    /// 评估模式：对同一张图片重复抽取并汇总
    ///
    /// 所有配置错误都在第一次模型调用之前报告
    pub async fn evaluate(
        &self,
        request: EvaluateRequest,
        cancel: &CancellationToken,
    ) -> AppResult<EvaluationReport> {
        if request.iterations == 0 || request.iterations > self.config.max_iterations {
            return Err(ConfigError::InvalidIterationCount {
                count: request.iterations,
                max: self.config.max_iterations,
            }
            .into());
        }

        let encoded = self.image_service.prepare(&request.image, request.rotation)?;

        let mut job = EvaluationJob::new(
            request.expected,
            encoded,
            request.document,
            request.iterations,
        );
        if let Some(name) = request.case_name {
            job = job.with_case_name(name);
        }

        let driver = EvaluationDriver::new(self.extraction.clone(), &self.config);
        driver.run(job, cancel).await
    }

    /// 按 TOML 用例文件执行评估
    pub async fn evaluate_case_file(
        &self,
        case_path: &std::path::Path,
        cancel: &CancellationToken,
    ) -> AppResult<EvaluationReport> {
        let case = load_eval_case(case_path).await?;
        self.evaluate_case(case, cancel).await
    }

    /// 按已加载的用例执行评估
    pub async fn evaluate_case(
        &self,
        case: EvalCase,
        cancel: &CancellationToken,
    ) -> AppResult<EvaluationReport> {
        info!("📁 评估用例: {}", case.name);
        let image = ImageSource::read(&case.image_path()).await?;
        self.evaluate(
            EvaluateRequest {
                case_name: Some(case.name),
                image,
                rotation: case.rotation,
                expected: case.expected,
                document: case.document,
                iterations: case.iterations,
            },
            cancel,
        )
        .await
    }
}
