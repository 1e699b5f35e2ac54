//! # KYC Document Eval
//!
//! 使用托管视觉模型对身份证件（护照 / 驾照）进行分类和字段抽取，
//! 并提供评估模式：对同一张证件反复抽取，与期望输出比较，估计模型的准确率与稳定性。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有模型客户端，只暴露"图片 + 提示词 → 文本"能力
//!
//! ### ② 业务能力层（Services）
//! - `FieldComparator` - 期望字段 vs 抽取结果 → 匹配百分比
//! - `PerformanceTracker` - 逐次累计并生成汇总
//! - `ExtractionService` - 带重试的抽取与宽松解析
//! - `ImageService` - 扩展名/大小校验、旋转、编码
//!
//! ### ③ 流程层（Workflow）
//! - `KycFlow` - 分类 → 按类型抽取
//!
//! ### ④ 编排层（Orchestration）
//! - `EvaluationDriver` - N 次迭代，失败即中止，支持取消
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::{App, EvaluateRequest};
pub use config::Config;
pub use error::{AppError, AppResult, AttemptError, ConfigError, ExtractionFailure};
pub use infrastructure::{OpenAiVisionModel, VisionModel, VisionRequest};
pub use models::{DocumentType, EncodedImage, FieldMapping, ImageSource};
pub use orchestrator::{CancellationSource, CancellationToken, EvaluationDriver, EvaluationReport};
pub use services::{PerformanceSummary, PerformanceTracker};
pub use workflow::{KycFlow, KycResult};
