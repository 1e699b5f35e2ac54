//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `evaluation_driver` - 评估驱动
//! - 校验迭代次数
//! - 对同一张图片重复抽取 N 次
//! - 将每次结果交给性能追踪器
//! - 任意一次抽取彻底失败即中止整个评估，不返回部分汇总
//!
//! ### `cancellation` - 协作式取消
//!
//! ### `report` - 评估报告
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::EvaluationDriver (N 次迭代)
//!     ↓
//! services::ExtractionService (单次抽取 + 重试)   services::PerformanceTracker (累计)
//!     ↓
//! infrastructure::VisionModel (模型调用)
//! ```

pub mod cancellation;
pub mod evaluation_driver;
pub mod report;

pub use cancellation::{CancellationSource, CancellationToken};
pub use evaluation_driver::{EvaluationDriver, EvaluationJob, EvaluationRun, RunState};
pub use report::EvaluationReport;
