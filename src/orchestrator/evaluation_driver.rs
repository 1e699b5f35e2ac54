//! 评估驱动 - 编排层
//!
//! 状态机：`Idle → Running(i = 1..N) → Completed | Aborted | Cancelled`
//!
//! 同一张图片被重复提交 N 次，用于衡量模型在相同输入上的输出波动。
//! `eval_concurrency` 大于 1 时允许多个调用同时进行，但结果仍按迭代顺序交给追踪器，
//! 追踪器始终只有一个所有者。

use std::pin::pin;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, ConfigError};
use crate::models::{DocumentType, EncodedImage, FieldMapping};
use crate::orchestrator::cancellation::CancellationToken;
use crate::orchestrator::report::EvaluationReport;
use crate::services::{
    prompts, ExtractionPrompt, ExtractionService, PerformanceSummary, PerformanceTracker,
};
use crate::utils::logging::{log_evaluation_start, log_iteration, log_summary};

/// 评估运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running { iteration: usize },
    Completed,
    Aborted { iteration: usize },
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Aborted { .. } | RunState::Cancelled
        )
    }
}

/// 评估任务：期望输出 + 图片 + 提示词 + 迭代次数
#[derive(Debug, Clone)]
pub struct EvaluationJob {
    pub case_name: Option<String>,
    pub expected: FieldMapping,
    pub image: EncodedImage,
    pub document: DocumentType,
    pub prompt: ExtractionPrompt,
    pub iterations: usize,
}

impl EvaluationJob {
    /// 使用该证件类型的标准抽取提示词
    pub fn new(
        expected: FieldMapping,
        image: EncodedImage,
        document: DocumentType,
        iterations: usize,
    ) -> Self {
        Self {
            case_name: None,
            expected,
            image,
            document,
            prompt: prompts::extraction_prompt(document),
            iterations,
        }
    }

    pub fn with_case_name(mut self, name: impl Into<String>) -> Self {
        self.case_name = Some(name.into());
        self
    }
}

/// 一次评估运行：任务 + 追踪器 + 状态
///
/// 只能被驱动一次；中止后不可恢复
#[derive(Debug)]
pub struct EvaluationRun {
    job: EvaluationJob,
    tracker: PerformanceTracker,
    state: RunState,
}

impl EvaluationRun {
    pub fn new(job: EvaluationJob) -> Self {
        let tracker = PerformanceTracker::new(job.expected.clone());
        Self {
            job,
            tracker,
            state: RunState::Idle,
        }
    }

    pub fn job(&self) -> &EvaluationJob {
        &self.job
    }

    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    pub fn state(&self) -> RunState {
        self.state
    }
}

/// 评估驱动
pub struct EvaluationDriver {
    extraction: ExtractionService,
    max_iterations: usize,
    concurrency: usize,
}

impl EvaluationDriver {
    pub fn new(extraction: ExtractionService, config: &Config) -> Self {
        Self {
            extraction,
            max_iterations: config.max_iterations,
            concurrency: config.eval_concurrency.max(1),
        }
    }

    /// 执行完整评估并生成报告
    pub async fn run(
        &self,
        job: EvaluationJob,
        cancel: &CancellationToken,
    ) -> Result<EvaluationReport, AppError> {
        let started_at = chrono::Local::now();
        let mut run = EvaluationRun::new(job);
        let summary = self.drive(&mut run, cancel).await?;

        Ok(EvaluationReport {
            case_name: run.job.case_name.clone(),
            model: self.extraction.model_name().to_string(),
            document: run.job.document,
            iterations: run.job.iterations,
            started_at: started_at.to_rfc3339(),
            finished_at: chrono::Local::now().to_rfc3339(),
            summary,
        })
    }

    /// 驱动一次运行直到完成、中止或取消
    ///
    /// 失败时运行对象保留中止时的追踪状态，便于诊断
    pub async fn drive(
        &self,
        run: &mut EvaluationRun,
        cancel: &CancellationToken,
    ) -> Result<PerformanceSummary, AppError> {
        let EvaluationRun {
            job,
            tracker,
            state,
        } = run;

        if *state != RunState::Idle {
            return Err(ConfigError::InvalidSetting {
                name: "run_state",
                reason: format!("评估运行只能执行一次，当前状态: {:?}", state),
            }
            .into());
        }

        let total = job.iterations;
        if total == 0 || total > self.max_iterations {
            return Err(ConfigError::InvalidIterationCount {
                count: total,
                max: self.max_iterations,
            }
            .into());
        }

        log_evaluation_start(self.extraction.model_name(), total, self.concurrency);

        let job: &EvaluationJob = job;
        let extraction = &self.extraction;
        let mut results = pin!(stream::iter(1..=total)
            .map(move |iteration| async move {
                let result = extraction.extract(&job.image, &job.prompt, None).await;
                (iteration, result)
            })
            .buffered(self.concurrency));

        *state = RunState::Running { iteration: 1 };
        debug!("评估状态: {:?}", state);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let completed = tracker.state().total_iterations();
                    *state = RunState::Cancelled;
                    warn!("⚠️ 评估已取消，已完成 {}/{} 次迭代", completed, total);
                    return Err(AppError::Cancelled { completed });
                }
                next = results.next() => next,
            };

            let Some((iteration, result)) = next else {
                break;
            };
            *state = RunState::Running { iteration };

            match result {
                Ok(fields) => {
                    let match_percentage = tracker.track(fields);
                    log_iteration(iteration, total, match_percentage);
                }
                Err(failure) => {
                    let completed = tracker.state().total_iterations();
                    *state = RunState::Aborted { iteration };
                    error!(
                        "❌ 第 {}/{} 次迭代抽取彻底失败，评估中止: {}",
                        iteration, total, failure
                    );
                    return Err(AppError::Aborted {
                        iteration,
                        completed,
                        source: failure,
                    });
                }
            }
        }

        *state = RunState::Completed;
        let summary = tracker.summarize();
        log_summary(&summary);
        info!("✓ 评估完成");

        Ok(summary)
    }
}
