//! 性能追踪器
//!
//! 每次评估运行独占一个 `PerformanceState`，逐次累计比较结果并按需生成汇总

use serde::Serialize;

use crate::models::{ExtractedFields, FieldMapping};
use crate::services::field_comparator;

/// 一次评估运行的累计状态
///
/// 不变量：
/// - `match_percentages.len() == total_iterations`
/// - `exact_matches <= total_iterations`
/// - `partial_matches` 中每一项都对应一个严格介于 0 和 100 之间的百分比
#[derive(Debug, Clone, Default)]
pub struct PerformanceState {
    total_iterations: usize,
    exact_matches: usize,
    partial_matches: Vec<ExtractedFields>,
    match_percentages: Vec<f64>,
}

impl PerformanceState {
    pub fn total_iterations(&self) -> usize {
        self.total_iterations
    }

    pub fn exact_matches(&self) -> usize {
        self.exact_matches
    }

    /// 部分匹配的抽取结果（仅供诊断）
    pub fn partial_matches(&self) -> &[ExtractedFields] {
        &self.partial_matches
    }

    pub fn match_percentages(&self) -> &[f64] {
        &self.match_percentages
    }

    /// 记录一次比较结果
    fn record(&mut self, match_percentage: f64, extracted: ExtractedFields) {
        self.total_iterations += 1;
        self.match_percentages.push(match_percentage);

        if match_percentage == 100.0 {
            self.exact_matches += 1;
        }

        if match_percentage > 0.0 && match_percentage < 100.0 {
            self.partial_matches.push(extracted);
        }
    }

    /// 生成只读汇总，无迭代时各比率为 0
    pub fn summarize(&self) -> PerformanceSummary {
        let (average, std_dev) = mean_and_std_dev(&self.match_percentages);
        let exact_match_rate = if self.total_iterations > 0 {
            (self.exact_matches as f64 / self.total_iterations as f64) * 100.0
        } else {
            0.0
        };

        PerformanceSummary {
            total_iterations: self.total_iterations,
            exact_matches: self.exact_matches,
            partial_match_count: self.partial_matches.len(),
            exact_match_rate,
            average_match_percentage: average,
            match_percentage_std_dev: std_dev,
        }
    }
}

/// 性能汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_iterations: usize,
    pub exact_matches: usize,
    pub partial_match_count: usize,
    /// 完全匹配的迭代占比 (0..=100)
    pub exact_match_rate: f64,
    /// 所有匹配百分比的算术平均
    pub average_match_percentage: f64,
    /// 总体标准差
    pub match_percentage_std_dev: f64,
}

/// 性能追踪器：期望输出 + 运行状态
#[derive(Debug, Clone)]
pub struct PerformanceTracker {
    expected: FieldMapping,
    state: PerformanceState,
}

impl PerformanceTracker {
    pub fn new(expected: FieldMapping) -> Self {
        Self {
            expected,
            state: PerformanceState::default(),
        }
    }

    pub fn state(&self) -> &PerformanceState {
        &self.state
    }

    /// 比较一次抽取结果并累计，返回本次匹配百分比
    pub fn track(&mut self, extracted: ExtractedFields) -> f64 {
        let match_percentage = field_comparator::compare(&self.expected, &extracted);
        self.state.record(match_percentage, extracted);
        match_percentage
    }

    pub fn summarize(&self) -> PerformanceSummary {
        self.state.summarize()
    }
}

fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
