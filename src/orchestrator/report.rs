use serde::Serialize;

use crate::models::DocumentType;
use crate::services::PerformanceSummary;

/// 一次评估运行的报告
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    pub model: String,
    pub document: DocumentType,
    pub iterations: usize,
    /// RFC 3339
    pub started_at: String,
    pub finished_at: String,
    pub summary: PerformanceSummary,
}

impl EvaluationReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
