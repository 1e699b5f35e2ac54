use crate::error::ConfigError;
use crate::models::eval_case::EvalCase;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载评估用例
pub async fn load_eval_case(toml_file_path: &Path) -> Result<EvalCase, ConfigError> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| ConfigError::InvalidCaseFile {
            path: toml_file_path.display().to_string(),
            reason: format!("无法读取: {}", e),
        })?;

    let mut case: EvalCase = toml::from_str(&content).map_err(|e| ConfigError::InvalidCaseFile {
        path: toml_file_path.display().to_string(),
        reason: format!("无法解析: {}", e),
    })?;

    if case.expected.is_empty() {
        tracing::warn!(
            "用例 {} 的期望输出为空，所有迭代的匹配率都将为 0",
            case.name
        );
    }

    // 设置文件路径
    case.file_path = Some(toml_file_path.to_path_buf());

    Ok(case)
}
