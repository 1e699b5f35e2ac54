use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::ModelError;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（在任何外部调用之前报告，不重试）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 抽取失败（重试次数耗尽）
    #[error("抽取失败: {0}")]
    Extraction(#[from] ExtractionFailure),

    /// 评估在第 `iteration` 次迭代时中止
    #[error("评估在第 {iteration} 次迭代中止 (已完成 {completed} 次): {source}")]
    Aborted {
        iteration: usize,
        completed: usize,
        #[source]
        source: ExtractionFailure,
    },

    /// 评估被取消
    #[error("评估已取消 (已完成 {completed} 次)")]
    Cancelled { completed: usize },

    /// 图片解码/编码失败
    #[error("图片处理失败: {0}")]
    Image(#[from] image::ImageError),

    /// 文件读写失败
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("不支持的图片扩展名 '{ext}'，可接受的类型: png, jpg, jpeg, gif, bmp, tiff, ppm")]
    InvalidExtension { ext: String },

    #[error("无效的旋转角度 {degrees}，可选值: 0, 90, 180, 270, 360")]
    InvalidRotation { degrees: i64 },

    #[error("无效的迭代次数 {count}，必须在 1..={max} 之间")]
    InvalidIterationCount { count: usize, max: usize },

    #[error("图片过大: {size} 字节 (上限 {max} 字节)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("无法读取图片 {path}: {source}")]
    ImageUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("期望输出无效: {0}")]
    InvalidExpectedOutput(#[source] FieldParseError),

    #[error("期望输出必须是键值映射，实际为 {found}")]
    ExpectedOutputNotMapping { found: String },

    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    #[error("配置项 {name} 无效: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("缺少 API 密钥 (请设置 KYC_API_KEY 或 FIREWORKS_API_KEY)")]
    MissingApiKey,

    #[error("评估用例文件无效 ({path}): {reason}")]
    InvalidCaseFile { path: String, reason: String },
}

/// 模型文本解析失败
#[derive(Debug, Error)]
pub enum FieldParseError {
    #[error("响应为空")]
    Empty,

    #[error("无法解析为 JSON: {source} (文本: {text})")]
    Json {
        text: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 单次尝试失败（会被静默重试）
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("模型调用失败: {0}")]
    Model(#[from] ModelError),

    #[error("模型调用超时 ({timeout:?})")]
    Timeout { timeout: Duration },

    #[error("响应解析失败: {0}")]
    Parse(#[from] FieldParseError),

    #[error("文档类型 {found:?} 不在期望范围 {expected:?} 内")]
    DocumentTypeMismatch {
        found: Option<String>,
        expected: Vec<String>,
    },
}

/// 重试次数耗尽后的最终失败
#[derive(Debug, Error)]
#[error("已尝试 {attempts} 次，最后一次错误: {last}")]
pub struct ExtractionFailure {
    pub attempts: usize,
    #[source]
    pub last: AttemptError,
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
