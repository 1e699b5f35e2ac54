use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 视觉模型配置 ---
    pub api_key: String,
    pub api_base_url: String,
    pub model_name: String,
    /// 单次请求的最大 token 数
    pub max_tokens: u32,
    /// 采样温度，None 表示使用服务端默认值
    pub temperature: Option<f32>,
    // --- 抽取重试 ---
    /// 每次抽取的最大尝试次数
    pub max_attempts: usize,
    /// 两次尝试之间的等待时间（毫秒）
    pub retry_delay_ms: u64,
    /// 单次模型调用超时（秒）
    pub request_timeout_secs: u64,
    // --- 评估 ---
    /// 图片大小上限（字节）
    pub max_image_bytes: usize,
    /// 单次评估允许的最大迭代次数
    pub max_iterations: usize,
    /// 同时进行中的抽取调用数量
    pub eval_concurrency: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://api.fireworks.ai/inference/v1".to_string(),
            model_name: "accounts/fireworks/models/phi-3-vision-128k-instruct".to_string(),
            max_tokens: 1024,
            temperature: None,
            max_attempts: 5,
            retry_delay_ms: 0,
            request_timeout_secs: 60,
            max_image_bytes: 5 * 1024 * 1024,
            max_iterations: 100,
            eval_concurrency: 1,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，无法解析的值回退到默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        Self {
            api_key: lookup("KYC_API_KEY")
                .or_else(|| lookup("FIREWORKS_API_KEY"))
                .unwrap_or(default.api_key),
            api_base_url: lookup("KYC_API_BASE_URL").unwrap_or(default.api_base_url),
            model_name: lookup("KYC_MODEL_NAME").unwrap_or(default.model_name),
            max_tokens: parse_or(&lookup, "KYC_MAX_TOKENS", default.max_tokens),
            temperature: parse_opt(&lookup, "KYC_TEMPERATURE").or(default.temperature),
            max_attempts: parse_or(&lookup, "KYC_MAX_ATTEMPTS", default.max_attempts),
            retry_delay_ms: parse_or(&lookup, "KYC_RETRY_DELAY_MS", default.retry_delay_ms),
            request_timeout_secs: parse_or(
                &lookup,
                "KYC_REQUEST_TIMEOUT_SECS",
                default.request_timeout_secs,
            ),
            max_image_bytes: parse_or(&lookup, "KYC_MAX_IMAGE_BYTES", default.max_image_bytes),
            max_iterations: parse_or(&lookup, "KYC_MAX_ITERATIONS", default.max_iterations),
            eval_concurrency: parse_or(&lookup, "KYC_EVAL_CONCURRENCY", default.eval_concurrency),
            verbose_logging: parse_or(&lookup, "VERBOSE_LOGGING", default.verbose_logging),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "max_attempts",
                reason: "至少需要 1 次尝试".to_string(),
            });
        }
        if self.eval_concurrency == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "eval_concurrency",
                reason: "并发数必须大于 0".to_string(),
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "max_iterations",
                reason: "迭代上限必须大于 0".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "request_timeout_secs",
                reason: "超时时间必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 调用模型之前要求密钥存在
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.api_key.trim().is_empty() {
            Err(ConfigError::MissingApiKey)
        } else {
            Ok(&self.api_key)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn parse_opt<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            let err = ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value: raw,
                expected_type: std::any::type_name::<T>().to_string(),
            };
            warn!("{}，使用默认值", err);
            None
        }
    }
}

fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    parse_opt(lookup, name).unwrap_or(default)
}
