use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{value_text, DocumentType, FieldMapping};

/// 评估用例：一张图片 + 期望输出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    pub name: String,
    /// 图片路径（相对路径以用例文件所在目录为基准）
    pub image: PathBuf,
    #[serde(default)]
    pub rotation: i64,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_document")]
    pub document: DocumentType,
    /// 非字符串值按与命令行期望输出相同的规则转为字符串
    #[serde(deserialize_with = "deserialize_expected")]
    pub expected: FieldMapping,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<PathBuf>,
}

fn deserialize_expected<'de, D>(deserializer: D) -> Result<FieldMapping, D::Error>
where
    D: Deserializer<'de>,
{
    let table = toml::Table::deserialize(deserializer)?;
    table
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Datetime(d) => d.to_string(),
                other => value_text(&serde_json::to_value(other).map_err(D::Error::custom)?),
            };
            Ok((key, text))
        })
        .collect()
}

fn default_iterations() -> usize {
    10
}

fn default_document() -> DocumentType {
    DocumentType::Passport
}

impl EvalCase {
    /// 解析后的图片路径
    pub fn image_path(&self) -> PathBuf {
        if self.image.is_absolute() {
            return self.image.clone();
        }
        match self.file_path.as_deref().and_then(Path::parent) {
            Some(dir) => dir.join(&self.image),
            None => self.image.clone(),
        }
    }
}
