use serde::{Deserialize, Serialize};
use std::fmt;

/// 身份证明文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    DriversLicence,
}

impl DocumentType {
    pub const ALL: [DocumentType; 2] = [DocumentType::Passport, DocumentType::DriversLicence];

    /// 模型使用的分类标签
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Passport => "passport",
            DocumentType::DriversLicence => "drivers_licence",
        }
    }

    /// 从模型返回的标签解析文件类型
    ///
    /// 忽略大小写，接受 licence/license 两种拼写以及 "driver's licence" 写法
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '\'' | '’'))
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "passport" => Some(DocumentType::Passport),
            "drivers_licence" | "drivers_license" | "driver_licence" | "driver_license" => {
                Some(DocumentType::DriversLicence)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
