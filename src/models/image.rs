use std::fmt;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 可接受的图片扩展名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageExtension {
    Png,
    Jpg,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Ppm,
}

impl ImageExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExtension::Png => "png",
            ImageExtension::Jpg => "jpg",
            ImageExtension::Jpeg => "jpeg",
            ImageExtension::Gif => "gif",
            ImageExtension::Bmp => "bmp",
            ImageExtension::Tiff => "tiff",
            ImageExtension::Ppm => "ppm",
        }
    }

    /// 解析扩展名（不含点号）
    pub fn parse(ext: &str) -> Result<Self, ConfigError> {
        match ext.to_lowercase().as_str() {
            "png" => Ok(ImageExtension::Png),
            "jpg" => Ok(ImageExtension::Jpg),
            "jpeg" => Ok(ImageExtension::Jpeg),
            "gif" => Ok(ImageExtension::Gif),
            "bmp" => Ok(ImageExtension::Bmp),
            "tiff" => Ok(ImageExtension::Tiff),
            "ppm" => Ok(ImageExtension::Ppm),
            _ => Err(ConfigError::InvalidExtension {
                ext: ext.to_string(),
            }),
        }
    }

    /// 取文件名最后一个点号之后的部分
    pub fn from_file_name(file_name: &str) -> Result<Self, ConfigError> {
        let ext = file_name.rsplit('.').next().unwrap_or_default();
        if ext == file_name {
            return Err(ConfigError::InvalidExtension { ext: String::new() });
        }
        Self::parse(ext)
    }

    /// 用于重新编码的图片格式
    pub fn image_format(&self) -> ImageFormat {
        match self {
            ImageExtension::Png => ImageFormat::Png,
            ImageExtension::Jpg | ImageExtension::Jpeg => ImageFormat::Jpeg,
            ImageExtension::Gif => ImageFormat::Gif,
            ImageExtension::Bmp => ImageFormat::Bmp,
            ImageExtension::Tiff => ImageFormat::Tiff,
            ImageExtension::Ppm => ImageFormat::Pnm,
        }
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 逆时针旋转角度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
    /// 360 度，等价于不旋转
    Full,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
            Rotation::Full => 360,
        }
    }

    /// 是否需要真正改动像素
    pub fn is_identity(&self) -> bool {
        matches!(self, Rotation::None | Rotation::Full)
    }
}

impl TryFrom<i64> for Rotation {
    type Error = ConfigError;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            360 => Ok(Rotation::Full),
            _ => Err(ConfigError::InvalidRotation { degrees }),
        }
    }
}

/// 上传的原始图片
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl ImageSource {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
        }
    }

    /// 从磁盘读取图片
    pub async fn read(path: &Path) -> Result<Self, ConfigError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ConfigError::ImageUnreadable {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self { bytes, file_name })
    }
}

/// base64 编码后的图片，可在多次请求中复用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub extension: ImageExtension,
    pub base64: String,
}

impl EncodedImage {
    pub fn encode(bytes: &[u8], extension: ImageExtension) -> Self {
        Self {
            extension,
            base64: general_purpose::STANDARD.encode(bytes),
        }
    }

    /// 内联图片引用
    pub fn data_url(&self) -> String {
        format!("data:image/{};base64,{}", self.extension, self.base64)
    }
}
