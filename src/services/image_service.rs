//! 图片准备服务
//!
//! 上传图片 → 校验扩展名与大小 → （可选）旋转 → base64 编码

use std::io::Cursor;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::{AppError, ConfigError};
use crate::models::{EncodedImage, ImageExtension, ImageSource, Rotation};

/// 图片准备服务
pub struct ImageService {
    max_image_bytes: usize,
}

impl ImageService {
    pub fn new(max_image_bytes: usize) -> Self {
        Self { max_image_bytes }
    }

    /// 准备一张可直接发送给模型的图片
    ///
    /// 扩展名无效或图片过大时返回配置错误；旋转角度无效时只记录警告并使用原图
    pub fn prepare(&self, source: &ImageSource, degrees: i64) -> Result<EncodedImage, AppError> {
        let extension = ImageExtension::from_file_name(&source.file_name)?;

        if source.bytes.len() > self.max_image_bytes {
            return Err(ConfigError::ImageTooLarge {
                size: source.bytes.len(),
                max: self.max_image_bytes,
            }
            .into());
        }

        let rotation = match Rotation::try_from(degrees) {
            Ok(rotation) => rotation,
            Err(e) => {
                warn!("⚠️ {}，使用原图", e);
                Rotation::None
            }
        };

        if rotation.is_identity() {
            return Ok(EncodedImage::encode(&source.bytes, extension));
        }

        let rotated = rotate_bytes(&source.bytes, extension, rotation)?;
        debug!(
            "图片已旋转 {} 度: {} → {} 字节",
            rotation.degrees(),
            source.bytes.len(),
            rotated.len()
        );
        Ok(EncodedImage::encode(&rotated, extension))
    }
}

/// 逆时针旋转并按原格式重新编码
fn rotate_bytes(
    bytes: &[u8],
    extension: ImageExtension,
    rotation: Rotation,
) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;

    let rotated = match rotation {
        Rotation::Deg90 => decoded.rotate270(),
        Rotation::Deg180 => decoded.rotate180(),
        Rotation::Deg270 => decoded.rotate90(),
        Rotation::None | Rotation::Full => decoded,
    };

    let format = extension.image_format();
    // JPEG / PNM 不支持透明通道
    let rotated = match extension {
        ImageExtension::Jpg | ImageExtension::Jpeg | ImageExtension::Ppm => {
            DynamicImage::ImageRgb8(rotated.to_rgb8())
        }
        _ => rotated,
    };

    let mut buffer = Cursor::new(Vec::new());
    rotated.write_to(&mut buffer, format)?;
    Ok(buffer.into_inner())
}
