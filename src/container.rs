//! # 图像容器模块
//!
//! 在图像文件与原始像素数组 ([`PixelBuffer`]) 之间转换。只支持无损格式的输出，
//! 有损压缩会破坏隐写位。

use crate::error::ContainerError;
use crate::steganography::PixelBuffer;
use clap::ValueEnum;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use std::fmt;
use std::path::Path;

/// 输出图像的格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Png,
    Bmp,
    Tga,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tga => "tga",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tga => ImageFormat::Tga,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn color_type(channels: u32) -> Option<ColorType> {
    match channels {
        1 => Some(ColorType::L8),
        2 => Some(ColorType::La8),
        3 => Some(ColorType::Rgb8),
        4 => Some(ColorType::Rgba8),
        _ => None,
    }
}

/// 读取图像文件，保留其通道数；非 8 位的图像转换为 8 位 RGBA。
pub fn load(path: &Path) -> Result<PixelBuffer, ContainerError> {
    let image = image::open(path).map_err(|source| ContainerError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let image = match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => image,
        other => {
            log::debug!("Converting {other:?} image to 8-bit RGBA");
            DynamicImage::ImageRgba8(image.to_rgba8())
        }
    };

    let (width, height) = image.dimensions();
    let channels = u32::from(image.color().channel_count());
    log::debug!(
        "Loaded {} ({width}x{height}, {channels} channels)",
        path.display()
    );

    PixelBuffer::from_raw(width, height, channels, image.into_bytes())
}

/// 以指定格式保存像素数组。
pub fn save(pixels: &PixelBuffer, path: &Path, format: OutputFormat) -> Result<(), ContainerError> {
    let color = color_type(pixels.channels())
        .ok_or(ContainerError::UnsupportedChannels(pixels.channels()))?;

    image::save_buffer_with_format(
        path,
        pixels.as_bytes(),
        pixels.width(),
        pixels.height(),
        color,
        format.image_format(),
    )
    .map_err(|source| ContainerError::Save {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("Saved {} as {format}", path.display());
    Ok(())
}
