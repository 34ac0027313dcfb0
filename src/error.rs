//! # 错误类型模块
//!
//! 库内各层的错误类型。每一层只返回自己的错误，
//! 由流水线 (`pipeline`) 统一包装为 [`PipelineError`]。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 像素容量相关的错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    /// 消息的比特数超过了图像可用的像素数。
    #[error("Message too large: {required_bits} bits required, only {available_bits} pixels available")]
    MessageTooLarge {
        required_bits: usize,
        available_bits: usize,
    },

    /// 输出缓冲区无法容纳图像中可能隐藏的全部数据。
    #[error("Output buffer too small: {buffer_bits} bits for an image carrying up to {capacity_bits} bits")]
    OutputTooSmall {
        capacity_bits: usize,
        buffer_bits: usize,
    },
}

/// 分组密码相关的错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("Cipher initialisation failed: {0}")]
    Init(String),

    /// 数据长度不是分组长度的整数倍；密码层本身不做填充。
    #[error("Data length {len} is not a multiple of the cipher block length {block_len}")]
    UnalignedLength { len: usize, block_len: usize },

    #[error("Output buffer of {out_len} bytes cannot hold {len} bytes of cipher output")]
    BufferTooSmall { len: usize, out_len: usize },

    #[error("Cipher handle used after close")]
    Closed,
}

/// Base64 转码错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    #[error("Invalid base64 symbol 0x{symbol:02x} at position {position}")]
    InvalidSymbol { symbol: u8, position: usize },
}

/// 编码/解码流水线的错误。
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input is empty, nothing to process")]
    EmptyInput,

    #[error("Failed to read from source")]
    SourceRead(#[source] io::Error),

    #[error("Failed to write to sink")]
    SinkWrite(#[source] io::Error),

    #[error("Cipher failure")]
    CipherFailure(#[from] CipherError),

    #[error("Transcoding failure")]
    Transcode(#[from] TranscodeError),

    #[error("Payload of {len} bytes does not contain a whole number of {block_len}-byte cipher blocks")]
    BlockAlignment { len: usize, block_len: usize },
}

/// 图像容器 (PNG/BMP/TGA) 的读写错误。
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("Unable to load image {}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unable to save image {}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// 像素数组长度与 `width * height * channels` 不一致。
    #[error("Pixel data has {actual} bytes, expected {expected}")]
    InvalidLayout { expected: usize, actual: usize },

    #[error("Images with {0} channels cannot be saved")]
    UnsupportedChannels(u32),
}
