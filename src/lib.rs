//! # stegcrypt 库
//!
//! 本库包含加密隐写工具的核心逻辑：AES-128 分组加密、Base64 转码、
//! LSB 嵌入/提取以及串联它们的编码/解码流水线。

// 声明库包含的所有模块。

pub mod cipher;
pub mod cli;
pub mod constants;
pub mod container;
pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod pipeline;
pub mod steganography;
pub mod stream;
pub mod transcode;
