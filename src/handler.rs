//! # 命令处理逻辑模块
//!
//! 包含处理 `encode` 和 `decode` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、读取密钥、调用流水线以及向用户报告结果。

use crate::cli::{DecodeArgs, EncodeArgs};
use crate::container;
use crate::diagnostics::Diagnostics;
use crate::pipeline::{Decoder, Encoder, Transcoding};
use crate::stream::InputStream;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// 在输入图像旁生成默认的输出路径：`doctored_<stem>.<ext>`。
pub fn default_dest(image: &Path, extension: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    image.with_file_name(format!("doctored_{stem}.{extension}"))
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn read_secret(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| {
        format!(
            "Unable to read {} file: {}",
            what,
            path.to_string_lossy().red().bold()
        )
    })
}

/// 处理 'Encode' 命令的执行逻辑。
///
/// 读取密钥、IV 和载体图像，加密消息 (可选 Base64 转码) 后隐藏到像素中，
/// 只有在整个流水线成功后才写出结果图像。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `EncodeArgs` 结构体。
/// * `diagnostics` - 接收失败信息的诊断对象。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 无法读取密钥、IV、图像或消息文件。
/// * 密钥或 IV 长度不足。
/// * 消息为空，或图像没有足够的空间。
/// * 无法写入到目标图像文件。
pub fn handle_encode(args: EncodeArgs, diagnostics: &dyn Diagnostics) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_dest(&args.image, args.format.extension()));
    ensure_writable(&dest, args.force)?;

    let key = read_secret(&args.key, "key")?;
    let iv = read_secret(&args.iv, "initialization vector")?;

    let mut pixels = container::load(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let mut input = match &args.message {
        Some(path) => InputStream::open(path).with_context(|| {
            format!(
                "Unable to read message file: {}",
                path.to_string_lossy().red().bold()
            )
        })?,
        None => InputStream::stdin(),
    };

    let encoder = Encoder::open(&key, &iv, Transcoding::from(args.base64), diagnostics)
        .context("Failed to initialise the cipher. \nCheck that the key and IV files hold at least 16 bytes.")?;

    let written = encoder.run(&mut input, &mut pixels).with_context(|| {
        format!(
            "Failed to hide the message. \nThe image can hold {} bytes.",
            (pixels.capacity_bits() / 8).to_string().green().bold()
        )
    })?;

    container::save(&pixels, &dest, args.format).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "{} bytes have been successfully hidden and saved: {}",
        written.to_string().green(),
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 读取图像中隐藏的数据，(可选) Base64 解码后解密。结果先保存在内存中，
/// 成功后才写入目标文件或标准输出，失败时不会留下任何输出。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `DecodeArgs` 结构体。
/// * `diagnostics` - 接收失败信息的诊断对象。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 无法读取密钥、IV 或图像文件。
/// * 图像中没有可解密的数据。
/// * 无法写入到目标文本文件。
pub fn handle_decode(args: DecodeArgs, diagnostics: &dyn Diagnostics) -> Result<()> {
    if let Some(text) = &args.text {
        ensure_writable(text, args.force)?;
    }

    let key = read_secret(&args.key, "key")?;
    let iv = read_secret(&args.iv, "initialization vector")?;

    let mut pixels = container::load(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let decoder = Decoder::open(&key, &iv, Transcoding::from(args.base64), diagnostics)
        .context("Failed to initialise the cipher. \nCheck that the key and IV files hold at least 16 bytes.")?;

    let mut message = Vec::new();
    decoder.run(&mut pixels, &mut message).with_context(|| {
        format!(
            "Failed to recover a message from '{}'. \nThe image may not contain a hidden message, or the key or --base64 flag differ from the ones used to hide it.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    match &args.text {
        Some(path) => {
            fs::write(path, &message).with_context(|| {
                format!(
                    "Unable to write to target text file: {}",
                    path.to_string_lossy().red().bold()
                )
            })?;

            println!(
                "The message has been successfully recovered and saved: {}",
                path.to_string_lossy().green().bold()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&message)
                .and_then(|()| stdout.flush())
                .context("Unable to write the message to stdout")?;
        }
    }

    Ok(())
}
