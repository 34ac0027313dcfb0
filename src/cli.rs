//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::container::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// 先以 AES-128 加密消息，再通过 LSB (最低有效位) 隐写术将其隐藏在无损格式图像 (PNG, BMP, TGA) 中。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "先以 AES-128 加密消息 (可选 Base64 转码)，再通过 LSB (最低有效位) 隐写术将其隐藏在无损格式图像 (PNG, BMP, TGA) 中，或者从图像中恢复并解密消息。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (加密并隐藏) 和 decode (提取并解密)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 加密消息并隐藏到图像中。
    Encode(EncodeArgs),

    /// 从图像中提取并解密消息。
    Decode(DecodeArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// 用作载体的输入图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的消息文件路径；省略时从标准输入读取。
    #[arg(short, long)]
    pub message: Option<PathBuf>,

    /// 结果图像的输出路径；省略时在输入图像旁生成 `doctored_<文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 结果图像的格式。
    #[arg(short = 't', long, value_enum, ignore_case = true, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// AES 密钥文件 (至少 16 字节)。
    #[arg(short, long)]
    pub key: PathBuf,

    /// 初始化向量文件 (至少 16 字节)。
    #[arg(short = 'v', long)]
    pub iv: PathBuf,

    /// 以 Base64 形式隐藏密文。
    #[arg(short, long)]
    pub base64: bool,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// 已隐藏消息的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复的消息的输出路径；省略时写到标准输出。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// AES 密钥文件 (至少 16 字节)。
    #[arg(short, long)]
    pub key: PathBuf,

    /// 初始化向量文件 (至少 16 字节)。
    #[arg(short = 'v', long)]
    pub iv: PathBuf,

    /// 隐藏时使用了 Base64 转码。
    #[arg(short, long)]
    pub base64: bool,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}
