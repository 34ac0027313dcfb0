use clap::Parser;

use stegcrypt::{
    cli::{Cli, Commands},
    diagnostics::LogDiagnostics,
    handler::{handle_decode, handle_encode},
};

/// 程序的主入口点
///
/// 负责初始化日志、解析命令行参数，并根据指定的子命令（`encode` 或 `decode`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // 解析命令行参数
    let cli = Cli::parse();

    // 诊断对象在整个进程中只有这一个
    let diagnostics = LogDiagnostics;

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Encode(args) => handle_encode(args, &diagnostics),
        Commands::Decode(args) => handle_decode(args, &diagnostics),
    }
}
