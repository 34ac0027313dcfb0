//! # 诊断输出模块
//!
//! 失败时向用户报告的诊断信息。诊断对象在程序启动时创建一次，
//! 以引用的形式传入需要它的组件；组件的成败只由返回值决定，与是否记录了诊断无关。

use std::cell::RefCell;
use std::fmt::Display;

/// 诊断信息的接收者。
pub trait Diagnostics {
    /// 按顺序拼接各个片段并输出为一条记录。
    fn log(&self, parts: &[&dyn Display]);
}

/// 以单个空格连接各个片段。
pub fn join_parts(parts: &[&dyn Display]) -> String {
    parts
        .iter()
        .map(|part| part.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 通过 `log` 门面输出诊断信息，实际的输出目标由 `env_logger` 决定 (默认为 stderr)。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn log(&self, parts: &[&dyn Display]) {
        log::error!("{}", join_parts(parts));
    }
}

/// 在内存中保存诊断信息，每条记录一行。
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    lines: RefCell<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log(&self, parts: &[&dyn Display]) {
        self.lines.borrow_mut().push(join_parts(parts));
    }
}
