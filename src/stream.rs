//! # 数据源与数据汇模块
//!
//! 流水线只通过 [`Source`] 读、通过 [`Sink`] 写。文件、标准输入、内存缓冲区
//! 以及像素数组 ([`PixelBuffer`]) 都实现了这两个接口。

use crate::steganography::PixelBuffer;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

/// 可读取的数据源。
pub trait Source {
    /// 数据源的声明大小；`0` 表示未知。
    fn size(&self) -> usize;

    /// 最多读取 `buf.len()` 个字节到 `buf`，返回实际读取的字节数。
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// 可写入的数据汇。
pub trait Sink {
    /// 写入 `bytes`，返回实际写入的字节数。
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;
}

/// 从 `reader` 中反复读取，直到填满 `buf` 或到达末尾。
fn read_fully(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// 去掉一个行尾 (`\n` 或 `\r\n`) 后的长度。
fn trim_line_end(bytes: &[u8]) -> usize {
    match bytes {
        [.., b'\r', b'\n'] => bytes.len() - 2,
        [.., b'\n'] => bytes.len() - 1,
        _ => bytes.len(),
    }
}

/// 读取终端输入。只有读到末尾时才去掉结尾的换行，被截断的数据原样保留。
fn read_line_input(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let n = read_fully(reader, buf)?;
    if n < buf.len() {
        Ok(trim_line_end(&buf[..n]))
    } else {
        Ok(n)
    }
}

enum Input {
    File { file: File, size: usize },
    Stdin(io::Stdin),
}

/// 消息输入：指定文件，或者未指定时使用标准输入。
pub struct InputStream {
    input: Input,
}

impl InputStream {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len() as usize;
        Ok(Self {
            input: Input::File { file, size },
        })
    }

    pub fn stdin() -> Self {
        Self {
            input: Input::Stdin(io::stdin()),
        }
    }
}

impl Source for InputStream {
    fn size(&self) -> usize {
        match &self.input {
            Input::File { size, .. } => *size,
            Input::Stdin(_) => 0,
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.input {
            Input::File { file, .. } => read_fully(file, buf),
            Input::Stdin(stdin) => read_line_input(&mut stdin.lock(), buf),
        }
    }
}

/// 内存中的数据源。
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
    position: usize,
    declare_size: bool,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            declare_size: true,
        }
    }

    /// 不声明大小的数据源，行为与标准输入相同。
    pub fn without_size(data: impl Into<Vec<u8>>) -> Self {
        Self {
            declare_size: false,
            ..Self::new(data)
        }
    }
}

impl Source for MemorySource {
    fn size(&self) -> usize {
        if self.declare_size { self.data.len() } else { 0 }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.position..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}

impl Sink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(bytes);
        Ok(bytes.len())
    }
}

impl Source for PixelBuffer {
    /// 像素数组的总字节数，远大于可能隐藏的数据量。
    fn size(&self) -> usize {
        self.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let extraction = self
            .extract(buf.len())
            .map_err(|err| io::Error::new(ErrorKind::InvalidInput, err))?;
        if !extraction.terminated {
            log::warn!(
                "No terminator found within {} pixels, the image may not carry a message",
                self.capacity_bits()
            );
        }

        let n = extraction.bytes.len();
        buf[..n].copy_from_slice(&extraction.bytes);
        Ok(n)
    }
}

impl Sink for PixelBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.embed(bytes)
            .map_err(|err| io::Error::new(ErrorKind::InvalidInput, err))?;
        Ok(bytes.len())
    }
}
