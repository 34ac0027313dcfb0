//! # 编码/解码流水线模块
//!
//! 编码：读取数据源 → 补零到分组长度的整数倍 → 加密 → (可选) Base64 → 写入数据汇。
//! 解码：读取数据源 → (可选) Base64 解码并截断到分组整数倍 → 解密 → 写入数据汇。
//!
//! 填充与对齐只在这一层处理，密码层和转码层都只接受/产生精确长度的数据。

use crate::cipher::CipherHandle;
use crate::constants::DEFAULT_CHUNK_SIZE;
use crate::diagnostics::Diagnostics;
use crate::error::{PipelineError, TranscodeError};
use crate::stream::{Sink, Source};
use crate::transcode;
use std::error::Error;
use std::io::{self, ErrorKind};

/// 密文与数据汇之间的可逆变换。
pub trait Transform {
    fn transform(&self, digest: Vec<u8>) -> Vec<u8>;

    fn inverse_transform(&self, payload: Vec<u8>) -> Result<Vec<u8>, TranscodeError>;

    /// 逆变换的输出长度是否保持分组对齐。
    fn preserves_alignment(&self) -> bool;
}

/// 不做任何转码。
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTransform;

impl Transform for RawTransform {
    fn transform(&self, digest: Vec<u8>) -> Vec<u8> {
        digest
    }

    fn inverse_transform(&self, payload: Vec<u8>) -> Result<Vec<u8>, TranscodeError> {
        Ok(payload)
    }

    fn preserves_alignment(&self) -> bool {
        true
    }
}

/// 密文以 Base64 符号的形式隐藏。
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Transform;

impl Transform for Base64Transform {
    fn transform(&self, digest: Vec<u8>) -> Vec<u8> {
        transcode::encode(&digest)
    }

    fn inverse_transform(&self, mut payload: Vec<u8>) -> Result<Vec<u8>, TranscodeError> {
        let len = transcode::decode_in_place(&mut payload)?;
        payload.truncate(len);
        Ok(payload)
    }

    fn preserves_alignment(&self) -> bool {
        false
    }
}

/// 运行时选择的转码方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transcoding {
    #[default]
    Raw,
    Base64,
}

impl Transcoding {
    pub fn stage(self) -> &'static dyn Transform {
        match self {
            Transcoding::Raw => &RawTransform,
            Transcoding::Base64 => &Base64Transform,
        }
    }
}

impl From<bool> for Transcoding {
    fn from(base64: bool) -> Self {
        if base64 {
            Transcoding::Base64
        } else {
            Transcoding::Raw
        }
    }
}

/// 向上取整到 `multiple` 的整数倍。
pub fn round_up(len: usize, multiple: usize) -> usize {
    len.div_ceil(multiple) * multiple
}

fn read_size<S: Source + ?Sized>(source: &S) -> usize {
    match source.size() {
        0 => DEFAULT_CHUNK_SIZE,
        size => size,
    }
}

fn write_all<K: Sink + ?Sized>(sink: &mut K, bytes: &[u8]) -> Result<(), PipelineError> {
    let written = sink.write(bytes).map_err(PipelineError::SinkWrite)?;
    if written != bytes.len() {
        return Err(PipelineError::SinkWrite(io::Error::new(
            ErrorKind::WriteZero,
            format!("short write: {written} of {} bytes", bytes.len()),
        )));
    }
    Ok(())
}

/// 错误及其全部来源，以 `: ` 连接。
fn describe(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn report(diagnostics: &dyn Diagnostics, operation: &str, err: PipelineError) -> PipelineError {
    diagnostics.log(&[&"Error:", &operation, &describe(&err)]);
    err
}

fn open_cipher(
    key: &[u8],
    iv: &[u8],
    diagnostics: &dyn Diagnostics,
) -> Result<CipherHandle, PipelineError> {
    CipherHandle::open(key, iv).map_err(|err| report(diagnostics, "cipher init", err.into()))
}

/// 编码门面：加密 (并可选转码) 数据源中的消息，写入数据汇。
pub struct Encoder<'d> {
    cipher: CipherHandle,
    transcoding: Transcoding,
    diagnostics: &'d dyn Diagnostics,
}

impl<'d> Encoder<'d> {
    pub fn new(
        cipher: CipherHandle,
        transcoding: Transcoding,
        diagnostics: &'d dyn Diagnostics,
    ) -> Self {
        Self {
            cipher,
            transcoding,
            diagnostics,
        }
    }

    /// 用密钥和 IV 建立密码句柄并构造编码器。
    pub fn open(
        key: &[u8],
        iv: &[u8],
        transcoding: Transcoding,
        diagnostics: &'d dyn Diagnostics,
    ) -> Result<Self, PipelineError> {
        let cipher = open_cipher(key, iv, diagnostics)?;
        Ok(Self::new(cipher, transcoding, diagnostics))
    }

    /// 执行一次编码，返回写入数据汇的字节数。密码句柄在返回时释放。
    ///
    /// # Errors
    ///
    /// * 数据源为空时返回 [`PipelineError::EmptyInput`]。
    /// * 读取、加密、写入失败时分别返回 [`PipelineError::SourceRead`]、
    ///   [`PipelineError::CipherFailure`]、[`PipelineError::SinkWrite`]。
    ///
    /// 所有错误在返回前都会报告给诊断对象。
    pub fn run<S, K>(self, source: &mut S, sink: &mut K) -> Result<usize, PipelineError>
    where
        S: Source + ?Sized,
        K: Sink + ?Sized,
    {
        let diagnostics = self.diagnostics;
        let block_len = self.cipher.block_len();
        let read_size = read_size(&*source);

        // 缓冲区初始为零，读取不足的尾部即是补零。
        let mut buf = vec![0u8; round_up(read_size, block_len)];
        let bytes_read = source
            .read(&mut buf[..read_size])
            .map_err(|err| report(diagnostics, "read", PipelineError::SourceRead(err)))?;
        if bytes_read == 0 {
            return Err(report(diagnostics, "read", PipelineError::EmptyInput));
        }

        let digest_size = round_up(bytes_read, block_len);
        buf.truncate(digest_size);
        log::debug!("Encrypting {bytes_read} bytes padded to {digest_size}");

        self.cipher
            .encrypt(&mut buf)
            .map_err(|err| report(diagnostics, "encrypt", err.into()))?;

        let payload = self.transcoding.stage().transform(buf);
        write_all(sink, &payload).map_err(|err| report(diagnostics, "write", err))?;

        log::debug!(
            "Wrote {} bytes ({:?} transcoding)",
            payload.len(),
            self.transcoding
        );
        Ok(payload.len())
    }
}

/// 解码门面：从数据源读取密文，(可选) 反转码并解密，写入数据汇。
pub struct Decoder<'d> {
    cipher: CipherHandle,
    transcoding: Transcoding,
    diagnostics: &'d dyn Diagnostics,
}

impl<'d> Decoder<'d> {
    pub fn new(
        cipher: CipherHandle,
        transcoding: Transcoding,
        diagnostics: &'d dyn Diagnostics,
    ) -> Self {
        Self {
            cipher,
            transcoding,
            diagnostics,
        }
    }

    /// 用密钥和 IV 建立密码句柄并构造解码器。
    pub fn open(
        key: &[u8],
        iv: &[u8],
        transcoding: Transcoding,
        diagnostics: &'d dyn Diagnostics,
    ) -> Result<Self, PipelineError> {
        let cipher = open_cipher(key, iv, diagnostics)?;
        Ok(Self::new(cipher, transcoding, diagnostics))
    }

    /// 执行一次解码，返回写入数据汇的字节数。密码句柄在返回时释放。
    ///
    /// Base64 模式下，解码结果先截断到分组长度的整数倍，以去掉编码时补齐 3 字节组带来的零字节。
    ///
    /// # Errors
    ///
    /// * 数据源为空时返回 [`PipelineError::EmptyInput`]。
    /// * 含有非法 Base64 符号时返回 [`PipelineError::Transcode`]。
    /// * 待解密的数据不是完整的密文分组时返回 [`PipelineError::BlockAlignment`]。
    /// * 解密、写入失败时分别返回 [`PipelineError::CipherFailure`]、[`PipelineError::SinkWrite`]。
    pub fn run<S, K>(self, source: &mut S, sink: &mut K) -> Result<usize, PipelineError>
    where
        S: Source + ?Sized,
        K: Sink + ?Sized,
    {
        let diagnostics = self.diagnostics;
        let block_len = self.cipher.block_len();
        let read_size = read_size(&*source);

        let mut buf = vec![0u8; read_size];
        let bytes_read = source
            .read(&mut buf)
            .map_err(|err| report(diagnostics, "read", PipelineError::SourceRead(err)))?;
        if bytes_read == 0 {
            return Err(report(diagnostics, "read", PipelineError::EmptyInput));
        }
        buf.truncate(bytes_read);

        let stage = self.transcoding.stage();
        let mut payload = stage
            .inverse_transform(buf)
            .map_err(|err| report(diagnostics, "transcode", err.into()))?;

        let decoded_len = payload.len();
        if !stage.preserves_alignment() {
            payload.truncate(decoded_len - decoded_len % block_len);
        }
        if payload.is_empty() || payload.len() % block_len != 0 {
            let err = PipelineError::BlockAlignment {
                len: decoded_len,
                block_len,
            };
            return Err(report(diagnostics, "align", err));
        }
        log::debug!(
            "Decrypting {} of {decoded_len} decoded bytes",
            payload.len()
        );

        self.cipher
            .decrypt(&mut payload)
            .map_err(|err| report(diagnostics, "decrypt", err.into()))?;

        write_all(sink, &payload).map_err(|err| report(diagnostics, "write", err))?;
        Ok(payload.len())
    }
}
