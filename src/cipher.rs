//! # 分组密码模块
//!
//! 对 AES-128 的薄封装：固定密钥、固定 IV、ECB 模式、不做内部填充。
//! 所有填充由流水线负责，这里只接受分组长度整数倍的数据。

use crate::constants::{AES_BLOCK_LEN, AES_IV_LEN, AES_KEY_LEN};
use crate::error::CipherError;
use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

/// 已初始化的密码句柄。
///
/// 句柄在 [`CipherHandle::close`] 或被丢弃时释放密钥调度；关闭后的任何操作都返回
/// [`CipherError::Closed`]。
pub struct CipherHandle {
    cipher: Option<Aes128>,
    block_len: usize,
}

impl std::fmt::Debug for CipherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherHandle")
            .field("open", &self.cipher.is_some())
            .field("block_len", &self.block_len)
            .finish()
    }
}

impl CipherHandle {
    /// 以密钥和初始化向量建立密码上下文。
    ///
    /// 只使用 `key` 与 `iv` 的前 16 个字节 (密钥文件末尾常带换行符)。
    /// ECB 模式不使用 IV，但仍然校验其长度。
    ///
    /// # Errors
    ///
    /// 密钥或 IV 不足 16 字节时返回 [`CipherError::Init`]。
    pub fn open(key: &[u8], iv: &[u8]) -> Result<Self, CipherError> {
        if key.len() < AES_KEY_LEN {
            return Err(CipherError::Init(format!(
                "key must be at least {AES_KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        if iv.len() < AES_IV_LEN {
            return Err(CipherError::Init(format!(
                "initialization vector must be at least {AES_IV_LEN} bytes, got {}",
                iv.len()
            )));
        }
        if key.len() > AES_KEY_LEN || iv.len() > AES_IV_LEN {
            log::debug!(
                "Using the first {AES_KEY_LEN} bytes of a {}-byte key and a {}-byte IV",
                key.len(),
                iv.len()
            );
        }

        let cipher = Aes128::new_from_slice(&key[..AES_KEY_LEN])
            .map_err(|err| CipherError::Init(err.to_string()))?;

        Ok(Self {
            cipher: Some(cipher),
            block_len: AES_BLOCK_LEN,
        })
    }

    /// 分组长度 (字节)。
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    pub fn is_open(&self) -> bool {
        self.cipher.is_some()
    }

    fn active(&self, len: usize) -> Result<&Aes128, CipherError> {
        let cipher = self.cipher.as_ref().ok_or(CipherError::Closed)?;
        if len % self.block_len != 0 {
            return Err(CipherError::UnalignedLength {
                len,
                block_len: self.block_len,
            });
        }
        Ok(cipher)
    }

    fn check_out(len: usize, out: &[u8]) -> Result<(), CipherError> {
        if out.len() < len {
            return Err(CipherError::BufferTooSmall {
                len,
                out_len: out.len(),
            });
        }
        Ok(())
    }

    /// 原地加密。
    pub fn encrypt(&self, data: &mut [u8]) -> Result<(), CipherError> {
        let cipher = self.active(data.len())?;
        data.chunks_exact_mut(self.block_len)
            .for_each(|block| cipher.encrypt_block(GenericArray::from_mut_slice(block)));
        Ok(())
    }

    /// 加密 `data` 并写入 `out` 的前 `data.len()` 个字节，结果与原地加密相同。
    pub fn encrypt_into(&self, data: &[u8], out: &mut [u8]) -> Result<(), CipherError> {
        let cipher = self.active(data.len())?;
        Self::check_out(data.len(), out)?;
        data.chunks_exact(self.block_len)
            .zip(out.chunks_exact_mut(self.block_len))
            .for_each(|(block, dst)| {
                cipher.encrypt_block_b2b(
                    GenericArray::from_slice(block),
                    GenericArray::from_mut_slice(dst),
                )
            });
        Ok(())
    }

    /// 原地解密。
    pub fn decrypt(&self, data: &mut [u8]) -> Result<(), CipherError> {
        let cipher = self.active(data.len())?;
        data.chunks_exact_mut(self.block_len)
            .for_each(|block| cipher.decrypt_block(GenericArray::from_mut_slice(block)));
        Ok(())
    }

    /// 解密 `data` 并写入 `out` 的前 `data.len()` 个字节，结果与原地解密相同。
    pub fn decrypt_into(&self, data: &[u8], out: &mut [u8]) -> Result<(), CipherError> {
        let cipher = self.active(data.len())?;
        Self::check_out(data.len(), out)?;
        data.chunks_exact(self.block_len)
            .zip(out.chunks_exact_mut(self.block_len))
            .for_each(|(block, dst)| {
                cipher.decrypt_block_b2b(
                    GenericArray::from_slice(block),
                    GenericArray::from_mut_slice(dst),
                )
            });
        Ok(())
    }

    /// 释放密钥调度。重复调用是安全的。
    pub fn close(&mut self) {
        if self.cipher.take().is_some() {
            log::trace!("Cipher handle closed");
        }
    }
}

impl Drop for CipherHandle {
    fn drop(&mut self) {
        self.close();
    }
}
