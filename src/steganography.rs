//! # 隐写核心算法模块
//!
//! 每个像素的首个通道字节提供一个两比特的隐写位：`0`/`1` 为数据位，
//! `2` 为终止符。消息按字节内低位在前的顺序展开为比特流，
//! 消息之后的所有像素都写入终止符。

use crate::constants::{HIGH_BITS_MASK, LOW_BITS_MASK, TERMINATOR};
use crate::error::{CapacityError, ContainerError};

/// 原始像素数组，长度恒为 `width * height * channels`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u32,
    bytes: Vec<u8>,
}

/// 一次提取的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// 终止符之前的数据，每 8 个比特组成一个字节。
    pub bytes: Vec<u8>,
    /// 是否在容量边界之前遇到了终止符。
    ///
    /// 消息恰好占满容量时没有终止符位置，此时为 `false` 也是合法的；
    /// 对不可信的图像，调用方应把它当作可疑数据。
    pub terminated: bool,
}

impl PixelBuffer {
    /// 由解码后的像素数组构造。
    ///
    /// # Errors
    ///
    /// 数组长度与 `width * height * channels` 不符时返回 [`ContainerError::InvalidLayout`]。
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u32,
        bytes: Vec<u8>,
    ) -> Result<Self, ContainerError> {
        let expected = width as usize * height as usize * channels as usize;
        if channels == 0 || bytes.len() != expected {
            return Err(ContainerError::InvalidLayout {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            bytes,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 可隐藏的比特数，即像素数。
    pub fn capacity_bits(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 像素数组的总字节数。
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 第 `pixel` 个像素隐写位的当前取值 (`0..=3`)。
    pub fn slot(&self, pixel: usize) -> Option<u8> {
        self.bytes
            .get(pixel * self.channels as usize)
            .map(|&byte| byte & LOW_BITS_MASK)
    }

    fn write_slot(&mut self, pixel: usize, value: u8) {
        let byte = &mut self.bytes[pixel * self.channels as usize];
        *byte = (value & LOW_BITS_MASK) | (*byte & HIGH_BITS_MASK);
    }

    /// 将 `message` 写入像素，剩余像素写入终止符。
    ///
    /// 只改动每个像素首个通道字节的低两位，其余位和其他通道保持不变。
    ///
    /// # Errors
    ///
    /// `message.len() * 8` 超过像素数时返回 [`CapacityError::MessageTooLarge`]，
    /// 此时不会修改任何像素。
    pub fn embed(&mut self, message: &[u8]) -> Result<(), CapacityError> {
        let capacity = self.capacity_bits();
        let required = message.len() * 8;
        if required > capacity {
            return Err(CapacityError::MessageTooLarge {
                required_bits: required,
                available_bits: capacity,
            });
        }

        for i in 0..required {
            let bit = (message[i / 8] >> (i % 8)) & 0x01;
            self.write_slot(i, bit);
        }

        for i in required..capacity {
            self.write_slot(i, TERMINATOR);
        }

        log::trace!(
            "Embedded {required} bits, {} terminator slots",
            capacity - required
        );
        Ok(())
    }

    /// 按像素顺序读取数据位，直到遇到终止符或容量边界。
    ///
    /// 不足 8 比特的尾部被丢弃。
    ///
    /// # Errors
    ///
    /// `buffer_capacity * 8` 小于像素数时返回 [`CapacityError::OutputTooSmall`]。
    pub fn extract(&self, buffer_capacity: usize) -> Result<Extraction, CapacityError> {
        let capacity = self.capacity_bits();
        if buffer_capacity.saturating_mul(8) < capacity {
            return Err(CapacityError::OutputTooSmall {
                capacity_bits: capacity,
                buffer_bits: buffer_capacity.saturating_mul(8),
            });
        }

        let mut bytes = vec![0u8; capacity / 8];
        let mut terminated = false;
        let mut i = 0;
        while i < capacity {
            let value = self.bytes[i * self.channels as usize] & LOW_BITS_MASK;
            if value == TERMINATOR {
                terminated = true;
                break;
            }
            // embed 不会写出取值 3，遇到时只取其最低位。
            if let Some(byte) = bytes.get_mut(i / 8) {
                *byte |= (value & 0x01) << (i % 8);
            }
            i += 1;
        }

        bytes.truncate(i / 8);
        log::trace!("Extracted {} bytes, terminated: {terminated}", bytes.len());
        Ok(Extraction { bytes, terminated })
    }
}
