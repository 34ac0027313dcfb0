//! # Base64 转码模块
//!
//! 3 个字节对应 4 个字母表符号。编码时不足 3 字节的尾组以零补齐，
//! 且从不输出 `=` 填充符；解码结果因此可能带有并非原文的尾随零字节，
//! 由流水线按分组长度截断。

use crate::error::TranscodeError;

/// 64 个数据符号，下标即符号的取值。
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// 查找表中表示“非数据符号”的取值。
const SENTINEL: u8 = 64;

/// 查找表的起点，`+` 是字母表中码值最小的符号。
const LOOKUP_BASE: u8 = b'+';

/// 以 `symbol - '+'` 为下标的反查表，覆盖 `'+'..='z'`。
const LOOKUP: [u8; 80] = [
    62, 64, 64, 64, 63, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 64, //
    64, 64, 64, 64, 64, 64, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, //
    10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, //
    64, 64, 64, 64, 64, 64, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, //
    36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51,
];

/// 编码 `len` 个字节所需的符号数。
pub fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

/// 解码 `len` 个符号得到的字节数，不完整的尾组不计入。
pub fn decoded_len(len: usize) -> usize {
    len / 4 * 3
}

fn encode_group(octets: [u8; 3], out: &mut [u8]) {
    let indices = [
        octets[0] >> 2,
        ((octets[0] & 0x03) << 4) | (octets[1] >> 4),
        ((octets[1] & 0x0f) << 2) | (octets[2] >> 6),
        octets[2] & 0x3f,
    ];
    for (slot, index) in out.iter_mut().zip(indices) {
        *slot = ALPHABET[index as usize];
    }
}

/// 将 `input` 编码为 Base64 符号。
///
/// 输出长度恒为 `ceil(input.len() / 3) * 4`。
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; encoded_len(input.len())];

    for (chunk, slot) in input.chunks(3).zip(out.chunks_exact_mut(4)) {
        let mut octets = [0u8; 3];
        octets[..chunk.len()].copy_from_slice(chunk);
        encode_group(octets, slot);
    }

    out
}

fn lookup(symbol: u8, position: usize) -> Result<u8, TranscodeError> {
    symbol
        .checked_sub(LOOKUP_BASE)
        .and_then(|offset| LOOKUP.get(offset as usize))
        .copied()
        .filter(|&value| value != SENTINEL)
        .ok_or(TranscodeError::InvalidSymbol { symbol, position })
}

/// 原地解码：结果写回 `buf` 的开头，返回解码得到的字节数。
///
/// 写入位置 (每组 3 字节) 始终落后于读取位置 (每组 4 字节)，因此可以复用同一块缓冲区。
/// 长度不是 4 的倍数时，不完整的尾组被忽略，但其中的符号同样要经过校验。
///
/// # Errors
///
/// 遇到字母表以外的符号 (包括 `=`) 时返回 [`TranscodeError::InvalidSymbol`]，缓冲区内容此时未定义。
pub fn decode_in_place(buf: &mut [u8]) -> Result<usize, TranscodeError> {
    let groups = buf.len() / 4;
    for group in 0..groups {
        let mut hexets = [0u8; 4];
        for (k, hexet) in hexets.iter_mut().enumerate() {
            let position = group * 4 + k;
            *hexet = lookup(buf[position], position)?;
        }

        let out = group * 3;
        buf[out] = (hexets[0] << 2) | (hexets[1] >> 4);
        buf[out + 1] = ((hexets[1] & 0x0f) << 4) | (hexets[2] >> 2);
        buf[out + 2] = ((hexets[2] & 0x03) << 6) | hexets[3];
    }

    // 尾组不参与解码，但它位于所有写入位置之后，仍是原始输入。
    for (position, &symbol) in buf.iter().enumerate().skip(groups * 4) {
        lookup(symbol, position)?;
    }

    Ok(groups * 3)
}

/// 解码 `input`，返回新分配的字节数组。
pub fn decode(input: &[u8]) -> Result<Vec<u8>, TranscodeError> {
    let mut buf = input.to_vec();
    let len = decode_in_place(&mut buf)?;
    buf.truncate(len);
    Ok(buf)
}
