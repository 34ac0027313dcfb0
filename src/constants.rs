/// 无法确定输入大小 (如标准输入) 时，单次读取的默认字节数。
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// 每个像素的首个通道字节中，用于隐写的两个最低有效位。
pub const LOW_BITS_MASK: u8 = 0x03;

/// 保留高六位的掩码，写入时先清空低两位。
pub const HIGH_BITS_MASK: u8 = 0xFC;

/// 终止符：低两位为 `0b10` 的像素表示消息已经结束。
/// 数据位只会取 `0` 或 `1`，因此终止符不会与数据冲突。
pub const TERMINATOR: u8 = 0x02;

/// AES-128 的密钥长度 (字节)。
pub const AES_KEY_LEN: usize = 16;

/// AES-128 的分组长度 (字节)。注意单位是字节而不是比特。
pub const AES_BLOCK_LEN: usize = 16;

/// 初始化向量长度 (字节)，与分组长度一致。
pub const AES_IV_LEN: usize = 16;
