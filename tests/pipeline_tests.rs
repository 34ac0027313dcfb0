use rand::RngCore;
use std::io;
use stegcrypt::{
    diagnostics::RecordingDiagnostics,
    error::{CipherError, PipelineError, TranscodeError},
    pipeline::{Decoder, Encoder, Transcoding},
    steganography::PixelBuffer,
    stream::{MemorySource, Sink},
};

const KEY: &[u8; 16] = b"0123456789abcdef";
const IV: &[u8; 16] = b"fedcba9876543210";

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

fn encode(plaintext: &[u8], transcoding: Transcoding) -> Result<Vec<u8>, PipelineError> {
    let diagnostics = RecordingDiagnostics::new();
    let mut sink = Vec::new();
    Encoder::open(KEY, IV, transcoding, &diagnostics)?
        .run(&mut MemorySource::new(plaintext), &mut sink)?;
    Ok(sink)
}

fn decode(payload: &[u8], transcoding: Transcoding) -> Result<Vec<u8>, PipelineError> {
    let diagnostics = RecordingDiagnostics::new();
    let mut sink = Vec::new();
    Decoder::open(KEY, IV, transcoding, &diagnostics)?
        .run(&mut MemorySource::new(payload), &mut sink)?;
    Ok(sink)
}

fn padded(plaintext: &[u8]) -> Vec<u8> {
    let mut padded = plaintext.to_vec();
    padded.resize(plaintext.len().div_ceil(16) * 16, 0);
    padded
}

/// 总是只接受部分数据的数据汇
struct ShortSink;

impl Sink for ShortSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        Ok(bytes.len() / 2)
    }
}

#[test]
fn hello_round_trip_with_base64() -> Result<(), PipelineError> {
    let payload = encode(b"hello", Transcoding::Base64)?;
    // 16 字节密文 → ceil(16 / 3) * 4 个符号
    assert_eq!(payload.len(), 24);

    let recovered = decode(&payload, Transcoding::Base64)?;
    assert_eq!(recovered.len(), 16);
    assert_eq!(&recovered[..5], b"hello");
    assert!(recovered[5..].iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn raw_round_trip_restores_padded_plaintext() -> Result<(), PipelineError> {
    for len in [1, 15, 16, 17, 1000] {
        let plaintext = random_bytes(len);
        let payload = encode(&plaintext, Transcoding::Raw)?;
        assert_eq!(payload.len(), len.div_ceil(16) * 16);

        assert_eq!(decode(&payload, Transcoding::Raw)?, padded(&plaintext));
    }
    Ok(())
}

#[test]
fn base64_round_trip_for_various_lengths() -> Result<(), PipelineError> {
    for len in [1, 16, 31, 48, 333] {
        let plaintext = random_bytes(len);
        let payload = encode(&plaintext, Transcoding::Base64)?;
        assert_eq!(payload.len(), (len.div_ceil(16) * 16).div_ceil(3) * 4);

        assert_eq!(decode(&payload, Transcoding::Base64)?, padded(&plaintext));
    }
    Ok(())
}

#[test]
fn source_without_size_reads_default_chunk() -> Result<(), PipelineError> {
    let diagnostics = RecordingDiagnostics::new();
    let plaintext = b"message from a source of unknown size";

    let mut payload = Vec::new();
    Encoder::open(KEY, IV, Transcoding::Raw, &diagnostics)?
        .run(&mut MemorySource::without_size(&plaintext[..]), &mut payload)?;

    let mut recovered = Vec::new();
    Decoder::open(KEY, IV, Transcoding::Raw, &diagnostics)?
        .run(&mut MemorySource::without_size(payload), &mut recovered)?;

    assert_eq!(recovered, padded(plaintext));
    Ok(())
}

#[test]
fn empty_input_is_rejected_in_both_directions() {
    let diagnostics = RecordingDiagnostics::new();

    let encoder = Encoder::open(KEY, IV, Transcoding::Base64, &diagnostics).unwrap();
    let result = encoder.run(&mut MemorySource::new(Vec::<u8>::new()), &mut Vec::<u8>::new());
    assert!(matches!(result, Err(PipelineError::EmptyInput)));

    let decoder = Decoder::open(KEY, IV, Transcoding::Raw, &diagnostics).unwrap();
    let result = decoder.run(&mut MemorySource::without_size(Vec::<u8>::new()), &mut Vec::<u8>::new());
    assert!(matches!(result, Err(PipelineError::EmptyInput)));

    let lines = diagnostics.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.starts_with("Error: read")));
}

#[test]
fn invalid_symbol_fails_transcoding() {
    let mut payload = encode(b"some secret text", Transcoding::Base64).unwrap();
    payload[5] = b'!';

    let result = decode(&payload, Transcoding::Base64);
    assert!(matches!(
        result,
        Err(PipelineError::Transcode(TranscodeError::InvalidSymbol {
            symbol: b'!',
            position: 5
        }))
    ));
}

#[test]
fn unaligned_raw_payload_is_rejected() {
    let result = decode(&[0u8; 20], Transcoding::Raw);
    assert!(matches!(
        result,
        Err(PipelineError::BlockAlignment {
            len: 20,
            block_len: 16
        })
    ));
}

#[test]
fn base64_payload_shorter_than_a_block_is_rejected() {
    // 4 个符号只能解码出 3 个字节，不足一个分组
    let result = decode(b"QUJD", Transcoding::Base64);
    assert!(matches!(
        result,
        Err(PipelineError::BlockAlignment {
            len: 3,
            block_len: 16
        })
    ));
}

#[test]
fn short_key_fails_cipher_init() {
    let diagnostics = RecordingDiagnostics::new();
    let result = Encoder::open(b"short", IV, Transcoding::Raw, &diagnostics);

    assert!(matches!(
        result,
        Err(PipelineError::CipherFailure(CipherError::Init(_)))
    ));
    assert!(diagnostics.lines()[0].starts_with("Error: cipher init"));
}

#[test]
fn short_write_is_a_sink_failure() {
    let diagnostics = RecordingDiagnostics::new();
    let encoder = Encoder::open(KEY, IV, Transcoding::Raw, &diagnostics).unwrap();

    let result = encoder.run(&mut MemorySource::new(&b"data"[..]), &mut ShortSink);
    match result {
        Err(PipelineError::SinkWrite(err)) => assert_eq!(err.kind(), io::ErrorKind::WriteZero),
        other => panic!("expected a sink write failure, got {other:?}"),
    }
    assert!(diagnostics.lines()[0].starts_with("Error: write"));
}

#[test]
fn pixels_carry_the_message_end_to_end() -> Result<(), PipelineError> {
    let diagnostics = RecordingDiagnostics::new();
    let plaintext = b"hidden inside the pixels";

    for transcoding in [Transcoding::Raw, Transcoding::Base64] {
        let mut pixels = PixelBuffer::from_raw(40, 30, 4, random_bytes(40 * 30 * 4)).unwrap();

        Encoder::open(KEY, IV, transcoding, &diagnostics)?
            .run(&mut MemorySource::new(&plaintext[..]), &mut pixels)?;

        let mut recovered = Vec::new();
        Decoder::open(KEY, IV, transcoding, &diagnostics)?.run(&mut pixels, &mut recovered)?;

        assert_eq!(recovered, padded(plaintext));
    }
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn pixels_without_room_fail_the_sink_write() {
    let diagnostics = RecordingDiagnostics::new();
    let mut pixels = PixelBuffer::from_raw(10, 10, 3, vec![0u8; 300]).unwrap();
    let original = pixels.clone();

    let encoder = Encoder::open(KEY, IV, Transcoding::Raw, &diagnostics).unwrap();
    let result = encoder.run(&mut MemorySource::new(&b"this needs 32 bytes"[..]), &mut pixels);

    assert!(matches!(result, Err(PipelineError::SinkWrite(_))));
    assert_eq!(pixels, original);
}
