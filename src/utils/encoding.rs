//! Tolerant text reading for context documents.
//!
//! Repository files are read for inclusion in prompts, so a file in a legacy
//! encoding should still render as text instead of failing the whole stage.
//! Binary files are detected up front and left out.

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const SAMPLE_SIZE: usize = 8192;

/// Detect if a file is binary: a null byte, or fewer than 70% printable bytes
/// in the leading sample. Unreadable files count as binary.
pub fn is_binary_file(path: &Path) -> bool {
    sample_file(path).map(|sample| looks_binary(&sample)).unwrap_or(true)
}

fn sample_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut sample = vec![0u8; SAMPLE_SIZE];
    let bytes_read = file.read(&mut sample)?;
    sample.truncate(bytes_read);
    Ok(sample)
}

fn looks_binary(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    let printable = sample
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || b == 9 || b == 10 || b == 13 || b >= 0x80)
        .count();
    (printable as f64 / sample.len() as f64) < 0.70
}

/// Read a file as text.
///
/// Strict UTF-8 first (BOM stripped), then the encoding guessed by chardetng
/// with replacement characters for anything undecodable.
pub fn read_file_safe(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    let body = bytes.strip_prefix(&[0xef, 0xbb, 0xbf][..]).unwrap_or(&bytes);
    if let Ok(text) = std::str::from_utf8(body) {
        return Ok(text.to_string());
    }

    let encoding = detect_encoding(&bytes);
    let (decoded, used, _had_errors) = encoding.decode(&bytes);
    tracing::debug!("Decoded {} as {}", path.display(), used.name());
    Ok(decoded.into_owned())
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    let sample = &bytes[..bytes.len().min(SAMPLE_SIZE)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    detector.guess(None, true)
}
