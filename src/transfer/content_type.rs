//! Content-type guessing for uploads.
//!
//! The first 512 bytes are matched against well-known signatures and then
//! classified as text or binary. Generic answers are refined from the file
//! extension.

use std::io::{self, Read, Seek};
use std::path::Path;

const SNIFF_LEN: u64 = 512;

const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_UTF8: &str = "text/plain; charset=utf-8";

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"BM", "image/bmp"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b\x08", "application/x-gzip"),
    (b"Rar!\x1a\x07\x00", "application/x-rar-compressed"),
    (b"OggS\x00", "application/ogg"),
    (b"\x00asm", "application/wasm"),
    (b"\xfe\xff", "text/plain; charset=utf-16be"),
    (b"\xff\xfe", "text/plain; charset=utf-16le"),
    (b"\xef\xbb\xbf", TEXT_UTF8),
];

/// Guess the MIME type of `reader`, leaving it positioned at the start.
pub(crate) fn guess_content_type<R: Read + Seek>(reader: &mut R, path: &Path) -> io::Result<String> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    reader.by_ref().take(SNIFF_LEN).read_to_end(&mut head)?;
    reader.rewind()?;

    let sniffed = sniff(&head);
    if sniffed != OCTET_STREAM && sniffed != TEXT_UTF8 {
        return Ok(sniffed.to_owned());
    }
    Ok(mime_guess::from_path(path)
        .first()
        .map_or_else(|| sniffed.to_owned(), |mime| mime.to_string()))
}

/// Like [`guess_content_type`], but a read failure leaves the type unset
/// instead of failing the upload. The reader is rewound either way.
pub(crate) fn content_type_or_none<R: Read + Seek>(reader: &mut R, path: &Path) -> Option<String> {
    match guess_content_type(reader, path) {
        Ok(mime) => Some(mime),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not guess content type");
            if let Err(e) = reader.rewind() {
                tracing::debug!(path = %path.display(), error = %e, "rewind after failed guess");
            }
            None
        }
    }
}

fn sniff(head: &[u8]) -> &'static str {
    if let Some((_, mime)) = SIGNATURES.iter().find(|(sig, _)| head.starts_with(sig)) {
        return mime;
    }
    if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        return "image/webp";
    }

    let trimmed = head.trim_ascii_start();
    if starts_with_ignore_case(trimmed, b"<!DOCTYPE HTML") || starts_with_ignore_case(trimmed, b"<html")
    {
        return "text/html; charset=utf-8";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if head.iter().any(|&b| is_binary_byte(b)) {
        OCTET_STREAM
    } else {
        TEXT_UTF8
    }
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}
