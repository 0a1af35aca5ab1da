//! Byte-to-text decoding for LTX files.
//!
//! Game data is a mix of UTF-8 and legacy single-byte code pages (mostly
//! windows-1251), usually without any marker.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Decode file contents to a `String`.
///
/// A BOM wins; valid UTF-8 is taken as is; anything else goes through
/// encoding detection.
pub fn decode(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}
