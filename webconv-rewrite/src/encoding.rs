//! Source encoding detection.
//!
//! Mirrored sites are frequently legacy pages with missing or wrong charset
//! labels. Detection therefore ignores declarations entirely and probes the
//! raw bytes against an ordered list of candidate encodings, accepting the
//! first one that decodes the whole buffer without a single error.
use std::borrow::Cow;

use encoding_rs::{BIG5, Encoding, GB18030, GBK, UTF_8, WINDOWS_1252};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Label reported for buffers that started with a UTF-8 byte-order mark.
pub const UTF8_BOM_LABEL: &str = "UTF-8 with BOM";

/// Label reported when no candidate decoded cleanly.
pub const LOSSY_LABEL: &str = "UTF-8 (with replacement)";

/// A candidate encoding together with the name it is reported under.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
  pub label:    &'static str,
  pub encoding: &'static Encoding,
}

impl Candidate {
  #[must_use]
  pub const fn new(label: &'static str, encoding: &'static Encoding) -> Self {
    Self { label, encoding }
  }
}

/// Candidates used for page content, in probing order.
///
/// GB2312 is decoded by the GBK decoder and Latin-1 by the windows-1252
/// decoder, which is how `encoding_rs` resolves those labels.
pub const DEFAULT_CANDIDATES: &[Candidate] = &[
  Candidate::new("UTF-8", UTF_8),
  Candidate::new("GBK", GBK),
  Candidate::new("GB2312", GBK),
  Candidate::new("GB18030", GB18030),
  Candidate::new("Big5", BIG5),
  Candidate::new("Latin-1", WINDOWS_1252),
];

/// Shorter list used for the mirror tool's console output.
pub const CONSOLE_CANDIDATES: &[Candidate] = &[
  Candidate::new("UTF-8", UTF_8),
  Candidate::new("GBK", GBK),
  Candidate::new("GB2312", GBK),
  Candidate::new("Latin-1", WINDOWS_1252),
];

/// Where decoded text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
  /// UTF-8 with a leading byte-order mark, which has been stripped.
  Utf8Bom,
  /// One of the probed candidates decoded the buffer without errors.
  Candidate(&'static str),
}

impl SourceEncoding {
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Utf8Bom => UTF8_BOM_LABEL,
      Self::Candidate(label) => label,
    }
  }
}

/// Outcome of decoding a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
  /// Decoded without any substitution.
  Clean {
    text:     String,
    encoding: SourceEncoding,
  },
  /// No candidate matched; undecodable bytes were replaced with U+FFFD.
  DecodedWithLoss { text: String },
}

impl Decoded {
  #[must_use]
  pub fn text(&self) -> &str {
    match self {
      Self::Clean { text, .. } | Self::DecodedWithLoss { text } => text,
    }
  }

  #[must_use]
  pub fn into_text(self) -> String {
    match self {
      Self::Clean { text, .. } | Self::DecodedWithLoss { text } => text,
    }
  }

  /// Human readable name of the detected encoding.
  #[must_use]
  pub const fn encoding_name(&self) -> &'static str {
    match self {
      Self::Clean { encoding, .. } => encoding.name(),
      Self::DecodedWithLoss { .. } => LOSSY_LABEL,
    }
  }

  #[must_use]
  pub const fn is_lossy(&self) -> bool {
    matches!(self, Self::DecodedWithLoss { .. })
  }
}

/// Probes raw bytes against an ordered candidate list.
#[derive(Debug, Clone, Copy)]
pub struct Detector {
  candidates: &'static [Candidate],
}

impl Default for Detector {
  fn default() -> Self {
    Self::new(DEFAULT_CANDIDATES)
  }
}

impl Detector {
  #[must_use]
  pub const fn new(candidates: &'static [Candidate]) -> Self {
    Self { candidates }
  }

  /// Decode `raw`, never failing.
  ///
  /// A UTF-8 BOM takes the fast path. Otherwise the first candidate that
  /// decodes the entire buffer wins, and if none does the buffer is decoded
  /// as UTF-8 with replacement characters.
  #[must_use]
  pub fn decode(&self, raw: &[u8]) -> Decoded {
    if let Some(rest) = raw.strip_prefix(UTF8_BOM)
      && let Some(text) = decode_strict(UTF_8, rest)
    {
      return Decoded::Clean {
        text:     text.into_owned(),
        encoding: SourceEncoding::Utf8Bom,
      };
    }

    for candidate in self.candidates {
      if let Some(text) = decode_strict(candidate.encoding, raw) {
        return Decoded::Clean {
          text:     text.into_owned(),
          encoding: SourceEncoding::Candidate(candidate.label),
        };
      }
    }

    Decoded::DecodedWithLoss {
      text: String::from_utf8_lossy(raw).into_owned(),
    }
  }
}

fn decode_strict<'a>(
  encoding: &'static Encoding,
  raw: &'a [u8],
) -> Option<Cow<'a, str>> {
  encoding.decode_without_bom_handling_and_without_replacement(raw)
}

/// Decode `raw` with the default candidate list.
#[must_use]
pub fn detect_and_decode(raw: &[u8]) -> Decoded {
  Detector::default().decode(raw)
}

#[cfg(test)]
mod tests {
  use super::*;

  const UTF8_ONLY: &[Candidate] = &[Candidate::new("UTF-8", UTF_8)];

  #[test]
  fn test_plain_utf8() {
    let decoded = detect_and_decode("héllo wörld".as_bytes());
    assert_eq!(decoded.text(), "héllo wörld");
    assert_eq!(decoded.encoding_name(), "UTF-8");
    assert!(!decoded.is_lossy());
  }

  #[test]
  fn test_bom_is_stripped() {
    let decoded = detect_and_decode(b"\xEF\xBB\xBF<p>hi</p>");
    assert_eq!(decoded.text(), "<p>hi</p>");
    assert_eq!(decoded.encoding_name(), UTF8_BOM_LABEL);
  }

  #[test]
  fn test_gbk_bytes() {
    // "中文" in GBK
    let decoded = detect_and_decode(b"\xD6\xD0\xCE\xC4");
    assert_eq!(decoded.text(), "中文");
    assert_eq!(decoded.encoding_name(), "GBK");
  }

  #[test]
  fn test_latin1_catches_what_gbk_rejects() {
    // 0xFF is never a valid lead byte in GBK, GB18030 or Big5
    let decoded = detect_and_decode(b"caf\xE9 \xFF");
    assert_eq!(decoded.encoding_name(), "Latin-1");
    assert_eq!(decoded.text(), "café ÿ");
  }

  #[test]
  fn test_lossy_outcome_is_explicit() {
    let decoded = Detector::new(UTF8_ONLY).decode(b"ok \xFF\xFE end");
    assert!(decoded.is_lossy());
    assert_eq!(decoded.encoding_name(), LOSSY_LABEL);
    assert!(decoded.text().contains('\u{FFFD}'));
    assert!(decoded.text().starts_with("ok "));
  }

  #[test]
  fn test_bom_with_invalid_utf8_falls_back() {
    let decoded = Detector::new(UTF8_ONLY).decode(b"\xEF\xBB\xBF\xFF");
    assert!(decoded.is_lossy());
  }

  #[test]
  fn test_arbitrary_bytes_never_fail() {
    let inputs: [&[u8]; 5] = [
      b"",
      b"\x80\x81\x82",
      b"\xC3\x28",
      b"\xF0\x28\x8C\xBC",
      &[0xFF; 64],
    ];
    for input in inputs {
      let decoded = detect_and_decode(input);
      assert!(!decoded.encoding_name().is_empty());
      let lossy = Detector::new(UTF8_ONLY).decode(input);
      assert!(!lossy.encoding_name().is_empty());
    }
  }
}
