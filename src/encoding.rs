// Copyright 2026 the v8shim authors. All rights reserved. MIT license.

//! Conversions between the engine's two-byte (UTF-16) representation and
//! the byte encodings the embedding API accepts and produces.

const REPLACEMENT: char = '\u{FFFD}';

/// Decodes UTF-8 into UTF-16 code units. Invalid sequences are replaced
/// with U+FFFD, so this never fails and never truncates.
pub(crate) fn utf8_to_two_byte(bytes: &[u8]) -> Vec<u16> {
  String::from_utf8_lossy(bytes).encode_utf16().collect()
}

/// Inflates Latin-1 bytes into a NUL-terminated two-byte buffer: `n` input
/// bytes become `n + 1` units, each byte zero-extended, with a trailing 0.
/// Latin-1 code points coincide with the first 256 Unicode scalars, so
/// zero-extension is the whole conversion.
pub(crate) fn one_byte_to_two_byte(bytes: &[u8]) -> Box<[u16]> {
  let mut units = Vec::with_capacity(bytes.len() + 1);
  units.extend(bytes.iter().map(|&b| u16::from(b)));
  units.push(0);
  units.into_boxed_slice()
}

/// The exact number of bytes the UTF-8 encoding of `units` occupies.
/// Unpaired surrogates count 3 bytes, matching both their WTF-8 encoding
/// and the U+FFFD that replaces them under strict output.
pub(crate) fn two_byte_utf8_length(units: &[u16]) -> usize {
  let mut total = 0;
  let mut i = 0;
  while i < units.len() {
    let u = units[i];
    if is_lead_surrogate(u)
      && i + 1 < units.len()
      && is_trail_surrogate(units[i + 1])
    {
      // A surrogate pair encodes a supplementary code point in 4 bytes.
      total += 4;
      i += 2;
      continue;
    }
    total += match u {
      0..=0x7F => 1,
      0x80..=0x7FF => 2,
      _ => 3,
    };
    i += 1;
  }
  total
}

/// Encodes `units` as UTF-8 into `out`, stopping before the first code
/// point that does not fit. Only whole code points are written; surrogate
/// pairs are never split across the buffer boundary. Returns the number of
/// bytes written.
///
/// Unpaired surrogates are written in their 3-byte WTF-8 form unless
/// `replace_invalid` is set, in which case they become U+FFFD (also 3
/// bytes), keeping the output valid UTF-8.
pub(crate) fn deflate_two_byte_to_utf8(
  units: &[u16],
  out: &mut [u8],
  replace_invalid: bool,
) -> usize {
  let mut written = 0;
  let mut i = 0;
  while i < units.len() {
    let u = units[i];
    let (cp, consumed) = if is_lead_surrogate(u)
      && i + 1 < units.len()
      && is_trail_surrogate(units[i + 1])
    {
      let high = u32::from(u) - 0xD800;
      let low = u32::from(units[i + 1]) - 0xDC00;
      (0x10000 + (high << 10) + low, 2)
    } else if is_surrogate(u) && replace_invalid {
      (u32::from(REPLACEMENT as u16), 1)
    } else {
      (u32::from(u), 1)
    };
    let n = encode_code_point(cp, &mut out[written..]);
    if n == 0 {
      break;
    }
    written += n;
    i += consumed;
  }
  written
}

/// Writes one code point into `out`; 0 means it did not fit. `cp` may be a
/// lone surrogate, which is emitted in the generic 3-byte pattern.
fn encode_code_point(cp: u32, out: &mut [u8]) -> usize {
  match cp {
    0..=0x7F => {
      if out.is_empty() {
        return 0;
      }
      out[0] = cp as u8;
      1
    }
    0x80..=0x7FF => {
      if out.len() < 2 {
        return 0;
      }
      out[0] = 0xC0 | (cp >> 6) as u8;
      out[1] = 0x80 | (cp & 0x3F) as u8;
      2
    }
    0x800..=0xFFFF => {
      if out.len() < 3 {
        return 0;
      }
      out[0] = 0xE0 | (cp >> 12) as u8;
      out[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
      out[2] = 0x80 | (cp & 0x3F) as u8;
      3
    }
    _ => {
      if out.len() < 4 {
        return 0;
      }
      out[0] = 0xF0 | (cp >> 18) as u8;
      out[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
      out[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
      out[3] = 0x80 | (cp & 0x3F) as u8;
      4
    }
  }
}

fn is_lead_surrogate(u: u16) -> bool {
  (0xD800..=0xDBFF).contains(&u)
}

fn is_trail_surrogate(u: u16) -> bool {
  (0xDC00..=0xDFFF).contains(&u)
}

fn is_surrogate(u: u16) -> bool {
  (0xD800..=0xDFFF).contains(&u)
}
