//! Logisim `v2.0 raw` memory images.

use std::io::{self, Write};

pub const RAW_HEADER: &str = "v2.0 raw";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("missing '{}' header", RAW_HEADER)]
    MissingHeader,
    #[error("line {line}: bad word '{text}'")]
    BadWord { line: usize, text: String },
    #[error("line {line}: value '{text}' does not fit in 16 bits")]
    TooWide { line: usize, text: String },
}

/// Header line, then one word per line as 4 uppercase hex digits. No newline
/// follows the last word.
pub fn write_raw_image<W: Write>(out: &mut W, words: &[u16]) -> io::Result<()> {
    out.write_all(RAW_HEADER.as_bytes())?;
    for w in words {
        write!(out, "\n{w:04X}")?;
    }
    out.flush()
}

pub fn raw_image_string(words: &[u16]) -> String {
    let mut buf = Vec::with_capacity(RAW_HEADER.len() + 5 * words.len());
    // Writing into a Vec cannot fail.
    let _ = write_raw_image(&mut buf, words);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Reads an image back. Words may be separated by any whitespace and use the
/// `count*word` run-length form; `#` starts a comment.
pub fn parse_raw_image(text: &str) -> Result<Vec<u16>, ImageError> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, first)) if first.trim() == RAW_HEADER => {}
        _ => return Err(ImageError::MissingHeader),
    }

    let mut words = Vec::new();
    for (i, line) in lines {
        let line_no = i + 1;
        let code = line.split('#').next().unwrap_or_default();
        for item in code.split_whitespace() {
            let bad = || ImageError::BadWord { line: line_no, text: item.to_string() };
            let (count, value) = match item.split_once('*') {
                Some((n, v)) => (n.parse::<usize>().map_err(|_| bad())?, v),
                None => (1, item),
            };
            let v = u32::from_str_radix(value, 16).map_err(|_| bad())?;
            let w = u16::try_from(v)
                .map_err(|_| ImageError::TooWide { line: line_no, text: item.to_string() })?;
            words.extend(std::iter::repeat(w).take(count));
        }
    }
    Ok(words)
}
