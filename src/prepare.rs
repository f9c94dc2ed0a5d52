//! Input file preparation, run by the binary before a session starts.
//!
//! Sessions never open the data file themselves; these helpers make sure the
//! path handed to the tool is UTF-8 and work out which delimiter it uses.

use crate::error::PrepareError;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Bytes sampled when checking the encoding.
const ENCODING_SAMPLE_BYTES: usize = 4096;
/// Lines sampled when sniffing the delimiter.
const DELIMITER_SAMPLE_LINES: usize = 5;
/// Candidate delimiters, in tie-break order.
const DELIMITER_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Detected source encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Utf8Bom,
    Latin1,
}

impl SourceEncoding {
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Bom => "utf-8-sig",
            Self::Latin1 => "latin-1",
        }
    }
}

/// The file the tool should read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInput {
    pub path: PathBuf,
    pub encoding: SourceEncoding,
    /// True when `path` is a freshly written UTF-8 copy.
    pub converted: bool,
}

/// Make sure `path` is UTF-8, writing a `<stem>.utf8.<ext>` copy if not.
pub fn ensure_utf8(path: &Path) -> Result<PreparedInput, PrepareError> {
    if !path.is_file() {
        return Err(PrepareError::NotFound(path.display().to_string()));
    }

    let mut sample = Vec::with_capacity(ENCODING_SAMPLE_BYTES);
    File::open(path)?
        .take(ENCODING_SAMPLE_BYTES as u64)
        .read_to_end(&mut sample)?;

    if let Some(encoding) = sniff_utf8(&sample) {
        tracing::debug!(path = %path.display(), encoding = encoding.label(), "input is utf-8");
        return Ok(PreparedInput {
            path: path.to_path_buf(),
            encoding,
            converted: false,
        });
    }

    let bytes = std::fs::read(path)?;
    let converted: String = bytes.iter().map(|&b| char::from(b)).collect();
    let target = utf8_sibling(path);
    std::fs::write(&target, converted)?;
    tracing::info!(
        from = %path.display(),
        to = %target.display(),
        "converted latin-1 input to utf-8"
    );
    Ok(PreparedInput {
        path: target,
        encoding: SourceEncoding::Latin1,
        converted: true,
    })
}

/// UTF-8 check that tolerates a multi-byte sequence cut by the sample end.
fn sniff_utf8(sample: &[u8]) -> Option<SourceEncoding> {
    let (body, encoding) = match sample.strip_prefix(UTF8_BOM) {
        Some(rest) => (rest, SourceEncoding::Utf8Bom),
        None => (sample, SourceEncoding::Utf8),
    };
    match std::str::from_utf8(body) {
        Ok(_) => Some(encoding),
        // `error_len() == None` means the input ended mid-sequence.
        Err(e) if e.error_len().is_none() && sample.len() >= ENCODING_SAMPLE_BYTES => {
            Some(encoding)
        }
        Err(_) => None,
    }
}

/// `data/a.csv` -> `data/a.utf8.csv`.
fn utf8_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.utf8.{}", ext.to_string_lossy()),
        None => format!("{stem}.utf8"),
    };
    path.with_file_name(name)
}

/// Sniff the delimiter from the first few lines of `path`.
///
/// Prefers a candidate that appears the same non-zero number of times on
/// every sampled line, then the most frequent candidate, then `,`.
pub fn detect_delimiter(path: &Path) -> Result<char, PrepareError> {
    if !path.is_file() {
        return Err(PrepareError::NotFound(path.display().to_string()));
    }
    let mut reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    while lines.len() < DELIMITER_SAMPLE_LINES {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    let delimiter = sniff_delimiter(&lines);
    tracing::debug!(path = %path.display(), delimiter = ?delimiter, "detected delimiter");
    Ok(delimiter)
}

fn sniff_delimiter(lines: &[String]) -> char {
    if lines.is_empty() {
        return ',';
    }

    let mut consistent: Option<(char, usize)> = None;
    let mut busiest: Option<(char, usize)> = None;
    for candidate in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| line.matches(candidate).count())
            .collect();
        let first = counts[0];
        if first > 0
            && counts.iter().all(|&c| c == first)
            && consistent.map_or(true, |(_, best)| first > best)
        {
            consistent = Some((candidate, first));
        }
        let total: usize = counts.iter().sum();
        if total > 0 && busiest.map_or(true, |(_, best)| total > best) {
            busiest = Some((candidate, total));
        }
    }

    consistent.or(busiest).map_or(',', |(c, _)| c)
}

/// Parse a user-supplied delimiter.
///
/// Accepts one character, the escapes `\t` / `\\t`, or the names `tab`,
/// `comma`, `semicolon` and `pipe`.
pub fn parse_delimiter_arg(raw: &str) -> Result<char, PrepareError> {
    match raw {
        "\\t" | "\\\\t" => return Ok('\t'),
        _ => {}
    }
    match raw.to_ascii_lowercase().as_str() {
        "tab" => return Ok('\t'),
        "comma" => return Ok(','),
        "semicolon" => return Ok(';'),
        "pipe" => return Ok('|'),
        _ => {}
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(PrepareError::InvalidDelimiter(raw.to_string())),
    }
}
