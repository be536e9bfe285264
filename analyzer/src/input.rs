use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use logtally_shared::{log_debug, LogCategory};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// 標準入力を表すパス
pub const STDIN_PATH: &str = "-";

/// ファイルを開く。`.gz` は展開しながら読む
pub fn reader(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == STDIN_PATH {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    if path.extension() == Some(OsStr::new("gz")) {
        log_debug!(LogCategory::Input, "reading gzip {}", path.display());
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        log_debug!(LogCategory::Input, "reading {}", path.display());
        Ok(Box::new(BufReader::new(file)))
    }
}

/// 行をすべて読み込む
pub fn read_lines<R: BufRead>(reader: R, source: &str) -> Result<Vec<String>> {
    reader
        .lines()
        .collect::<io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read lines from {source}"))
}

/// 複数の入力を1本のストリームとして連結して読む
///
/// パスが空なら標準入力。
pub fn read_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<String>> {
    if paths.is_empty() {
        return read_lines(io::stdin().lock(), "<stdin>");
    }

    let mut lines = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let source = path.display().to_string();
        lines.extend(read_lines(reader(path)?, &source)?);
    }
    Ok(lines)
}
