//! シナリオ・マップ・解ファイルの読み書き
//!
//! パス `-` は標準入出力。拡張子 `.gz` のファイルは gzip として扱う。

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// ファイル全体を UTF-8 の文字列として読む
pub fn read_text<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let path = path.as_ref();
    let mut text = String::new();
    if is_stdio(path) {
        io::stdin().lock().read_to_string(&mut text)?;
    } else if is_gz(path) {
        GzDecoder::new(File::open(path)?).read_to_string(&mut text)?;
    } else {
        File::open(path)?.read_to_string(&mut text)?;
    }
    Ok(text)
}

/// 文字列をファイルに書く（既存のファイルは置き換える）
pub fn write_text<P: AsRef<Path>>(path: P, text: &str) -> io::Result<()> {
    let path = path.as_ref();
    if is_stdio(path) {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        return out.flush();
    }
    let file = File::create(path)?;
    if is_gz(path) {
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(text.as_bytes())?;
        enc.finish()?.sync_all()
    } else {
        let mut file = file;
        file.write_all(text.as_bytes())?;
        file.sync_all()
    }
}
