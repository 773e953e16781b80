use std::path::{Path, PathBuf};

use anyhow::Context;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Decodes a saved template. A BOM decides the encoding; otherwise UTF-8, falling back to
/// Windows-1252 for legacy exports that are not valid UTF-8.
pub fn decode_html(bytes: &[u8]) -> (String, &'static Encoding) {
    if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = enc.decode_without_bom_handling(&bytes[bom_len..]);
        return (text.into_owned(), enc);
    }
    match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => (text.into_owned(), UTF_8),
        None => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text.into_owned(), WINDOWS_1252)
        }
    }
}

pub fn read_html(path: &Path) -> anyhow::Result<(String, &'static Encoding)> {
    let bytes = std::fs::read(path).with_context(|| format!("read html: {}", path.display()))?;
    Ok(decode_html(&bytes))
}

pub fn write_html(path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("write html: {}", path.display()))?;
    Ok(())
}

/// `<dir>/<stem><suffix>.<ext>` next to `input`.
pub fn sibling_path(input: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("template");
    input.with_file_name(format!("{stem}{suffix}.{ext}"))
}
