use regex::Regex;

pub const EXPORT_SUFFIX: &str = "_analisis.csv";

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Derives a download filename from the source filename: the extension is
/// dropped, characters outside word/space/hyphen are removed, runs of
/// spaces and hyphens collapse to underscores, and the fixed suffix is
/// appended.
pub fn export_filename(source: &str) -> String {
    let base = source.rsplit_once('.').map(|(base, _)| base).unwrap_or(source);
    let base = Regex::new(r"[^\w\s-]")
        .map(|re| re.replace_all(base, "").into_owned())
        .unwrap_or_else(|_| base.to_string());
    let base = base.trim();
    let base = Regex::new(r"[-\s]+")
        .map(|re| re.replace_all(base, "_").into_owned())
        .unwrap_or_else(|_| base.to_string());
    format!("{}{}", base, EXPORT_SUFFIX)
}

/// Encodes a structured block for download as UTF-8 with a BOM, which is
/// what common spreadsheet tools need to pick the right encoding.
pub fn export_bytes(block: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + block.len());
    bytes.extend_from_slice(&UTF8_BOM);
    bytes.extend_from_slice(block.as_bytes());
    bytes
}
