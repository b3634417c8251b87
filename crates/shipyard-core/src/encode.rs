//! File-encoding adapter: uploaded files become `data:` URLs so they can
//! live inside a stored document. A failed encode aborts the surrounding
//! operation before any state changes.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::error::EncodeError;

pub fn encode_file(path: &Path) -> Result<String, EncodeError> {
    let bytes = std::fs::read(path).map_err(|source| EncodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    encode_bytes(&bytes, content_type_for(path))
}

pub fn encode_bytes(bytes: &[u8], content_type: &str) -> Result<String, EncodeError> {
    if bytes.is_empty() {
        return Err(EncodeError::Empty);
    }
    Ok(format!("data:{};base64,{}", content_type, B64.encode(bytes)))
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_become_a_data_url() {
        let url = encode_bytes(b"abc", "image/png").unwrap();
        assert_eq!(url, "data:image/png;base64,YWJj");
    }

    #[test]
    fn empty_payloads_fail() {
        assert!(matches!(encode_bytes(b"", "image/png"), Err(EncodeError::Empty)));
    }

    #[test]
    fn missing_files_fail_with_the_path() {
        let err = encode_file(Path::new("/no/such/file.png")).unwrap_err();
        assert!(matches!(err, EncodeError::Read { .. }));
    }
}
