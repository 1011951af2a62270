use std::fs;
use std::path::Path;

use omf_core::errors::{ErrorInfo, OmfError};
use serde::de::DeserializeOwned;
use serde::Serialize;

fn at(info: ErrorInfo, path: &Path) -> ErrorInfo {
    info.with_context("path", path.display().to_string())
}

/// Decodes a JSON document (requests, histograms, manifests) from disk.
///
/// A missing or unreadable file is `Io` with code `json-read`; malformed or
/// invalid content is `Serde` with code `json-parse`.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, OmfError> {
    let contents = fs::read_to_string(path)
        .map_err(|err| OmfError::Io(at(ErrorInfo::new("json-read", err.to_string()), path)))?;
    serde_json::from_str(&contents)
        .map_err(|err| OmfError::Serde(at(ErrorInfo::new("json-parse", err.to_string()), path)))
}

/// Pretty-prints `value` to `path`, creating missing parent directories.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), OmfError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            OmfError::Io(at(ErrorInfo::new("json-mkdir", err.to_string()), parent))
        })?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| OmfError::Serde(at(ErrorInfo::new("json-encode", err.to_string()), path)))?;
    fs::write(path, json)
        .map_err(|err| OmfError::Io(at(ErrorInfo::new("json-write", err.to_string()), path)))
}
