//! Upload and output file naming

use std::path::Path;

/// Eight lowercase hex characters
pub fn random_token() -> String {
    hex::encode(rand::random::<[u8; 4]>())
}

/// `<token>_<basename>`; directory parts of the client filename are dropped
pub fn upload_file_name(token: &str, client_name: &str) -> String {
    let base = Path::new(client_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "upload".to_string());
    format!("{}_{}", token, base)
}

/// `<upload stem><suffix>.<extension>`
pub fn output_file_name(upload_name: &str, suffix: &str, extension: &str) -> String {
    let stem = Path::new(upload_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| upload_name.to_string());
    format!("{}{}.{}", stem, suffix, extension)
}
