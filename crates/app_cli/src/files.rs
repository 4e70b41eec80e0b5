use std::path::Path;

use anyhow::Context;
use core_types::UploadCandidate;

const FALLBACK_TYPE: &str = "application/octet-stream";

/// Reads a local file into an upload candidate, declaring its type from the extension.
pub async fn candidate_from_path(path: &Path) -> anyhow::Result<UploadCandidate> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadCandidate::new(filename, declared_type(path), bytes))
}

fn declared_type(path: &Path) -> &'static str {
    mime_guess::from_path(path).first_raw().unwrap_or(FALLBACK_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pdf_extension_declares_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Guide.PDF");
        std::fs::write(&path, b"%PDF-1.7").expect("write");

        let candidate = candidate_from_path(&path).await.expect("read");
        assert_eq!(candidate.filename, "Guide.PDF");
        assert_eq!(candidate.declared_type, "application/pdf");
        assert_eq!(candidate.bytes, b"%PDF-1.7");
        assert!(candidate.declares_accepted_type());
    }

    #[test]
    fn unknown_extension_falls_back() {
        assert_eq!(declared_type(Path::new("blob")), FALLBACK_TYPE);
        assert_eq!(declared_type(Path::new("notes.txt")), "text/plain");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = candidate_from_path(&dir.path().join("gone.pdf"))
            .await
            .expect_err("missing file");
        assert!(err.to_string().contains("gone.pdf"));
    }
}
