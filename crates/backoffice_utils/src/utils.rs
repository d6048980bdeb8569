use backoffice_error::UtilError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Storage backends return the ETag header quoted (`"abc123"`).
/// The finalize call expects the bare value.
pub fn strip_etag_quotes(raw: &str) -> String {
    raw.trim().trim_matches('"').to_string()
}

/// Broad category of an uploaded file, used by the api to pick a storage prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Images,
    Videos,
    Audio,
    Documents,
    Files,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Images => "images",
            FileCategory::Videos => "videos",
            FileCategory::Audio => "audio",
            FileCategory::Documents => "documents",
            FileCategory::Files => "files",
        }
    }

    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "bmp" | "heic" => {
                FileCategory::Images
            }
            "mp4" | "mov" | "webm" | "mkv" | "avi" | "m4v" => FileCategory::Videos,
            "mp3" | "wav" | "aac" | "flac" | "ogg" | "m4a" => FileCategory::Audio,
            "pdf" | "csv" | "txt" | "json" | "xlsx" | "xls" | "doc" | "docx" => {
                FileCategory::Documents
            }
            _ => FileCategory::Files,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(FileCategory::from_extension)
            .unwrap_or(FileCategory::Files)
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn file_name(path: &Path) -> Result<String, UtilError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or(UtilError::MissingFileName)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_etag_quotes() {
        assert_eq!(strip_etag_quotes("\"abc123\""), "abc123");
        assert_eq!(strip_etag_quotes(" \"E1\" "), "E1");
        assert_eq!(strip_etag_quotes("plain"), "plain");
    }

    #[test]
    fn test_file_category() {
        assert_eq!(
            FileCategory::from_path(Path::new("banner.PNG")),
            FileCategory::Images
        );
        assert_eq!(
            FileCategory::from_path(Path::new("teaser.mp4")),
            FileCategory::Videos
        );
        assert_eq!(
            FileCategory::from_path(Path::new("report.csv")),
            FileCategory::Documents
        );
        assert_eq!(
            FileCategory::from_path(Path::new("no_extension")),
            FileCategory::Files
        );
        assert_eq!(FileCategory::Images.to_string(), "images");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/a.png")).unwrap(), "a.png");
        assert!(file_name(Path::new("/")).is_err());
    }
}
