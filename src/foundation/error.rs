use std::path::{Path, PathBuf};

/// Result alias used across the crate.
pub type MergeResult<T> = Result<T, MergeError>;

/// Every failure the merge pipeline reports to its caller.
///
/// Per-layer problems (unresolved pattern, missing file, undecodable image or
/// color) are normally recovered by dropping the layer; they only surface as
/// values of this type from the lower-level entry points such as
/// [`crate::decode_image`] or [`crate::Rgba8::from_hex`].
#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    /// Malformed, wrong-typed or semantically invalid settings.
    #[error("invalid settings: {0}")]
    ConfigInvalid(String),

    /// Every declared layer was unresolved or missing on disk.
    #[error("no source images could be resolved ({declared} declared)")]
    NoSourceImagesResolved {
        /// Number of layers declared in the settings.
        declared: usize,
    },

    /// A hex color string too short (or not hex) to decode.
    #[error("color format error in {field}: '{input}' needs 6 trailing hex digits")]
    ColorFormat {
        /// Where the color came from, e.g. `sourceImages[1].shadowColor`.
        field: String,
        /// The offending input.
        input: String,
    },

    /// Image decode or encode failure on a specific file.
    #[error("codec error for '{}': {message}", path.display())]
    Codec {
        /// File being decoded or encoded.
        path: PathBuf,
        /// Codec-provided description.
        message: String,
    },

    /// File-system failure outside the codec.
    #[error("io error for '{}': {source}", path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MergeError {
    pub fn config_invalid(msg: impl Into<String>) -> Self {
        Self::ConfigInvalid(msg.into())
    }

    pub fn color_format(field: impl Into<String>, input: impl Into<String>) -> Self {
        Self::ColorFormat {
            field: field.into(),
            input: input.into(),
        }
    }

    pub fn codec(path: impl AsRef<Path>, msg: impl ToString) -> Self {
        Self::Codec {
            path: path.as_ref().to_path_buf(),
            message: msg.to_string(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Re-label a [`MergeError::ColorFormat`] with the settings field it came from.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        match self {
            Self::ColorFormat { input, .. } => Self::ColorFormat {
                field: field.into(),
                input,
            },
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
