//! Shared types used by both the pipeline and the resolver.
//!
//! These are serialized into the image manifest and must stay stable: the
//! resolver reads whatever the pipeline wrote.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoded output format of a variant.
///
/// The manifest spells these `"webp"` and `"jpg"`. WebP is the modern format
/// used for `srcset`; JPEG is the broad-compatibility fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Webp,
    Jpg,
}

impl OutputFormat {
    /// Every output format, in the order variants are generated for one width.
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Webp, OutputFormat::Jpg];

    /// File extension written for this format (no leading dot).
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Jpg => "jpg",
        }
    }

    /// Largest width or height the encoder accepts.
    pub fn max_dimension(self) -> u32 {
        match self {
            OutputFormat::Webp => 16383,
            OutputFormat::Jpg => u16::MAX as u32,
        }
    }

    /// MIME type, as used in a `<source type=...>` attribute.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Jpg => "image/jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
