//! Per-file eligibility decisions.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::tags::TagAccessor;
use crate::transcoder::AudioFormat;

/// Extensions accepted as conversion sources, besides the target format's own.
pub const SOURCE_EXTENSIONS: [&str; 8] = ["wav", "flac", "ogg", "aac", "m4a", "wma", "alac", "aiff"];

/// What the pipeline should do with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Convert,
    SkipWrongExtension,
    SkipAlreadyCompliant,
    SkipLowerThanTarget,
}

impl Eligibility {
    pub fn is_skip(&self) -> bool {
        !matches!(self, Self::Convert)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Convert => "convert",
            Self::SkipWrongExtension => "skip-wrong-extension",
            Self::SkipAlreadyCompliant => "skip-already-compliant",
            Self::SkipLowerThanTarget => "skip-lower-than-target",
        }
    }
}

/// Decides whether a file needs converting, without invoking the transcoder.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityInspector {
    target: AudioFormat,
    bitrate_kbps: u32,
}

impl EligibilityInspector {
    pub fn new(target: AudioFormat, bitrate_kbps: u32) -> Self {
        Self {
            target,
            bitrate_kbps,
        }
    }

    pub fn target(&self) -> AudioFormat {
        self.target
    }

    /// Whether `path` already has the target format's extension.
    pub fn is_target_format(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| ext == self.target.extension())
    }

    /// Classifies `path`. Reads the stream bitrate of target-format files.
    ///
    /// Blocking; call from the blocking pool.
    pub fn inspect(&self, accessor: &dyn TagAccessor, path: &Path) -> Eligibility {
        let Some(ext) = extension_of(path) else {
            return Eligibility::SkipWrongExtension;
        };

        if ext != self.target.extension() {
            return if SOURCE_EXTENSIONS.contains(&ext.as_str()) {
                Eligibility::Convert
            } else {
                Eligibility::SkipWrongExtension
            };
        }

        match accessor.read_bitrate(path) {
            Ok(kbps) if kbps == self.bitrate_kbps => Eligibility::SkipAlreadyCompliant,
            // Never upsample
            Ok(kbps) if kbps < self.bitrate_kbps => Eligibility::SkipLowerThanTarget,
            Ok(kbps) => {
                debug!(path = %path.display(), kbps, target = self.bitrate_kbps, "Above target bitrate");
                Eligibility::Convert
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Bitrate unreadable, re-encoding");
                Eligibility::Convert
            }
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
