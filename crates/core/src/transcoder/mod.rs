//! Transcoder module for re-encoding audio files.
//!
//! This module provides the `Transcoder` trait and an FFmpeg-backed
//! implementation. A transcoder turns one source file into a freshly created
//! scratch artifact at the target codec and bitrate; it never modifies or
//! deletes the source.
//!
//! # Example
//!
//! ```ignore
//! use camps_core::transcoder::{AudioFormat, FfmpegTranscoder, Transcoder, TranscoderConfig};
//!
//! let transcoder = FfmpegTranscoder::new(TranscoderConfig::default(), AudioFormat::Mp3);
//! transcoder.validate().await?;
//!
//! let artifact = transcoder.transcode(Path::new("/music/track.flac"), 256).await?;
//! println!("Encoded {} bytes into {}", artifact.size_bytes, artifact.path.display());
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::TranscoderConfig;
pub use error::TranscodeError;
pub use ffmpeg::FfmpegTranscoder;
pub use traits::Transcoder;
pub use types::{Artifact, AudioFormat};
