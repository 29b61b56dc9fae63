//! Media processing: probing, thumbnailing, transcoding.
//!
//! Every operation in this crate is best-effort from the pipeline's point
//! of view: probes return records with unset fields, derivative generators
//! return `Option`/`Result` that callers absorb into absent artifacts.
//! External tools (`ffprobe`, `ffmpeg`) run against scoped temp files that
//! are removed on all exit paths.

pub mod audio;
pub mod image;
pub mod probe;
pub mod video;

pub use audio::AudioAnalyzer;
pub use probe::{AudioProbe, Prober, VideoProbe};
pub use video::VideoTranscoder;
