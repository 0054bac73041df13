//! Error taxonomy for the conversion pipeline.
//!
//! Job-level errors abort only the file they belong to; the batch
//! records them and keeps going. Only [`ConvertError::Discovery`] and
//! [`ConvertError::WorkerPool`] are fatal to a batch run.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unknown device model `{0}` (expected one of M30T, H20T, H30T, M2EA)")]
    UnknownModel(String),

    #[error("invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("source buffer is empty")]
    EmptySource,

    #[error("temperature {0}°C does not fit the 16-bit fixed-point raster (±3276.7°C)")]
    PrecisionOverflow(f64),

    #[error("unsupported compression `{0}` (expected lzw, zip or none)")]
    UnsupportedCompression(String),

    #[error("failed to write `{}`: {reason}", .path.display())]
    WriteFailed { path: PathBuf, reason: String },

    #[error("vendor decoder unavailable: {0}")]
    VendorUnavailable(String),

    #[error("vendor decoder rejected input: {0}")]
    DecodeFailed(String),

    #[error("cannot scan input directory: {0}")]
    Discovery(#[from] walkdir::Error),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Pipeline stage a [`JobError`] originated from.
///
/// Resolution detection is absent on purpose: it falls back instead of
/// failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Read,
    Decode,
    Encode,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStage::Read => write!(f, "read"),
            JobStage::Decode => write!(f, "decode"),
            JobStage::Encode => write!(f, "encode"),
        }
    }
}

/// A [`ConvertError`] tagged with the stage and input it came from.
#[derive(Debug, Error)]
#[error("{stage} stage failed for `{}`: {source}", .path.display())]
pub struct JobError {
    pub stage: JobStage,
    pub path: PathBuf,
    #[source]
    pub source: ConvertError,
}

impl JobError {
    pub(crate) fn at(stage: JobStage, path: &std::path::Path) -> impl FnOnce(ConvertError) -> Self + '_ {
        move |source| JobError {
            stage,
            path: path.to_path_buf(),
            source,
        }
    }
}
