pub mod error;
pub mod model;

pub use error::{Advisory, AppError};
pub use model::{
    BatchOutcome, BatchSummary, Browser, DownloadOptions, DownloadPhase, FormatPreference,
    JobOutcome, JobProgress, JobResult, LogLevel, LogLine, Resolution, StreamKind,
};
