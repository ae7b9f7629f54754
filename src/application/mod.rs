pub mod command_builder;
pub mod dependency_prober;
pub mod download_coordinator;
pub mod job_runner;
pub mod output_filter;
pub mod presenter;
pub mod toolchain;

pub use dependency_prober::{DependencyProber, MediaToolStatus, ProbeReport};
pub use download_coordinator::DownloadCoordinator;
pub use job_runner::{JobRunner, OutputMode};
pub use presenter::{ChannelPresenter, Presenter, WorkerEvent};
pub use toolchain::{ToolCommand, Toolchain};
