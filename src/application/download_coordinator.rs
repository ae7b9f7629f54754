use std::sync::{Arc, OnceLock};

use tracing::{error, info};

use crate::application::dependency_prober::{DependencyProber, ProbeReport};
use crate::application::job_runner::{JobRunner, OutputMode};
use crate::application::presenter::{banner_lines, Presenter, NO_URLS_HELP};
use crate::application::toolchain::Toolchain;
use crate::domain::{AppError, BatchOutcome, DownloadOptions, LogLevel};

/// Owns the life cycle of a batch: probe once, prepare the output
/// directory, run every job, report.
#[derive(Clone)]
pub struct DownloadCoordinator {
    prober: DependencyProber,
    runner: JobRunner,
    probed: Arc<OnceLock<ProbeReport>>,
}

impl DownloadCoordinator {
    pub fn new(toolchain: Toolchain, output: OutputMode) -> Self {
        let runner = JobRunner::new(toolchain.downloader.clone(), output);
        Self {
            prober: DependencyProber::new(toolchain),
            runner,
            probed: Arc::new(OnceLock::new()),
        }
    }

    /// Probes the external tools. Only a successful report is cached, so a
    /// failed install is retried on the next batch.
    pub async fn ensure_dependencies<P: Presenter + Send>(
        &self,
        presenter: &mut P,
    ) -> Result<ProbeReport, AppError> {
        if let Some(report) = self.probed.get() {
            return Ok(report.clone());
        }

        let report = self.prober.probe(presenter).await?;
        let _ = self.probed.set(report.clone());
        Ok(report)
    }

    pub async fn run_batch<P: Presenter + Send>(
        &self,
        urls: &[String],
        options: &DownloadOptions,
        presenter: &mut P,
    ) -> Result<BatchOutcome, AppError> {
        if urls.is_empty() {
            presenter.log(LogLevel::Warning, "No video URLs found!");
            for line in NO_URLS_HELP {
                presenter.log(LogLevel::Info, line);
            }
            return Ok(BatchOutcome::NothingToDo);
        }

        presenter.log_all(banner_lines(options, urls.len()));

        let report = match self.ensure_dependencies(presenter).await {
            Ok(report) => report,
            Err(e) => {
                error!("dependency check failed: {}", e);
                return Err(e);
            }
        };

        let options = options.with_ffmpeg_location(report.media_tool_location());

        if let Err(e) = tokio::fs::create_dir_all(&options.output_dir).await {
            let err = AppError::Io(format!(
                "cannot create {}: {}",
                options.output_dir.display(),
                e
            ));
            presenter.log(LogLevel::Error, err.to_string());
            return Err(err);
        }

        info!("starting batch of {} url(s)", urls.len());
        let summary = self.runner.run_all(urls, &options, presenter).await;
        info!(
            "batch finished: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed.len()
        );

        presenter.on_complete(&summary);
        Ok(BatchOutcome::Finished(summary))
    }
}
