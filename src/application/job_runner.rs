use std::process::{ExitStatus, Stdio};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::application::command_builder::build_args;
use crate::application::output_filter::render_line;
use crate::application::presenter::{Presenter, FAILURE_TIPS, THIN_RULE};
use crate::application::toolchain::ToolCommand;
use crate::domain::{
    AppError, BatchSummary, DownloadOptions, JobOutcome, JobProgress, JobResult, LogLevel,
    StreamKind,
};

/// What happens to the downloader's own output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Child stdout/stderr go straight to ours.
    Inherit,
    /// Captured, filtered and forwarded to the presenter.
    Filtered,
}

#[derive(Debug, Clone)]
pub struct JobRunner {
    downloader: ToolCommand,
    output: OutputMode,
}

impl JobRunner {
    pub fn new(downloader: ToolCommand, output: OutputMode) -> Self {
        Self { downloader, output }
    }

    /// Runs every URL in order, one at a time. Individual failures are
    /// recorded and never stop the batch.
    pub async fn run_all<P: Presenter + Send>(
        &self,
        urls: &[String],
        options: &DownloadOptions,
        presenter: &mut P,
    ) -> BatchSummary {
        let total = urls.len();
        let mut jobs = Vec::with_capacity(total);

        for (idx, url) in urls.iter().enumerate() {
            presenter.on_progress(&JobProgress {
                index: idx + 1,
                total,
                url: url.clone(),
                kind: StreamKind::detect(url),
            });

            let result = self.run_job(url, options, presenter).await;
            jobs.push(JobOutcome {
                url: url.clone(),
                result,
            });

            if self.output == OutputMode::Filtered {
                presenter.log(LogLevel::Info, THIN_RULE);
            }
        }

        BatchSummary::from_outcomes(jobs, options.output_dir.clone())
    }

    pub async fn run_job<P: Presenter + Send>(
        &self,
        url: &str,
        options: &DownloadOptions,
        presenter: &mut P,
    ) -> JobResult {
        let args = build_args(url, options);
        debug!(program = ?self.downloader.program, ?args, "launching downloader");

        match self.execute(&args, presenter).await {
            Ok(status) if status.success() => {
                info!("downloaded {}", url);
                presenter.log(LogLevel::Success, "Successfully downloaded!");
                JobResult::Succeeded
            }
            Ok(status) => {
                let err = AppError::NonZeroExit {
                    program: self.downloader.display_name(),
                    status: status.to_string(),
                };
                warn!("{} failed: {}", url, err);
                presenter.log(LogLevel::Error, format!("Download failed for: {}", url));
                for tip in FAILURE_TIPS {
                    presenter.log(LogLevel::Info, tip);
                }
                JobResult::Failed
            }
            Err(err) => {
                warn!("{} failed: {}", url, err);
                presenter.log(
                    LogLevel::Error,
                    format!("Error downloading {}: {}", url, err),
                );
                JobResult::Failed
            }
        }
    }

    async fn execute<P: Presenter + Send>(
        &self,
        args: &[String],
        presenter: &mut P,
    ) -> Result<ExitStatus, AppError> {
        let spawn_error = |e: std::io::Error| AppError::Spawn {
            program: self.downloader.display_name(),
            reason: e.to_string(),
        };

        match self.output {
            OutputMode::Inherit => {
                let mut cmd = self.downloader.command();
                cmd.args(args).stdin(Stdio::null());
                cmd.status().await.map_err(spawn_error)
            }
            OutputMode::Filtered => {
                let mut cmd = self.downloader.background_command();
                cmd.args(args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());

                let mut child = cmd.spawn().map_err(spawn_error)?;

                let stdout = child.stdout.take().map(output_lines);
                let stderr = child.stderr.take().map(output_lines);
                let mut lines = stream::select(
                    stdout.unwrap_or_else(|| stream::empty().boxed()),
                    stderr.unwrap_or_else(|| stream::empty().boxed()),
                );

                while let Some(line) = lines.next().await {
                    presenter.log_all(render_line(&line));
                }

                child.wait().await.map_err(spawn_error)
            }
        }
    }
}

/// Splits a child pipe on `\r` or `\n`, so progress updates that only
/// rewrite the current terminal line still arrive one by one.
fn output_lines<R>(reader: R) -> BoxStream<'static, String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream::unfold(
        (BufReader::new(reader), Vec::new()),
        |(mut reader, mut buffer)| async move {
            let mut byte = [0u8; 1];
            loop {
                match reader.read(&mut byte).await {
                    Ok(0) | Err(_) => {
                        if buffer.is_empty() {
                            return None;
                        }
                        let line = String::from_utf8_lossy(&buffer).into_owned();
                        buffer.clear();
                        return Some((line, (reader, buffer)));
                    }
                    Ok(_) => match byte[0] {
                        b'\r' | b'\n' => {
                            if !buffer.is_empty() {
                                let line = String::from_utf8_lossy(&buffer).into_owned();
                                buffer.clear();
                                return Some((line, (reader, buffer)));
                            }
                        }
                        b => buffer.push(b),
                    },
                }
            }
        },
    )
    .boxed()
}
