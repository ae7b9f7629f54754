use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use video_downloader::application::{DownloadCoordinator, OutputMode, ToolCommand};
use video_downloader::config::{load_batch_file, load_url_file, BatchFile, OptionOverrides};
use video_downloader::console::{print_protected_site_help, ConsolePresenter};
use video_downloader::domain::{AppError, BatchOutcome};
use video_downloader::utils::malformed_urls;

#[derive(Parser)]
#[command(name = "vdl-batch")]
#[command(version)]
#[command(about = "Download videos from YouTube, Vimeo, HLS streams and 1000+ other sites")]
struct Cli {
    /// Video URLs, downloaded in the given order
    urls: Vec<String>,

    /// Text file with one URL per line (# comments allowed)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON batch file with URLs and options
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    options: OptionOverrides,

    /// yt-dlp executable
    #[arg(long, env = "VDL_YT_DLP")]
    yt_dlp: Option<PathBuf>,

    /// ffmpeg executable
    #[arg(long, env = "VDL_FFMPEG")]
    ffmpeg: Option<PathBuf>,

    /// Show only the interesting yt-dlp lines instead of its raw output
    #[arg(long, default_value_t = false)]
    filter_output: bool,

    /// Explain how to find stream URLs on protected sites, then exit
    #[arg(long, default_value_t = false)]
    help_protected: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.help_protected {
        if let Err(e) = print_protected_site_help(&mut std::io::stdout()) {
            eprintln!("❌ {}", e);
            return ExitCode::from(2);
        }
        return ExitCode::SUCCESS;
    }

    let result = run(cli).await;
    if let Err(e) = &result {
        eprintln!("❌ {}", e);
    }
    ExitCode::from(exit_status(&result))
}

/// 0 when everything worked or there was nothing to do, 1 when a download
/// failed, 2 when the batch could not run at all.
fn exit_status(result: &Result<BatchOutcome, AppError>) -> u8 {
    match result {
        Ok(BatchOutcome::Finished(summary)) if !summary.all_succeeded() => 1,
        Ok(_) => 0,
        Err(e) if e.is_fatal() => 2,
        Err(_) => 1,
    }
}

async fn run(cli: Cli) -> Result<BatchOutcome, AppError> {
    let batch = match &cli.config {
        Some(path) => load_batch_file(path)?,
        None => BatchFile::default(),
    };

    let mut urls = batch.urls;
    if let Some(path) = &cli.input {
        urls.extend(load_url_file(path)?);
    }
    urls.extend(cli.urls);

    for url in malformed_urls(&urls) {
        warn!("'{}' does not look like a URL; trying anyway", url);
    }

    let options = cli.options.apply(batch.options);

    let mut toolchain = batch.toolchain;
    if let Some(yt_dlp) = cli.yt_dlp {
        toolchain.downloader = ToolCommand::new(yt_dlp);
    }
    if let Some(ffmpeg) = cli.ffmpeg {
        toolchain.media_tool = ToolCommand::new(ffmpeg);
    }

    let output = if cli.filter_output {
        OutputMode::Filtered
    } else {
        OutputMode::Inherit
    };

    let coordinator = DownloadCoordinator::new(toolchain, output);
    let mut presenter = ConsolePresenter::stdout();
    coordinator.run_batch(&urls, &options, &mut presenter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use video_downloader::domain::{BatchSummary, Browser, JobOutcome, JobResult, Resolution};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "vdl-batch",
            "-q",
            "720",
            "--cookies-from-browser",
            "firefox",
            "--skip-ads",
            "false",
            "--filter-output",
            "https://x.test/a.mp4",
            "https://x.test/b.mp4",
        ])
        .unwrap();

        assert_eq!(cli.urls.len(), 2);
        assert!(cli.filter_output);
        assert_eq!(cli.options.max_quality, Some(Resolution::P720));
        assert_eq!(cli.options.cookies_from_browser, Some(Browser::Firefox));
        assert_eq!(cli.options.skip_ads, Some(false));
    }

    #[test]
    fn test_rejects_unknown_quality() {
        assert!(Cli::try_parse_from(["vdl-batch", "-q", "900"]).is_err());
    }

    #[test]
    fn test_exit_status() {
        let finished = |result: JobResult| -> Result<BatchOutcome, AppError> {
            Ok(BatchOutcome::Finished(BatchSummary::from_outcomes(
                vec![JobOutcome {
                    url: "https://x.test/a.mp4".into(),
                    result,
                }],
                PathBuf::from("out"),
            )))
        };

        assert_eq!(exit_status(&Ok(BatchOutcome::NothingToDo)), 0);
        assert_eq!(exit_status(&finished(JobResult::Succeeded)), 0);
        assert_eq!(exit_status(&finished(JobResult::Failed)), 1);
        assert_eq!(
            exit_status(&Err(AppError::DependencyUnavailable {
                tool: "yt-dlp".into(),
                reason: "pip failed".into(),
            })),
            2
        );
        assert_eq!(exit_status(&Err(AppError::Config("bad".into()))), 2);
        assert_eq!(
            exit_status(&Err(AppError::Spawn {
                program: "yt-dlp".into(),
                reason: "no such file".into(),
            })),
            1
        );
    }
}
