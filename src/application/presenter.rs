use std::path::Path;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::application::dependency_prober::ProbeReport;
use crate::domain::{
    AppError, BatchOutcome, BatchSummary, DownloadOptions, JobProgress, LogLevel, LogLine,
};

/// Rendering surface for a batch. The coordinator and the job runner only
/// talk to this; they never touch widgets or stdout directly.
pub trait Presenter {
    fn on_progress(&mut self, progress: &JobProgress);
    fn on_log(&mut self, line: LogLine);
    fn on_complete(&mut self, summary: &BatchSummary);

    fn log(&mut self, level: LogLevel, text: impl Into<String>)
    where
        Self: Sized,
    {
        self.on_log(LogLine::new(level, text));
    }

    fn log_all(&mut self, lines: Vec<LogLine>)
    where
        Self: Sized,
    {
        for line in lines {
            self.on_log(line);
        }
    }
}

pub const RULE: &str = "============================================================";
pub const THIN_RULE: &str = "------------------------------------------------------------";

/// Shown after a single job fails.
pub const FAILURE_TIPS: [&str; 4] = [
    "Tip: If this is a protected site, try:",
    "   1. Make sure you're logged in on your browser",
    "   2. Check if browser cookies are enabled (use browser cookies)",
    "   3. Try finding the direct video URL (see help below)",
];

pub const PROTECTED_SITE_HELP: [&str; 14] = [
    "HOW TO FIND VIDEO URLs ON PROTECTED SITES",
    "If the site has right-click disabled or a custom video player:",
    "1. Open the website in Chrome/Edge/Firefox",
    "2. Press F12 to open Developer Tools",
    "3. Click on the 'Network' tab",
    "4. In the filter box, type: m3u8 OR mp4 OR webm",
    "5. Play the video on the website",
    "6. Look for entries with .m3u8, .mp4, or .mpd extensions",
    "7. Right-click the entry > Copy > Copy URL",
    "8. Add that URL to your download list",
    "Common patterns to look for:",
    "   - master.m3u8 or playlist.m3u8 (HLS streams)",
    "   - .mp4?token=... (direct video with auth)",
    "   - manifest.mpd (DASH streams)",
];

pub const NO_URLS_HELP: [&str; 7] = [
    "Add URLs on the command line, with --input <file>, or in a --config batch file.",
    "Supported sites:",
    "   - YouTube, Vimeo, Dailymotion",
    "   - Twitter/X, Facebook, Instagram, TikTok",
    "   - Reddit, Twitch, Streamable",
    "   - Direct video links (.mp4, .webm, .m3u8, etc.)",
    "   - 1000+ other sites!",
];

pub fn absolute_display(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Pre-run summary of the resolved options.
pub fn banner_lines(options: &DownloadOptions, total: usize) -> Vec<LogLine> {
    let cookies = if options.use_browser_cookies {
        format!("Yes ({})", options.browser)
    } else {
        "No".to_string()
    };

    vec![
        LogLine::info(RULE),
        LogLine::info("VIDEO DOWNLOADER"),
        LogLine::info(RULE),
        LogLine::info(format!(
            "Output directory: {}",
            absolute_display(&options.output_dir)
        )),
        LogLine::info(format!("Videos to download: {}", total)),
        LogLine::info(format!("Max quality: {}p", options.max_quality)),
        LogLine::info(format!("Skip ads: {}", yes_no(options.skip_ads))),
        LogLine::info(format!("Browser cookies: {}", cookies)),
        LogLine::info("HLS/m3u8 support: Yes"),
        LogLine::info(format!(
            "Bypass restrictions: {}",
            yes_no(options.bypass_restrictions)
        )),
        LogLine::info(RULE),
    ]
}

pub fn summary_lines(summary: &BatchSummary) -> Vec<LogLine> {
    let mut lines = vec![
        LogLine::info(RULE),
        LogLine::success("DOWNLOAD COMPLETE!"),
        LogLine::info(RULE),
        LogLine::success(format!(
            "Successfully downloaded: {}/{}",
            summary.succeeded, summary.total
        )),
    ];

    if !summary.failed.is_empty() {
        lines.push(LogLine::error(format!(
            "Failed downloads: {}/{}",
            summary.failed.len(),
            summary.total
        )));
        lines.extend(
            summary
                .failed
                .iter()
                .map(|url| LogLine::error(format!("   - {}", url))),
        );
        lines.push(LogLine::info(RULE));
        lines.extend(PROTECTED_SITE_HELP.iter().map(|l| LogLine::info(*l)));
    }

    lines.push(LogLine::info(format!(
        "Files saved to: {}",
        absolute_display(&summary.output_dir)
    )));
    lines.push(LogLine::info(RULE));
    lines
}

/// Everything the background batch reports to the window.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Progress(JobProgress),
    Log(LogLine),
    Complete(BatchSummary),
    Probed(Result<ProbeReport, AppError>),
    Finished(Result<BatchOutcome, AppError>),
}

/// Presenter that forwards everything over a channel so the GUI can drain
/// it on its own schedule.
pub struct ChannelPresenter {
    sender: UnboundedSender<WorkerEvent>,
}

impl ChannelPresenter {
    pub fn new() -> (Self, UnboundedReceiver<WorkerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn probed(self, result: Result<ProbeReport, AppError>) {
        self.send(WorkerEvent::Probed(result));
    }

    /// Last event of a batch. Consumes the presenter, closing the channel.
    pub fn finished(self, result: Result<BatchOutcome, AppError>) {
        self.send(WorkerEvent::Finished(result));
    }

    fn send(&self, event: WorkerEvent) {
        if self.sender.send(event).is_err() {
            debug!("event receiver dropped; window is gone");
        }
    }
}

impl Presenter for ChannelPresenter {
    fn on_progress(&mut self, progress: &JobProgress) {
        self.send(WorkerEvent::Progress(progress.clone()));
    }

    fn on_log(&mut self, line: LogLine) {
        self.send(WorkerEvent::Log(line));
    }

    fn on_complete(&mut self, summary: &BatchSummary) {
        self.send(WorkerEvent::Complete(summary.clone()));
    }
}

/// Keeps every call, for assertions.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingPresenter {
    pub progress: Vec<JobProgress>,
    pub lines: Vec<LogLine>,
    pub completed: Vec<BatchSummary>,
}

#[cfg(test)]
impl RecordingPresenter {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.text.contains(needle))
    }
}

#[cfg(test)]
impl Presenter for RecordingPresenter {
    fn on_progress(&mut self, progress: &JobProgress) {
        self.progress.push(progress.clone());
    }

    fn on_log(&mut self, line: LogLine) {
        self.lines.push(line);
    }

    fn on_complete(&mut self, summary: &BatchSummary) {
        self.completed.push(summary.clone());
    }
}
