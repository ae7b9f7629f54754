use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AppError;

/// Upper bound on the video height handed to the format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "480")]
    P480,
    #[serde(rename = "720")]
    P720,
    #[default]
    #[serde(rename = "1080")]
    P1080,
    #[serde(rename = "1440")]
    P1440,
    #[serde(rename = "2160")]
    P2160,
}

impl Resolution {
    pub const ALL: [Resolution; 5] = [
        Resolution::P480,
        Resolution::P720,
        Resolution::P1080,
        Resolution::P1440,
        Resolution::P2160,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::P480 => "480",
            Resolution::P720 => "720",
            Resolution::P1080 => "1080",
            Resolution::P1440 => "1440",
            Resolution::P2160 => "2160",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().trim_end_matches(['p', 'P']);
        Resolution::ALL
            .into_iter()
            .find(|r| r.as_str() == value)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "unsupported resolution '{}' (expected 480, 720, 1080, 1440 or 2160)",
                    s
                ))
            })
    }
}

/// Browser whose cookie store yt-dlp should read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
    Edge,
    Brave,
    Opera,
}

impl Browser {
    pub const ALL: [Browser; 5] = [
        Browser::Chrome,
        Browser::Firefox,
        Browser::Edge,
        Browser::Brave,
        Browser::Opera,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "edge",
            Browser::Brave => "brave",
            Browser::Opera => "opera",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        Browser::ALL
            .into_iter()
            .find(|b| b.as_str() == value)
            .ok_or_else(|| AppError::Config(format!("unsupported browser '{}'", s)))
    }
}

/// Format selection strategy. `Custom` selectors are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FormatPreference {
    #[default]
    Best,
    Mp4,
    Custom(String),
}

impl From<String> for FormatPreference {
    fn from(value: String) -> Self {
        match value.trim() {
            "best" => FormatPreference::Best,
            "mp4" => FormatPreference::Mp4,
            other => FormatPreference::Custom(other.to_string()),
        }
    }
}

impl From<FormatPreference> for String {
    fn from(value: FormatPreference) -> Self {
        match value {
            FormatPreference::Best => "best".to_string(),
            FormatPreference::Mp4 => "mp4".to_string(),
            FormatPreference::Custom(selector) => selector,
        }
    }
}

impl FromStr for FormatPreference {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(AppError::Config("empty format selector".into()));
        }
        Ok(FormatPreference::from(s.to_string()))
    }
}

/// Every user-facing setting that influences the yt-dlp invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadOptions {
    pub output_dir: PathBuf,
    pub max_quality: Resolution,
    pub format: FormatPreference,
    pub skip_ads: bool,
    pub embed_subs: bool,
    pub download_playlist: bool,
    pub use_browser_cookies: bool,
    pub browser: Browser,
    pub bypass_restrictions: bool,
    pub user_agent: Option<String>,
    pub concurrent_fragments: Option<u32>,
    pub ffmpeg_location: Option<PathBuf>,
}

pub const DEFAULT_OUTPUT_DIR: &str = "video_downloads";

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

impl Default for DownloadOptions {
    /// Batch profile: pins a desktop user agent and four parallel fragments.
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_quality: Resolution::P1080,
            format: FormatPreference::Best,
            skip_ads: true,
            embed_subs: true,
            download_playlist: false,
            use_browser_cookies: false,
            browser: Browser::Chrome,
            bypass_restrictions: true,
            user_agent: Some(DESKTOP_USER_AGENT.to_string()),
            concurrent_fragments: Some(4),
            ffmpeg_location: None,
        }
    }
}

impl DownloadOptions {
    /// Profile used by the desktop window: no subtitles, no pinned user agent
    /// or fragment count.
    pub fn interactive() -> Self {
        Self {
            embed_subs: false,
            user_agent: None,
            concurrent_fragments: None,
            ..Self::default()
        }
    }

    /// Copy with the ffmpeg location found by the dependency probe, keeping
    /// an explicitly configured one.
    pub fn with_ffmpeg_location(&self, location: Option<&Path>) -> Self {
        let mut resolved = self.clone();
        if resolved.ffmpeg_location.is_none() {
            resolved.ffmpeg_location = location.map(Path::to_path_buf);
        }
        resolved
    }
}

/// What a URL most likely points at, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Webpage,
    Hls,
    Dash,
    DirectVideo,
}

const DIRECT_VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".webm", ".mkv", ".avi", ".mov"];

impl StreamKind {
    pub fn detect(url: &str) -> Self {
        let haystack = url.to_lowercase();

        if haystack.contains(".m3u8") {
            StreamKind::Hls
        } else if haystack.contains(".mpd") {
            StreamKind::Dash
        } else if DIRECT_VIDEO_EXTENSIONS
            .iter()
            .any(|ext| haystack.contains(ext))
        {
            StreamKind::DirectVideo
        } else {
            StreamKind::Webpage
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StreamKind::Webpage => "webpage",
            StreamKind::Hls => "HLS stream (.m3u8)",
            StreamKind::Dash => "DASH stream (.mpd)",
            StreamKind::DirectVideo => "direct video",
        }
    }
}

/// Announced right before a job starts. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    pub index: usize,
    pub total: usize,
    pub url: String,
    pub kind: StreamKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobResult {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub url: String,
    pub result: JobResult,
}

/// Aggregated result of one batch, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<String>,
    pub jobs: Vec<JobOutcome>,
    pub output_dir: PathBuf,
}

impl BatchSummary {
    pub fn from_outcomes(jobs: Vec<JobOutcome>, output_dir: PathBuf) -> Self {
        let failed: Vec<String> = jobs
            .iter()
            .filter(|job| job.result == JobResult::Failed)
            .map(|job| job.url.clone())
            .collect();

        Self {
            total: jobs.len(),
            succeeded: jobs.len() - failed.len(),
            failed,
            jobs,
            output_dir,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The URL list was empty; nothing was probed or created.
    NothingToDo,
    Finished(BatchSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn icon(self) -> &'static str {
        match self {
            LogLevel::Info => "ℹ️",
            LogLevel::Success => "✅",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub text: String,
}

impl LogLine {
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    CheckingDependencies,
    Downloading,
    Completed,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_parsing() {
        assert_eq!("720".parse::<Resolution>().unwrap(), Resolution::P720);
        assert_eq!("2160p".parse::<Resolution>().unwrap(), Resolution::P2160);
        assert!("900".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_browser_parsing() {
        assert_eq!("Firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert!("netscape".parse::<Browser>().is_err());
    }

    #[test]
    fn test_options_from_json() {
        let options: DownloadOptions = serde_json::from_str(
            r#"{"max_quality": "720", "browser": "brave", "format": "mp4", "skip_ads": false}"#,
        )
        .unwrap();
        assert_eq!(options.max_quality, Resolution::P720);
        assert_eq!(options.browser, Browser::Brave);
        assert_eq!(options.format, FormatPreference::Mp4);
        assert!(!options.skip_ads);
        // untouched keys keep the batch defaults
        assert_eq!(options.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(options.concurrent_fragments, Some(4));
    }

    #[test]
    fn test_interactive_profile() {
        let options = DownloadOptions::interactive();
        assert!(options.user_agent.is_none());
        assert!(options.concurrent_fragments.is_none());
        assert!(!options.embed_subs);
        assert!(options.skip_ads);
    }

    #[test]
    fn test_ffmpeg_location_keeps_explicit_value() {
        let explicit = DownloadOptions {
            ffmpeg_location: Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")),
            ..DownloadOptions::default()
        };
        let resolved = explicit.with_ffmpeg_location(Some(Path::new("C:\\ffmpeg\\bin\\ffmpeg.exe")));
        assert_eq!(resolved.ffmpeg_location, explicit.ffmpeg_location);

        let resolved = DownloadOptions::default()
            .with_ffmpeg_location(Some(Path::new("C:\\ffmpeg\\bin\\ffmpeg.exe")));
        assert_eq!(
            resolved.ffmpeg_location,
            Some(PathBuf::from("C:\\ffmpeg\\bin\\ffmpeg.exe"))
        );
    }

    #[test]
    fn test_stream_kind_detection() {
        assert_eq!(
            StreamKind::detect("https://cdn.test/live/master.m3u8?token=abc"),
            StreamKind::Hls
        );
        assert_eq!(
            StreamKind::detect("https://cdn.test/manifest.mpd"),
            StreamKind::Dash
        );
        assert_eq!(
            StreamKind::detect("https://x.test/a.MP4"),
            StreamKind::DirectVideo
        );
        assert_eq!(
            StreamKind::detect("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            StreamKind::Webpage
        );
        // extensions in the query string count too
        assert_eq!(
            StreamKind::detect("https://site.test/watch?file=clip.mp4"),
            StreamKind::DirectVideo
        );
    }

    #[test]
    fn test_summary_counts() {
        let summary = BatchSummary::from_outcomes(
            vec![
                JobOutcome {
                    url: "https://x.test/a.mp4".into(),
                    result: JobResult::Failed,
                },
                JobOutcome {
                    url: "https://x.test/b.mp4".into(),
                    result: JobResult::Succeeded,
                },
                JobOutcome {
                    url: "https://x.test/c.mp4".into(),
                    result: JobResult::Failed,
                },
            ],
            PathBuf::from("out"),
        );
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(
            summary.failed,
            vec!["https://x.test/a.mp4", "https://x.test/c.mp4"]
        );
        assert!(!summary.all_succeeded());
    }
}
