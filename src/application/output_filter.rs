use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Advisory, LogLine};

static COOKIE_COPY_FAILURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)could not copy.*cookie|cookie.*could not copy").expect("valid regex"));

static MEDIA_TOOL_MISSING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ffmpeg not found").expect("valid regex"));

static INTERESTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)download|merge|destination|error|already").expect("valid regex")
});

/// How a single line of yt-dlp output should be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilteredLine {
    /// A known diagnostic, replaced by a clearer hint.
    Advisory(Advisory),
    /// Worth showing as-is.
    Relevant(String),
    Ignored,
}

pub fn classify_line(raw: &str) -> FilteredLine {
    let line = raw.trim();
    if line.is_empty() {
        return FilteredLine::Ignored;
    }

    if COOKIE_COPY_FAILURE.is_match(line) {
        FilteredLine::Advisory(Advisory::CookieStoreInaccessible)
    } else if MEDIA_TOOL_MISSING.is_match(line) {
        FilteredLine::Advisory(Advisory::MediaToolMissing)
    } else if INTERESTING.is_match(line) {
        FilteredLine::Relevant(line.to_string())
    } else {
        FilteredLine::Ignored
    }
}

/// Hint lines shown in place of an advisory.
pub fn advisory_lines(advisory: Advisory) -> Vec<LogLine> {
    match advisory {
        Advisory::CookieStoreInaccessible => vec![LogLine::warning(
            "Cookie access error - Close your browser or disable 'Use browser cookies'",
        )],
        Advisory::MediaToolMissing => vec![
            LogLine::error("FFmpeg is required but not installed!"),
            LogLine::warning(
                "Install ffmpeg and make sure it is on your PATH (or in C:\\ffmpeg\\bin)",
            ),
        ],
    }
}

/// Lines to forward for one raw output line, indented under the job header.
pub fn render_line(raw: &str) -> Vec<LogLine> {
    match classify_line(raw) {
        FilteredLine::Advisory(advisory) => advisory_lines(advisory)
            .into_iter()
            .map(|l| LogLine::new(l.level, format!("  {}", l.text)))
            .collect(),
        FilteredLine::Relevant(line) => vec![LogLine::info(format!("  {}", line))],
        FilteredLine::Ignored => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LogLevel;

    #[test]
    fn test_cookie_failure_is_rewritten() {
        let raw = "ERROR: Could not copy Chrome cookie database. See https://github.com/yt-dlp/yt-dlp/issues/7271";
        assert_eq!(
            classify_line(raw),
            FilteredLine::Advisory(Advisory::CookieStoreInaccessible)
        );

        let rendered = render_line(raw);
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].level, LogLevel::Warning);
        assert!(rendered[0].text.contains("Cookie access error"));
        assert!(!rendered[0].text.contains("Could not copy"));
    }

    #[test]
    fn test_missing_ffmpeg() {
        let raw = "ERROR: You have requested merging of multiple formats but ffmpeg not found. Please install";
        assert_eq!(
            classify_line(raw),
            FilteredLine::Advisory(Advisory::MediaToolMissing)
        );
        let rendered = render_line(raw);
        assert_eq!(rendered[0].level, LogLevel::Error);
        assert_eq!(rendered[1].level, LogLevel::Warning);
    }

    #[test]
    fn test_keyword_filter() {
        assert_eq!(
            classify_line("  [download] Destination: video_downloads/clip.mp4 "),
            FilteredLine::Relevant("[download] Destination: video_downloads/clip.mp4".into())
        );
        assert_eq!(
            classify_line("[Merger] Merging formats into \"clip.mp4\""),
            FilteredLine::Relevant("[Merger] Merging formats into \"clip.mp4\"".into())
        );
        assert_eq!(
            classify_line("[download] clip.mp4 has already been downloaded"),
            FilteredLine::Relevant("[download] clip.mp4 has already been downloaded".into())
        );
        assert_eq!(
            classify_line("[youtube] dQw4w9WgXcQ: Extracting URL"),
            FilteredLine::Ignored
        );
        assert_eq!(classify_line("   "), FilteredLine::Ignored);
    }

    #[test]
    fn test_relevant_lines_are_indented() {
        let rendered = render_line("ERROR: Unsupported URL: https://x.test/");
        assert_eq!(
            rendered,
            vec![LogLine::info("  ERROR: Unsupported URL: https://x.test/")]
        );
    }
}
