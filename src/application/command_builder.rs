use std::path::Path;

use crate::domain::{DownloadOptions, FormatPreference, Resolution};

pub const SPONSOR_CATEGORIES: &str = "sponsor,intro,outro,selfpromo,interaction";
pub const RETRY_COUNT: &str = "10";
pub const SUBTITLE_LANGUAGE: &str = "en";

/// Output template: `<dir>/<remote title>.<ext>`.
pub fn output_template(output_dir: &Path) -> String {
    output_dir
        .join("%(title)s.%(ext)s")
        .to_string_lossy()
        .into_owned()
}

pub fn format_selector(format: &FormatPreference, max_quality: Resolution) -> String {
    let h = max_quality.as_str();
    match format {
        FormatPreference::Best => {
            format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]/best")
        }
        FormatPreference::Mp4 => format!(
            "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/best"
        ),
        FormatPreference::Custom(selector) => selector.clone(),
    }
}

/// Arguments for one yt-dlp run, without the program itself.
pub fn build_args(url: &str, options: &DownloadOptions) -> Vec<String> {
    let mut args: Vec<String> = vec![
        url.to_string(),
        "-o".into(),
        output_template(&options.output_dir),
        "-f".into(),
        format_selector(&options.format, options.max_quality),
        "--merge-output-format".into(),
        "mp4".into(),
    ];

    if options.skip_ads {
        args.extend(["--sponsorblock-remove".into(), SPONSOR_CATEGORIES.into()]);
        if !options.download_playlist {
            args.push("--no-playlist".into());
        }
    }

    if options.download_playlist {
        args.push("--yes-playlist".into());
    }

    if options.embed_subs {
        args.extend([
            "--write-auto-subs".into(),
            "--embed-subs".into(),
            "--sub-lang".into(),
            SUBTITLE_LANGUAGE.into(),
        ]);
    }

    if options.use_browser_cookies {
        args.extend([
            "--cookies-from-browser".into(),
            options.browser.as_str().into(),
        ]);
    }

    // HLS/DASH: native segment handling, ffmpeg fetches fragments
    args.extend([
        "--hls-prefer-native".into(),
        "--external-downloader".into(),
        "ffmpeg".into(),
    ]);

    if options.bypass_restrictions {
        args.extend(["--geo-bypass".into(), "--age-limit".into(), "99".into()]);
    }

    args.extend([
        "--no-warnings".into(),
        "--ignore-errors".into(),
        "--no-check-certificate".into(),
        "--add-metadata".into(),
        "--retries".into(),
        RETRY_COUNT.into(),
        "--fragment-retries".into(),
        RETRY_COUNT.into(),
    ]);

    if let Some(fragments) = options.concurrent_fragments {
        args.extend(["--concurrent-fragments".into(), fragments.to_string()]);
    }

    if let Some(user_agent) = &options.user_agent {
        args.extend(["--user-agent".into(), user_agent.clone()]);
    }

    if let Some(location) = &options.ffmpeg_location {
        args.extend([
            "--ffmpeg-location".into(),
            location.to_string_lossy().into_owned(),
        ]);
    }

    args
}
