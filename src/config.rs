use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;

use crate::application::Toolchain;
use crate::domain::{AppError, Browser, DownloadOptions, FormatPreference, Resolution};
use crate::utils::parse_url_list;

/// JSON batch description. Option keys sit at the top level next to `urls`:
///
/// ```json
/// { "urls": ["https://x.test/a.mp4"], "max_quality": "720", "browser": "firefox" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatchFile {
    pub urls: Vec<String>,
    #[serde(flatten)]
    pub options: DownloadOptions,
    pub toolchain: Toolchain,
}

pub fn load_batch_file(path: &Path) -> Result<BatchFile, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("invalid batch file {}: {}", path.display(), e)))
}

/// Reads a plain-text URL list with the same rules as the GUI text box.
pub fn load_url_file(path: &Path) -> Result<Vec<String>, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(parse_url_list(&raw))
}

/// Command-line overrides; anything left unset keeps the batch file or
/// built-in value.
#[derive(Debug, Clone, Default, Args)]
pub struct OptionOverrides {
    /// Folder where videos will be saved
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum video height: 480, 720, 1080, 1440 or 2160
    #[arg(short = 'q', long)]
    pub max_quality: Option<Resolution>,

    /// "best", "mp4", or any yt-dlp format selector
    #[arg(short, long)]
    pub format: Option<FormatPreference>,

    /// Remove sponsor, intro, outro, self-promotion and interaction segments
    #[arg(long)]
    pub skip_ads: Option<bool>,

    /// Download and embed (auto-generated) English subtitles
    #[arg(long)]
    pub embed_subs: Option<bool>,

    /// Download the entire playlist when the URL is a playlist
    #[arg(long)]
    pub playlist: Option<bool>,

    /// Read cookies from this browser (chrome, firefox, edge, brave, opera)
    #[arg(long, value_name = "BROWSER")]
    pub cookies_from_browser: Option<Browser>,

    /// Try to bypass geo and age restrictions
    #[arg(long)]
    pub bypass_restrictions: Option<bool>,

    /// Identification string sent to sites
    #[arg(long, conflicts_with = "no_user_agent")]
    pub user_agent: Option<String>,

    /// Let yt-dlp pick its own user agent
    #[arg(long)]
    pub no_user_agent: bool,

    /// Fragments downloaded in parallel (0 lets yt-dlp decide)
    #[arg(long)]
    pub concurrent_fragments: Option<u32>,
}

impl OptionOverrides {
    pub fn apply(self, mut options: DownloadOptions) -> DownloadOptions {
        if let Some(dir) = self.output_dir {
            options.output_dir = dir;
        }
        if let Some(quality) = self.max_quality {
            options.max_quality = quality;
        }
        if let Some(format) = self.format {
            options.format = format;
        }
        if let Some(skip_ads) = self.skip_ads {
            options.skip_ads = skip_ads;
        }
        if let Some(embed_subs) = self.embed_subs {
            options.embed_subs = embed_subs;
        }
        if let Some(playlist) = self.playlist {
            options.download_playlist = playlist;
        }
        if let Some(browser) = self.cookies_from_browser {
            options.use_browser_cookies = true;
            options.browser = browser;
        }
        if let Some(bypass) = self.bypass_restrictions {
            options.bypass_restrictions = bypass;
        }
        if self.no_user_agent {
            options.user_agent = None;
        } else if let Some(user_agent) = self.user_agent {
            options.user_agent = Some(user_agent);
        }
        match self.concurrent_fragments {
            Some(0) => options.concurrent_fragments = None,
            Some(n) => options.concurrent_fragments = Some(n),
            None => {}
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_batch_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "urls": ["https://x.test/a.mp4", "https://x.test/b.m3u8"],
                "output_dir": "clips",
                "max_quality": "1440",
                "use_browser_cookies": true,
                "browser": "edge",
                "toolchain": {{ "downloader": {{ "program": "python3", "args": ["-m", "yt_dlp"] }} }}
            }}"#
        )
        .unwrap();

        let batch = load_batch_file(file.path()).unwrap();
        assert_eq!(batch.urls.len(), 2);
        assert_eq!(batch.options.output_dir, PathBuf::from("clips"));
        assert_eq!(batch.options.max_quality, Resolution::P1440);
        assert!(batch.options.use_browser_cookies);
        assert_eq!(batch.options.browser, Browser::Edge);
        assert!(batch.options.skip_ads);
        assert_eq!(batch.toolchain.downloader.args, vec!["-m", "yt_dlp"]);
    }

    #[test]
    fn test_invalid_batch_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_quality": "999" }}"#).unwrap();
        let err = load_batch_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_batch_file() {
        let err = load_batch_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_load_url_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# my list\nhttps://x.test/a.mp4\n\nhttps://x.test/b.mp4").unwrap();
        assert_eq!(
            load_url_file(file.path()).unwrap(),
            vec!["https://x.test/a.mp4", "https://x.test/b.mp4"]
        );
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = OptionOverrides {
            max_quality: Some(Resolution::P480),
            cookies_from_browser: Some(Browser::Opera),
            playlist: Some(true),
            no_user_agent: true,
            concurrent_fragments: Some(0),
            ..OptionOverrides::default()
        };
        let options = overrides.apply(DownloadOptions::default());
        assert_eq!(options.max_quality, Resolution::P480);
        assert!(options.use_browser_cookies);
        assert_eq!(options.browser, Browser::Opera);
        assert!(options.download_playlist);
        assert!(options.user_agent.is_none());
        assert!(options.concurrent_fragments.is_none());
        // untouched
        assert!(options.skip_ads);
        assert!(options.embed_subs);
    }

    #[test]
    fn test_empty_overrides_keep_options() {
        let options = DownloadOptions {
            max_quality: Resolution::P2160,
            ..DownloadOptions::interactive()
        };
        assert_eq!(OptionOverrides::default().apply(options.clone()), options);
    }
}
