use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::application::output_filter::advisory_lines;
use crate::application::presenter::Presenter;
use crate::application::toolchain::{ToolCommand, Toolchain};
use crate::domain::{Advisory, AppError, LogLevel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaToolStatus {
    OnPath,
    /// Not on the PATH but present at a known install location.
    Fallback(PathBuf),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// `None` when the tool was just installed and still does not answer.
    pub downloader_version: Option<String>,
    pub media_tool: MediaToolStatus,
    pub advisories: Vec<Advisory>,
}

impl ProbeReport {
    pub fn media_tool_location(&self) -> Option<&Path> {
        match &self.media_tool {
            MediaToolStatus::Fallback(path) => Some(path),
            MediaToolStatus::OnPath | MediaToolStatus::Missing => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DependencyProber {
    toolchain: Toolchain,
}

impl DependencyProber {
    pub fn new(toolchain: Toolchain) -> Self {
        Self { toolchain }
    }

    /// Makes sure the downloader is usable, installing it if needed. A
    /// missing media tool is only reported as an advisory.
    pub async fn probe<P: Presenter + Send>(
        &self,
        presenter: &mut P,
    ) -> Result<ProbeReport, AppError> {
        presenter.log(LogLevel::Info, "Checking dependencies...");

        let downloader_version = self.ensure_downloader(presenter).await?;
        let media_tool = self.check_media_tool(presenter).await;

        let advisories = match media_tool {
            MediaToolStatus::Missing => vec![Advisory::MediaToolMissing],
            _ => Vec::new(),
        };
        for advisory in &advisories {
            presenter.log_all(advisory_lines(*advisory));
        }

        Ok(ProbeReport {
            downloader_version,
            media_tool,
            advisories,
        })
    }

    async fn ensure_downloader<P: Presenter + Send>(
        &self,
        presenter: &mut P,
    ) -> Result<Option<String>, AppError> {
        let downloader = &self.toolchain.downloader;
        let name = downloader.display_name();

        if let Some(version) = self.query_version(downloader, "--version").await {
            info!("{} {} found", name, version);
            presenter.log(
                LogLevel::Success,
                format!("{} {} is installed", name, version),
            );
            return Ok(Some(version));
        }

        presenter.log(
            LogLevel::Warning,
            format!("{} not found. Installing... This may take a moment.", name),
        );
        self.install_downloader(&name, presenter).await?;

        let version = self.query_version(downloader, "--version").await;
        presenter.log(LogLevel::Success, format!("{} installed successfully!", name));
        Ok(version)
    }

    async fn install_downloader<P: Presenter + Send>(
        &self,
        name: &str,
        presenter: &mut P,
    ) -> Result<(), AppError> {
        let installer = &self.toolchain.installer;
        debug!(program = ?installer.program, args = ?installer.args, "running installer");

        let output = installer
            .background_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let reason = match output {
            Ok(output) if output.status.success() => return Ok(()),
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!("installer stderr: {}", stderr.trim());
                format!("installer exited with {}", output.status)
            }
            Err(e) => format!("could not run {}: {}", installer.display_name(), e),
        };

        presenter.log(
            LogLevel::Error,
            format!("Failed to install {}: {}", name, reason),
        );
        presenter.log(
            LogLevel::Info,
            format!("Try installing manually: pip install {}", name),
        );

        Err(AppError::DependencyUnavailable {
            tool: name.to_string(),
            reason,
        })
    }

    async fn check_media_tool<P: Presenter + Send>(&self, presenter: &mut P) -> MediaToolStatus {
        let media_tool = &self.toolchain.media_tool;
        let name = media_tool.display_name();

        if self.query_version(media_tool, "-version").await.is_some() {
            presenter.log(LogLevel::Success, format!("{} is installed", name));
            return MediaToolStatus::OnPath;
        }

        for candidate in &self.toolchain.media_tool_fallbacks {
            if tokio::fs::try_exists(candidate).await.unwrap_or(false) {
                info!("using {} from {}", name, candidate.display());
                presenter.log(
                    LogLevel::Success,
                    format!("{} found at {}", name, candidate.display()),
                );
                return MediaToolStatus::Fallback(candidate.clone());
            }
        }

        warn!("{} is missing; merging and HLS downloads will fail", name);
        MediaToolStatus::Missing
    }

    /// First line of `<tool> <flag>` when it exits successfully in time.
    async fn query_version(&self, tool: &ToolCommand, flag: &str) -> Option<String> {
        match which::which(&tool.program) {
            Ok(path) => debug!("{} resolved to {}", tool.display_name(), path.display()),
            Err(e) => {
                debug!("{} not found: {}", tool.display_name(), e);
                return None;
            }
        }

        let mut cmd = tool.background_command();
        cmd.arg(flag)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match timeout(self.toolchain.probe_timeout, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                Some(
                    stdout
                        .lines()
                        .map(str::trim)
                        .find(|l| !l.is_empty())
                        .unwrap_or_default()
                        .to_string(),
                )
            }
            Ok(Ok(output)) => {
                debug!("{} {} exited with {}", tool.display_name(), flag, output.status);
                None
            }
            Ok(Err(e)) => {
                debug!("{} {} failed: {}", tool.display_name(), flag, e);
                None
            }
            Err(_) => {
                warn!("{} {} timed out", tool.display_name(), flag);
                None
            }
        }
    }
}
