use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// A program plus the arguments that always precede the per-call ones,
/// e.g. `python3 -m yt_dlp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn display_name(&self) -> String {
        self.program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }

    /// Command with the leading args already applied.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Same as [`command`](Self::command), but never pops up a console
    /// window on Windows. Only use it when the output is captured.
    pub fn background_command(&self) -> Command {
        let mut cmd = self.command();
        configure_for_background(&mut cmd);
        cmd
    }
}

/// External programs the downloader depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    pub downloader: ToolCommand,
    pub media_tool: ToolCommand,
    /// Used when the downloader does not answer a version query.
    pub installer: ToolCommand,
    /// Checked in order when the media tool is not on the PATH.
    pub media_tool_fallbacks: Vec<PathBuf>,
    #[serde(with = "seconds")]
    pub probe_timeout: Duration,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            downloader: ToolCommand::new("yt-dlp"),
            media_tool: ToolCommand::new("ffmpeg"),
            installer: ToolCommand::with_args(
                python_program(),
                ["-m", "pip", "install", "--upgrade", "yt-dlp"],
            ),
            media_tool_fallbacks: default_media_tool_fallbacks(),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

fn python_program() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

fn default_media_tool_fallbacks() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            PathBuf::from(r"C:\ffmpeg\bin\ffmpeg.exe"),
            PathBuf::from(r"C:\Program Files\ffmpeg\bin\ffmpeg.exe"),
        ]
    } else {
        Vec::new()
    }
}

#[cfg(windows)]
fn configure_for_background(cmd: &mut Command) {
    // Prevent console windows from stealing focus on Windows while running tools.
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn configure_for_background(_cmd: &mut Command) {}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
