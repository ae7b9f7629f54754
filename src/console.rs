use std::io::{self, Write};

use crate::application::presenter::{summary_lines, Presenter, PROTECTED_SITE_HELP, RULE};
use crate::domain::{BatchSummary, JobProgress, LogLevel, LogLine};

/// Plain-text presenter for terminals and log files.
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl ConsolePresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &LogLine) {
        let result = match line.level {
            LogLevel::Info => writeln!(self.out, "{}", line.text),
            level => writeln!(self.out, "{} {}", level.icon(), line.text),
        };
        if let Err(e) = result.and_then(|_| self.out.flush()) {
            tracing::debug!("console write failed: {}", e);
        }
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn on_progress(&mut self, progress: &JobProgress) {
        self.write_line(&LogLine::info(format!(
            "\n[{}/{}] 📥 Downloading: {}",
            progress.index, progress.total, progress.url
        )));
        self.write_line(&LogLine::info(format!("   Type: {}", progress.kind.label())));
    }

    fn on_log(&mut self, line: LogLine) {
        self.write_line(&line);
    }

    fn on_complete(&mut self, summary: &BatchSummary) {
        for line in summary_lines(summary) {
            self.write_line(&line);
        }
    }
}

/// Standalone guide for finding stream URLs by hand.
pub fn print_protected_site_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    for line in PROTECTED_SITE_HELP {
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "{}", RULE)
}
