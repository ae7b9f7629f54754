use iced::{
    widget::{
        button, checkbox, column, container, pick_list, progress_bar, row, scrollable, text,
        text_editor, text_input, Column, Space,
    },
    Alignment, Background, Color, Element, Length,
};
use video_downloader::application::presenter::summary_lines;
use video_downloader::application::WorkerEvent;
use video_downloader::domain::{
    Advisory, BatchOutcome, Browser, DownloadOptions, DownloadPhase, JobProgress, LogLevel, LogLine,
    Resolution,
};
use video_downloader::utils::parse_url_list;

const URL_BOX_HINT: &str = "# Paste video URLs here, one per line\n\
# Examples:\n\
# https://www.youtube.com/watch?v=dQw4w9WgXcQ\n\
# https://www.tiktok.com/@user/video/123456\n";

const LABEL_WIDTH: f32 = 110.0;

/// Main view state
pub struct DownloadView {
    pub urls: text_editor::Content,
    pub output_dir: String,
    pub max_quality: Resolution,
    pub browser: Browser,
    pub skip_ads: bool,
    pub use_cookies: bool,
    pub embed_subs: bool,
    pub download_playlist: bool,
    pub is_downloading: bool,
    pub phase: DownloadPhase,
    pub current: Option<JobProgress>,
    pub media_tool_missing: bool,
    pub logs: Vec<LogLine>,
}

impl Default for DownloadView {
    fn default() -> Self {
        let defaults = DownloadOptions::interactive();
        Self {
            urls: text_editor::Content::with_text(URL_BOX_HINT),
            output_dir: defaults.output_dir.display().to_string(),
            max_quality: defaults.max_quality,
            browser: defaults.browser,
            skip_ads: defaults.skip_ads,
            use_cookies: defaults.use_browser_cookies,
            embed_subs: defaults.embed_subs,
            download_playlist: defaults.download_playlist,
            is_downloading: false,
            phase: DownloadPhase::Idle,
            current: None,
            media_tool_missing: false,
            logs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlsEdited(text_editor::Action),
    OutputDirChanged(String),
    BrowsePressed,
    QualitySelected(Resolution),
    BrowserSelected(Browser),
    SkipAdsToggled(bool),
    CookiesToggled(bool),
    SubsToggled(bool),
    PlaylistToggled(bool),
    DownloadPressed,
    ClearPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlsEdited(action) => self.urls.perform(action),
            DownloadMessage::OutputDirChanged(dir) => self.output_dir = dir,
            DownloadMessage::QualitySelected(quality) => self.max_quality = quality,
            DownloadMessage::BrowserSelected(browser) => self.browser = browser,
            DownloadMessage::SkipAdsToggled(on) => self.skip_ads = on,
            DownloadMessage::CookiesToggled(on) => self.use_cookies = on,
            DownloadMessage::SubsToggled(on) => self.embed_subs = on,
            DownloadMessage::PlaylistToggled(on) => self.download_playlist = on,
            DownloadMessage::ClearPressed => {
                self.urls = text_editor::Content::new();
                self.logs.push(LogLine::info("URL list cleared"));
            }
            DownloadMessage::BrowsePressed | DownloadMessage::DownloadPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn urls(&self) -> Vec<String> {
        parse_url_list(&self.urls.text())
    }

    /// Snapshot of the form for one batch.
    pub fn options(&self) -> DownloadOptions {
        let output_dir = self.output_dir.trim();
        let mut options = DownloadOptions::interactive();
        if !output_dir.is_empty() {
            options.output_dir = output_dir.into();
        }
        options.max_quality = self.max_quality;
        options.browser = self.browser;
        options.skip_ads = self.skip_ads;
        options.use_browser_cookies = self.use_cookies;
        options.embed_subs = self.embed_subs;
        options.download_playlist = self.download_playlist;
        options
    }

    pub fn begin_probe(&mut self) {
        self.phase = DownloadPhase::CheckingDependencies;
    }

    pub fn begin_batch(&mut self) {
        self.is_downloading = true;
        self.phase = DownloadPhase::Downloading;
        self.current = None;
        self.logs.clear();
    }

    pub fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Progress(progress) => {
                self.logs.push(LogLine::info(format!(
                    "[{}/{}] Downloading: {}",
                    progress.index, progress.total, progress.url
                )));
                self.current = Some(progress);
            }
            WorkerEvent::Log(line) => self.logs.push(line),
            WorkerEvent::Complete(summary) => self.logs.extend(summary_lines(&summary)),
            WorkerEvent::Probed(Ok(report)) => {
                self.media_tool_missing = report.advisories.contains(&Advisory::MediaToolMissing);
                self.phase = DownloadPhase::Idle;
            }
            WorkerEvent::Probed(Err(e)) => {
                self.logs.push(LogLine::error(e.to_string()));
                self.phase = DownloadPhase::Failed;
            }
            WorkerEvent::Finished(result) => {
                self.is_downloading = false;
                self.current = None;
                self.phase = match result {
                    Ok(BatchOutcome::NothingToDo) => DownloadPhase::Idle,
                    Ok(BatchOutcome::Finished(summary)) if summary.all_succeeded() => {
                        DownloadPhase::Completed
                    }
                    Ok(BatchOutcome::Finished(_)) => DownloadPhase::Failed,
                    Err(e) => {
                        self.logs.push(LogLine::error(e.to_string()));
                        DownloadPhase::Failed
                    }
                };
            }
        }
    }

    fn status(&self) -> String {
        match (self.phase, &self.current) {
            (DownloadPhase::Downloading, Some(p)) => {
                format!("Downloading {} of {} ({})", p.index, p.total, p.kind.label())
            }
            (DownloadPhase::Downloading, None) => "Preparing download...".to_string(),
            (DownloadPhase::CheckingDependencies, _) => "Checking dependencies...".to_string(),
            (DownloadPhase::Completed, _) => "All downloads finished".to_string(),
            (DownloadPhase::Failed, _) => "Finished with errors, see the log".to_string(),
            (DownloadPhase::Idle, _) => "Ready".to_string(),
        }
    }

    fn busy(&self) -> bool {
        self.is_downloading || self.phase == DownloadPhase::CheckingDependencies
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let urls = column![
            text("Paste your video URLs here (one per line):").size(14),
            text("Tip: Most sites don't need cookies!").size(12),
            text_editor(&self.urls)
                .on_action(DownloadMessage::UrlsEdited)
                .height(Length::Fixed(150.0)),
        ]
        .spacing(6);

        let settings = column![
            row![
                text("Save to:").width(Length::Fixed(LABEL_WIDTH)),
                text_input("video_downloads", &self.output_dir)
                    .on_input(DownloadMessage::OutputDirChanged)
                    .padding(6),
                button("Browse")
                    .on_press_maybe((!self.busy()).then_some(DownloadMessage::BrowsePressed)),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            row![
                text("Max Quality:").width(Length::Fixed(LABEL_WIDTH)),
                pick_list(
                    Resolution::ALL,
                    Some(self.max_quality),
                    DownloadMessage::QualitySelected
                ),
                Space::new().width(Length::Fixed(30.0)),
                text("Browser:"),
                pick_list(Browser::ALL, Some(self.browser), DownloadMessage::BrowserSelected),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            row![
                checkbox(self.skip_ads)
                    .label("Skip ads & sponsors")
                    .on_toggle(DownloadMessage::SkipAdsToggled),
                checkbox(self.embed_subs)
                    .label("Embed subtitles")
                    .on_toggle(DownloadMessage::SubsToggled),
                checkbox(self.download_playlist)
                    .label("Whole playlist")
                    .on_toggle(DownloadMessage::PlaylistToggled),
            ]
            .spacing(20),
            checkbox(self.use_cookies)
                .label("Use browser cookies (only for sites requiring login - close browser first!)")
                .on_toggle(DownloadMessage::CookiesToggled),
        ]
        .spacing(10);

        let download_label = if self.is_downloading {
            "Downloading..."
        } else {
            "Download Videos"
        };
        let actions = row![
            button(text(download_label))
                .on_press_maybe((!self.busy()).then_some(DownloadMessage::DownloadPressed))
                .padding([10, 20]),
            button("Clear")
                .on_press(DownloadMessage::ClearPressed)
                .padding([10, 20]),
        ]
        .spacing(10);

        let (done, total) = match &self.current {
            Some(p) => ((p.index - 1) as f32, p.total as f32),
            None if self.phase == DownloadPhase::Completed => (1.0, 1.0),
            None => (0.0, 1.0),
        };

        let mut status = row![text(self.status()).size(14)].spacing(20);
        if self.media_tool_missing {
            status = status.push(
                text("ffmpeg not found - high-quality downloads may fail")
                    .size(14)
                    .color(level_color(LogLevel::Warning)),
            );
        }

        column![
            text("Video Downloader").size(32),
            Space::new().height(Length::Fixed(10.0)),
            urls,
            settings,
            actions,
            text("Progress").size(16),
            log_panel(&self.logs),
            progress_bar(0.0..=total, done),
            status,
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => Color::from_rgb8(0xFF, 0x55, 0x55),
        LogLevel::Success => Color::from_rgb8(0x50, 0xFA, 0x7B),
        LogLevel::Warning => Color::from_rgb8(0xFF, 0xB8, 0x6C),
        LogLevel::Info => Color::from_rgb8(0x8B, 0xE9, 0xFD),
    }
}

fn log_panel(logs: &[LogLine]) -> Element<'_, DownloadMessage> {
    let lines = Column::with_children(logs.iter().map(|line| {
        text(format!("{} {}", line.level.icon(), line.text))
            .size(13)
            .color(level_color(line.level))
            .into()
    }))
    .spacing(2)
    .width(Length::Fill);

    container(scrollable(lines).anchor_bottom().height(Length::Fill))
        .padding(10)
        .height(Length::Fill)
        .width(Length::Fill)
        .style(|_| container::Style {
            background: Some(Background::Color(Color::from_rgb8(0x1E, 0x1E, 0x1E))),
            ..Default::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use video_downloader::application::{MediaToolStatus, ProbeReport};
    use video_downloader::domain::{AppError, BatchSummary, JobOutcome, JobResult, StreamKind};

    fn summary(results: &[JobResult]) -> BatchSummary {
        BatchSummary::from_outcomes(
            results
                .iter()
                .enumerate()
                .map(|(i, result)| JobOutcome {
                    url: format!("https://x.test/{}.mp4", i),
                    result: *result,
                })
                .collect(),
            PathBuf::from("out"),
        )
    }

    #[test]
    fn test_hint_text_has_no_urls() {
        let view = DownloadView::default();
        assert!(view.urls().is_empty());
    }

    #[test]
    fn test_options_from_form() {
        let mut view = DownloadView::default();
        view.update(DownloadMessage::QualitySelected(Resolution::P720));
        view.update(DownloadMessage::CookiesToggled(true));
        view.update(DownloadMessage::BrowserSelected(Browser::Brave));
        view.update(DownloadMessage::OutputDirChanged("  ".into()));

        let options = view.options();
        assert_eq!(options.max_quality, Resolution::P720);
        assert!(options.use_browser_cookies);
        assert_eq!(options.browser, Browser::Brave);
        assert_eq!(options.output_dir, PathBuf::from("video_downloads"));
        assert!(!options.embed_subs);
        assert!(options.user_agent.is_none());
    }

    #[test]
    fn test_clear_logs_message() {
        let mut view = DownloadView::default();
        view.update(DownloadMessage::ClearPressed);
        assert!(view.urls.text().trim().is_empty());
        assert_eq!(view.logs.last().unwrap().text, "URL list cleared");
    }

    #[test]
    fn test_batch_lifecycle() {
        let mut view = DownloadView::default();
        view.logs.push(LogLine::info("old"));
        view.begin_batch();
        assert!(view.is_downloading);
        assert!(view.logs.is_empty());

        view.apply(WorkerEvent::Progress(JobProgress {
            index: 1,
            total: 2,
            url: "https://x.test/0.mp4".into(),
            kind: StreamKind::DirectVideo,
        }));
        assert!(view.status().contains("1 of 2"));

        view.apply(WorkerEvent::Finished(Ok(BatchOutcome::Finished(summary(&[
            JobResult::Succeeded,
            JobResult::Failed,
        ])))));
        assert!(!view.is_downloading);
        assert_eq!(view.phase, DownloadPhase::Failed);
        assert!(view.current.is_none());
    }

    #[test]
    fn test_probe_events() {
        let mut view = DownloadView::default();
        view.begin_probe();
        assert!(view.busy());

        view.apply(WorkerEvent::Probed(Ok(ProbeReport {
            downloader_version: Some("2024.08.06".into()),
            media_tool: MediaToolStatus::Missing,
            advisories: vec![Advisory::MediaToolMissing],
        })));
        assert_eq!(view.phase, DownloadPhase::Idle);
        assert!(view.media_tool_missing);

        view.apply(WorkerEvent::Probed(Err(AppError::DependencyUnavailable {
            tool: "yt-dlp".into(),
            reason: "pip failed".into(),
        })));
        assert_eq!(view.phase, DownloadPhase::Failed);
        assert!(!view.busy());
    }

    #[test]
    fn test_summary_is_logged() {
        let mut view = DownloadView::default();
        view.begin_batch();

        let summary = summary(&[JobResult::Succeeded, JobResult::Failed]);
        view.apply(WorkerEvent::Complete(summary.clone()));
        view.apply(WorkerEvent::Finished(Ok(BatchOutcome::Finished(summary))));

        let logged = |needle: &str| view.logs.iter().any(|l| l.text.contains(needle));
        assert!(logged("Successfully downloaded: 1/2"));
        assert!(logged("Failed downloads: 1/2"));
        assert!(logged("   - https://x.test/1.mp4"));
        assert!(logged("HOW TO FIND VIDEO URLs ON PROTECTED SITES"));
        assert!(logged("Files saved to:"));
    }

    #[test]
    fn test_all_failed_batch_still_reports_counts() {
        let mut view = DownloadView::default();
        view.begin_batch();
        view.apply(WorkerEvent::Complete(summary(&[JobResult::Failed])));

        assert!(view
            .logs
            .iter()
            .any(|l| l.level == LogLevel::Error && l.text == "   - https://x.test/0.mp4"));
        assert!(view
            .logs
            .iter()
            .any(|l| l.text == "Successfully downloaded: 0/1"));
    }
}
