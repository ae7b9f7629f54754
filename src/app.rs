use std::future::Future;
use std::path::PathBuf;

use futures::stream;
use iced::Task;
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageLevel};
use tracing::info;
use video_downloader::application::presenter::absolute_display;
use video_downloader::application::{
    ChannelPresenter, DownloadCoordinator, OutputMode, Toolchain, WorkerEvent,
};
use video_downloader::domain::{BatchOutcome, DownloadPhase};

use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
}

impl DownloadApp {
    /// Builds the window state and kicks off the dependency check.
    pub fn new() -> (Self, Task<Message>) {
        let mut app = Self {
            view: DownloadView::default(),
            coordinator: DownloadCoordinator::new(Toolchain::default(), OutputMode::Filtered),
        };
        let task = app.check_dependencies();
        (app, task)
    }

    fn check_dependencies(&mut self) -> Task<Message> {
        self.view.begin_probe();
        let coordinator = self.coordinator.clone();
        spawn_worker(move |mut presenter| async move {
            let result = coordinator.ensure_dependencies(&mut presenter).await;
            presenter.probed(result);
        })
    }

    fn start_download(&mut self) -> Task<Message> {
        if self.view.is_downloading {
            return message_dialog(
                MessageLevel::Warning,
                "Download in Progress",
                "A download is already in progress!".to_string(),
            );
        }
        if self.view.phase == DownloadPhase::CheckingDependencies {
            return message_dialog(
                MessageLevel::Warning,
                "Please Wait",
                "Still checking dependencies, try again in a moment.".to_string(),
            );
        }

        let urls = self.view.urls();
        if urls.is_empty() {
            return message_dialog(
                MessageLevel::Warning,
                "No URLs",
                "Please add at least one video URL!".to_string(),
            );
        }

        let options = self.view.options();
        self.view.begin_batch();
        info!("starting download of {} url(s)", urls.len());

        let coordinator = self.coordinator.clone();
        spawn_worker(move |mut presenter| async move {
            let result = coordinator.run_batch(&urls, &options, &mut presenter).await;
            presenter.finished(result);
        })
    }

    fn on_worker_event(&mut self, event: WorkerEvent) -> Task<Message> {
        let completion = match &event {
            WorkerEvent::Finished(Ok(BatchOutcome::Finished(summary))) if summary.succeeded > 0 => {
                Some(format!(
                    "Successfully downloaded {}/{} video(s)!\n\nSaved to: {}",
                    summary.succeeded,
                    summary.total,
                    absolute_display(&summary.output_dir)
                ))
            }
            _ => None,
        };

        self.view.apply(event);

        match completion {
            Some(description) => {
                message_dialog(MessageLevel::Info, "Download Complete", description)
            }
            None => Task::none(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Ui(DownloadMessage),
    FolderPicked(Option<PathBuf>),
    Worker(WorkerEvent),
    DialogClosed,
}

/// Runs `work` in the background and turns everything it reports into
/// `Message::Worker`. The stream ends when the presenter is dropped.
fn spawn_worker<F, Fut>(work: F) -> Task<Message>
where
    F: FnOnce(ChannelPresenter) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (presenter, receiver) = ChannelPresenter::new();
    let events = stream::unfold(receiver, |mut receiver| async move {
        receiver.recv().await.map(|event| (event, receiver))
    });

    Task::batch([
        Task::future(work(presenter)).discard(),
        Task::stream(events).map(Message::Worker),
    ])
}

fn message_dialog(level: MessageLevel, title: &str, description: String) -> Task<Message> {
    let dialog = AsyncMessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok);

    Task::perform(dialog.show(), |_| Message::DialogClosed)
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::Ui(DownloadMessage::DownloadPressed) => app.start_download(),
        Message::Ui(DownloadMessage::BrowsePressed) => {
            let start = PathBuf::from(app.view.output_dir.trim());
            Task::perform(
                async move {
                    AsyncFileDialog::new()
                        .set_directory(&start)
                        .pick_folder()
                        .await
                        .map(|handle| handle.path().to_path_buf())
                },
                Message::FolderPicked,
            )
        }
        Message::Ui(ui_msg) => {
            app.view.update(ui_msg);
            Task::none()
        }
        Message::FolderPicked(Some(folder)) => {
            app.view.output_dir = folder.display().to_string();
            Task::none()
        }
        // User cancelled dialog
        Message::FolderPicked(None) => Task::none(),
        Message::Worker(event) => app.on_worker_event(event),
        Message::DialogClosed => Task::none(),
    }
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::Ui)
}
