use crate::ui::progress_message::{ProgressMessage, ProgressPhase};
use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, MultiProgress, ProgressBar};
use owo_colors::OwoColorize;
use std::thread;
use std::time::Duration;

/// Scan progress bar plus a linking spinner, fed over a channel so the
/// analysis never touches the terminal itself
pub struct ProgressManager {
    mp: MultiProgress,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProgressManager {
    pub fn new(total_files: usize) -> (Self, crossbeam::channel::Sender<ProgressMessage>) {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();
        let visible = console::Term::stdout().is_term();

        let mp = MultiProgress::new();
        let scanning = if visible {
            mp.add(ProgressBar::new(total_files as u64).with_message("Scanning files"))
        } else {
            ProgressBar::hidden()
        };
        let linking = if visible {
            mp.add(ProgressBar::new_spinner().with_message("Linking references"))
        } else {
            ProgressBar::hidden()
        };

        let handle = thread::spawn(move || {
            for msg in rx {
                match msg {
                    ProgressMessage::Progress {
                        phase: ProgressPhase::Scanning,
                        file,
                        ..
                    } => {
                        scanning.inc(1);
                        if let Some(f) = file {
                            scanning.set_message(format!("Scanning: {}", f));
                        }
                    }
                    ProgressMessage::Finished {
                        phase: ProgressPhase::Scanning,
                    } => {
                        scanning.finish_with_message("Scanned");
                    }
                    ProgressMessage::Started {
                        phase: ProgressPhase::Linking,
                        ..
                    } => {
                        linking.enable_steady_tick(Duration::from_millis(100));
                    }
                    ProgressMessage::Finished {
                        phase: ProgressPhase::Linking,
                    } => {
                        linking.finish_with_message("Linked");
                    }
                    _ => {}
                }
            }
        });

        (
            Self {
                mp,
                handle: Some(handle),
            },
            tx,
        )
    }

    /// Wait for the UI thread to drain; every sender must be dropped first
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }

    pub fn clear(&self) {
        self.mp.clear().ok();
    }

    pub fn finish_with_summary(&mut self, duration: Duration, files: usize, symbols: usize, edges: usize) {
        self.join();
        self.clear();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Analyzed in {}", HumanDuration(duration)).style(theme().success.clone())
        );
        println!(
            "  {} {} files  {} {} constants  {} {} dependencies",
            Icons::FILE.style(theme().info.clone()),
            files,
            Icons::PACKAGE.style(theme().info.clone()),
            symbols,
            Icons::LINK.style(theme().info.clone()),
            edges
        );
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if console::Term::stdout().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        } else {
            pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
