use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a detached run is in flight
#[derive(Clone)]
pub struct JobProgress {
    progress_bar: ProgressBar,
}

impl JobProgress {
    pub fn new(target: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(format!("{} を作成中... (Ctrl-C で中断)", target));
        pb.enable_steady_tick(Duration::from_millis(120));

        Self { progress_bar: pb }
    }

    pub fn set_message(&self, msg: &str) {
        self.progress_bar.set_message(msg.to_string());
    }

    pub fn finish_success(&self) {
        self.progress_bar.finish_with_message("作成完了 ✓");
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .finish_with_message(format!("失敗: {}", error));
    }
}
