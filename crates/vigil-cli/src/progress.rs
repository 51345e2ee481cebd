use indicatif::{ProgressBar, ProgressStyle};
use vigil_core::entities::RunResult;

use crate::ui;

const TEMPLATE: &str = "{spinner:.cyan} [{pos}/{len}] {elapsed:>4} {wide_msg}";

/// Progress over a batch of runs on stderr; inert when progress is disabled.
pub struct RunProgress {
    bar: Option<ProgressBar>,
}

impl RunProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        if !ui::prefs().progress {
            return Self { bar: None };
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar: Some(bar) }
    }

    pub fn started(&self, unit: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("running {unit}"));
        }
    }

    /// Advance and leave a one-line verdict above the bar.
    pub fn finished(&self, result: &RunResult) {
        if let Some(bar) = &self.bar {
            bar.println(format!(
                "{:>9}  {} ({} ms)",
                result.outcome, result.qualified_name, result.duration_ms
            ));
            bar.inc(1);
        }
    }

    pub fn clear(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
