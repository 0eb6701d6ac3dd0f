//! Terminal progress bar for lattice searches.

use std::io::{self, IsTerminal};

use deid_core::ProgressObserver;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "{spinner:.cyan} {msg} [{bar:40.cyan/blue}] {pos}/{len} nodes";

/// Shows tagged/total lattice nodes on stderr.
pub struct SearchProgress {
    bar: ProgressBar,
}

impl SearchProgress {
    /// Creates a bar that stays hidden when `disabled` is set or stderr is
    /// not a terminal.
    pub fn new(disabled: bool) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        if disabled || !io::stderr().is_terminal() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message("searching lattice");
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    fn position(&self) -> (u64, Option<u64>) {
        (self.bar.position(), self.bar.length())
    }
}

impl ProgressObserver for SearchProgress {
    fn on_progress(&mut self, tagged: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(tagged as u64);
    }
}
