#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the `cbrne_map` binary.
//!
//! [`init_logger`] routes `log` output through `indicatif-log-bridge` so log
//! lines are printed above live progress bars instead of tearing them.
//! [`ResolutionBar`] renders the resolver's [`ProgressCallback`] as a bar
//! counting incidents, with the city being resolved as its message.

use std::sync::Arc;
use std::time::Duration;

use cbrne_map_resolver::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Log filter used when `RUST_LOG` is unset. Corrections are logged at
/// info and should be visible by default.
pub const DEFAULT_LOG_FILTER: &str = "info";

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str = "  {wide_bar:.cyan/dim} {pos}/{len} incidents [{elapsed}<{eta}] {msg}";

/// Progress of a resolution pass over incident records.
pub struct ResolutionBar {
    bar: ProgressBar,
    counting: ProgressStyle,
}

impl ResolutionBar {
    /// Adds a bar to `multi`. It spins until the resolver reports how many
    /// records it will visit.
    #[must_use]
    pub fn add_to(multi: &MultiProgress, label: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(label.to_string());

        let counting = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        Arc::new(Self { bar, counting })
    }
}

impl ProgressCallback for ResolutionBar {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.counting.clone());
        self.bar.set_length(total);
        self.bar.reset();
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.disable_steady_tick();
        self.bar.finish_with_message(msg);
    }
}

/// Installs the global logger behind `indicatif-log-bridge`.
///
/// The filter comes from `RUST_LOG`, falling back to
/// [`DEFAULT_LOG_FILTER`]. Returns the [`MultiProgress`] every progress bar
/// must be added to. Calling it again keeps the first logger.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let logger = pretty_env_logger::formatted_builder()
        .parse_filters(&filter)
        .build();
    let max_level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    #[test]
    fn bar_tracks_resolver_callbacks() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let bar = multi.add(ProgressBar::new_spinner());
        let progress = ResolutionBar {
            bar: bar.clone(),
            counting: ProgressStyle::default_bar(),
        };

        progress.set_total(4);
        progress.inc(3);
        progress.set_message("Kyiv, Ukraine".to_string());

        assert_eq!(bar.length(), Some(4));
        assert_eq!(bar.position(), 3);
        assert_eq!(bar.message(), "Kyiv, Ukraine");

        progress.finish("done".to_string());
        assert!(bar.is_finished());
    }

    #[test]
    fn init_logger_can_be_called_twice() {
        let _first = init_logger();
        let _second = init_logger();
        assert!(log::max_level() >= log::LevelFilter::Error);
    }
}
