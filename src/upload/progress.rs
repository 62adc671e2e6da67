//! Synthetic upload progress
//!
//! The form posts natively, so there is no real progress signal. The bar just
//! creeps towards a ceiling until the browser navigates away.

use crate::config::ProgressConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticProgress {
    percent: u8,
    step: u8,
    ceiling: u8,
}

impl SyntheticProgress {
    pub fn new(config: &ProgressConfig) -> Self {
        Self {
            percent: 0,
            step: config.step_percent,
            ceiling: config.ceiling_percent,
        }
    }

    /// Advance one step. Returns the value to display, or `None` once the
    /// next step would pass the ceiling.
    pub fn tick(&mut self) -> Option<u8> {
        let next = self.percent.checked_add(self.step)?;
        if next > self.ceiling {
            return None;
        }
        self.percent = next;
        Some(next)
    }
}

/// CSS width for the progress bar
pub fn bar_width(percent: u8) -> String {
    format!("{}%", percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_progress_stops_at_ninety() {
        let mut progress = SyntheticProgress::new(&ProgressConfig::default());
        let shown: Vec<u8> = std::iter::from_fn(|| progress.tick()).collect();

        assert_eq!(shown, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);

        // Later ticks keep the bar where it is
        assert_eq!(progress.tick(), None);
        assert_eq!(progress.tick(), None);
    }

    #[test]
    fn test_uneven_step_never_passes_ceiling() {
        let mut progress = SyntheticProgress::new(&ProgressConfig {
            step_percent: 25,
            interval_ms: 200,
            ceiling_percent: 90,
        });
        let shown: Vec<u8> = std::iter::from_fn(|| progress.tick()).collect();
        assert_eq!(shown, vec![25, 50, 75]);
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(40), "40%");
    }
}
