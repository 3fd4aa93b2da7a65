use crate::core::{TimeScale, VesselEvent};
use crate::playback::PlaybackEngine;
use chrono::NaiveDate;

/// Drag-to-seek gesture over the plot's time axis.
///
/// While a drag is active the cursor is a pure visual echo of the pointer;
/// the playback position only changes when the gesture ends, snapped to
/// the nearest actual event date. Starting a gesture interrupts playback
/// immediately, so the engine and the scrubber never race on the cursor.
pub struct TimelineScrubber {
    /// Clamped pixel position of the pointer while a drag is active
    grab_x: Option<f32>,
}

impl Default for TimelineScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineScrubber {
    pub fn new() -> Self {
        Self { grab_x: None }
    }

    pub fn is_dragging(&self) -> bool {
        self.grab_x.is_some()
    }

    /// Visual echo position while dragging
    pub fn position(&self) -> Option<f32> {
        self.grab_x
    }

    /// Gesture start: halt playback unconditionally and grab the cursor
    pub fn begin(&mut self, engine: &mut PlaybackEngine, x: f32, plot_width: f32) {
        engine.interrupt();
        self.grab_x = Some(x.clamp(0.0, plot_width));
    }

    /// Gesture move: the marker follows the pointer, nothing else changes
    pub fn drag(&mut self, x: f32, plot_width: f32) {
        if self.grab_x.is_some() {
            self.grab_x = Some(x.clamp(0.0, plot_width));
        }
    }

    /// Gesture end: resolve the drop position to the nearest event date and
    /// reposition the playback cursor there.
    ///
    /// Returns the snapped date so the caller can place the marker at its
    /// exact pixel rather than the raw drop position. `None` when no drag
    /// was active or the dataset has no dates to snap to.
    pub fn end(
        &mut self,
        engine: &mut PlaybackEngine,
        scale: &TimeScale,
        x: f32,
        plot_width: f32,
    ) -> Option<NaiveDate> {
        self.grab_x.take()?;

        let target = scale.invert_days(x.clamp(0.0, plot_width));
        let snapped = nearest_event_date(engine.events(), target)?;
        engine.seek_to_date(snapped);
        Some(snapped)
    }
}

/// Nearest distinct event date to a fractional day number, by absolute
/// distance. Ties resolve to the first date in scan order. `None` on an
/// empty dataset.
pub fn nearest_event_date(events: &[VesselEvent], target_days: f64) -> Option<NaiveDate> {
    let mut best: Option<(f64, NaiveDate)> = None;
    for event in events {
        let dist = (event.day_number() as f64 - target_days).abs();
        match best {
            Some((best_dist, _)) if dist >= best_dist => {}
            _ => best = Some((dist, event.date)),
        }
    }
    best.map(|(_, date)| date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{day_number, Direction, VesselType};

    fn event(name: &str, date: (i32, u32, u32)) -> VesselEvent {
        VesselEvent::new(
            name,
            VesselType::Bark,
            Direction::Outbound,
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            120.0,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nearest_between_dates_picks_closer() {
        let events = vec![
            event("A", (1890, 1, 1)),
            event("B", (1890, 1, 11)),
            event("C", (1890, 1, 21)),
        ];
        // Strictly between the first two, closer to the second
        let target = day_number(date(1890, 1, 8)) as f64;
        assert_eq!(nearest_event_date(&events, target), Some(date(1890, 1, 11)));
    }

    #[test]
    fn test_nearest_exact_hit() {
        let events = vec![event("A", (1890, 1, 1)), event("B", (1890, 1, 11))];
        let target = day_number(date(1890, 1, 11)) as f64;
        assert_eq!(nearest_event_date(&events, target), Some(date(1890, 1, 11)));
    }

    #[test]
    fn test_nearest_tie_first_wins() {
        let events = vec![event("A", (1890, 1, 1)), event("B", (1890, 1, 3))];
        // Exactly halfway
        let target = day_number(date(1890, 1, 2)) as f64;
        assert_eq!(nearest_event_date(&events, target), Some(date(1890, 1, 1)));
    }

    #[test]
    fn test_nearest_empty_dataset() {
        assert_eq!(nearest_event_date(&[], 100.0), None);
    }

    #[test]
    fn test_begin_interrupts_playback() {
        let mut engine = PlaybackEngine::new(vec![event("A", (1890, 1, 1))]);
        engine.play();
        assert!(engine.is_playing());

        let mut scrubber = TimelineScrubber::new();
        scrubber.begin(&mut engine, 40.0, 100.0);
        assert!(!engine.is_playing());
        assert!(scrubber.is_dragging());
    }

    #[test]
    fn test_drag_clamps_to_plot_width() {
        let mut engine = PlaybackEngine::new(vec![event("A", (1890, 1, 1))]);
        let mut scrubber = TimelineScrubber::new();
        scrubber.begin(&mut engine, 40.0, 100.0);
        scrubber.drag(250.0, 100.0);
        assert_eq!(scrubber.position(), Some(100.0));
        scrubber.drag(-30.0, 100.0);
        assert_eq!(scrubber.position(), Some(0.0));
    }

    #[test]
    fn test_end_seeks_first_record_of_snapped_date() {
        let mut engine = PlaybackEngine::new(vec![
            event("A", (1890, 1, 1)),
            event("B", (1890, 1, 11)),
            event("C", (1890, 1, 11)),
        ]);
        let scale = TimeScale::new(date(1890, 1, 1), date(1890, 1, 11), (0.0, 100.0));

        let mut scrubber = TimelineScrubber::new();
        scrubber.begin(&mut engine, 0.0, 100.0);
        // Drop at 70% of the axis: between the dates, closer to Jan 11
        let snapped = scrubber.end(&mut engine, &scale, 70.0, 100.0);
        assert_eq!(snapped, Some(date(1890, 1, 11)));
        assert_eq!(engine.position(), 1);
        assert!(!scrubber.is_dragging());
    }

    #[test]
    fn test_end_without_begin_is_inert() {
        let mut engine = PlaybackEngine::new(vec![event("A", (1890, 1, 1))]);
        let scale = TimeScale::new(date(1890, 1, 1), date(1890, 1, 11), (0.0, 100.0));
        let mut scrubber = TimelineScrubber::new();
        assert_eq!(scrubber.end(&mut engine, &scale, 50.0, 100.0), None);
        assert_eq!(engine.position(), 0);
    }

    #[test]
    fn test_end_on_empty_dataset_leaves_engine_untouched() {
        let mut engine = PlaybackEngine::new(vec![]);
        let scale = TimeScale::new(date(1890, 1, 1), date(1890, 1, 11), (0.0, 100.0));
        let mut scrubber = TimelineScrubber::new();
        scrubber.begin(&mut engine, 10.0, 100.0);
        assert_eq!(scrubber.end(&mut engine, &scale, 50.0, 100.0), None);
        assert_eq!(engine.position(), 0);
    }
}
