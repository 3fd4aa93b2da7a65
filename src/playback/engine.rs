use crate::core::VesselEvent;
use crate::playback::PlaybackState;
use chrono::NaiveDate;
use std::time::{Duration, Instant};

/// Settle time between cues inside a day group. Fixed: the chord stagger
/// of same-day arrivals stays audible at any playback speed.
pub const CUE_SETTLE: Duration = Duration::from_millis(300);

/// Base hold between day groups, divided by the speed multiplier.
pub const GROUP_HOLD: Duration = Duration::from_millis(400);

const MIN_SPEED: f64 = 0.1;
const MAX_SPEED: f64 = 10.0;

/// Where the engine is inside one advancement step
#[derive(Debug, Clone, Copy, PartialEq)]
enum StepPhase {
    /// Between steps; the next `update` enters the group at the cursor
    Idle,
    /// Emitting cues for the group ending (exclusive) at `group_end`;
    /// `next` is the next event to cue once `deadline` passes
    Sounding {
        group_end: usize,
        next: usize,
        deadline: Instant,
    },
    /// Inter-group hold before entering the group at the cursor
    Holding { deadline: Instant },
}

/// Playback engine for vessel traffic data.
///
/// Owns the date-sorted event sequence and advances through it one day
/// group at a time, reporting which events to cue from `update`. The
/// engine is driven cooperatively, one `update(now)` call per UI frame,
/// and never sleeps or touches audio itself.
pub struct PlaybackEngine {
    events: Vec<VesselEvent>,
    current_index: usize,
    speed: f64,
    state: PlaybackState,
    pause_requested: bool,
    phase: StepPhase,
}

impl PlaybackEngine {
    pub fn new(mut events: Vec<VesselEvent>) -> Self {
        // The whole day-group machinery assumes a date-sorted sequence
        events.sort_by_key(|e| e.date);

        Self {
            events,
            current_index: 0,
            speed: 1.0,
            state: PlaybackState::Stopped,
            pause_requested: false,
            phase: StepPhase::Idle,
        }
    }

    pub fn events(&self) -> &[VesselEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Current playback position (index into the sorted sequence)
    pub fn position(&self) -> usize {
        self.current_index
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Set playback speed, clamped so waits can never be zero or infinite.
    /// Takes effect on the next wait, not retroactively.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Start or resume playback from the current position.
    /// At the end of the sequence this restarts from the beginning.
    pub fn play(&mut self) {
        if self.state == PlaybackState::Playing || self.events.is_empty() {
            return;
        }
        if self.current_index >= self.events.len() {
            self.current_index = 0;
        }
        self.pause_requested = false;
        self.phase = StepPhase::Idle;
        self.state = PlaybackState::Playing;
    }

    /// Request suspension without resetting the position.
    ///
    /// Observed at the next group boundary: cues of the in-flight day
    /// group still fire and the cursor advances past that group before
    /// the engine suspends. Use `interrupt` for an immediate stop.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        match self.phase {
            StepPhase::Sounding { .. } => self.pause_requested = true,
            _ => {
                self.phase = StepPhase::Idle;
                self.state = PlaybackState::Paused;
            }
        }
    }

    /// Halt immediately, abandoning any in-flight group without advancing
    /// the cursor or emitting further cues. Used by the scrub handler.
    pub fn interrupt(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
        self.pause_requested = false;
        self.phase = StepPhase::Idle;
    }

    /// Move the cursor to the first record with the given date.
    /// Interrupts any in-flight step; does not start playback.
    pub fn seek_to_date(&mut self, date: NaiveDate) {
        self.interrupt();
        self.current_index = self.events.partition_point(|e| e.date < date);
    }

    /// Date at the cursor, or the last date once playback has run out
    pub fn current_date(&self) -> Option<NaiveDate> {
        if self.events.is_empty() {
            return None;
        }
        match self.events.get(self.current_index) {
            Some(e) => Some(e.date),
            None => self.events.last().map(|e| e.date),
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.events.first().map(|e| e.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.events.last().map(|e| e.date)
    }

    /// Advance the state machine to `now` (call once per frame).
    ///
    /// Returns the indices of events whose cue fired during this tick,
    /// in sequence order. Several deadlines may have elapsed in a long
    /// frame; they are all processed.
    pub fn update(&mut self, now: Instant) -> Vec<usize> {
        let mut fired = Vec::new();
        if self.state != PlaybackState::Playing {
            return fired;
        }

        loop {
            match self.phase {
                StepPhase::Idle => {
                    if !self.enter_group(now, &mut fired) {
                        break;
                    }
                }
                StepPhase::Sounding {
                    group_end,
                    next,
                    deadline,
                } => {
                    if deadline > now {
                        break;
                    }
                    if next < group_end {
                        fired.push(next);
                        self.phase = StepPhase::Sounding {
                            group_end,
                            next: next + 1,
                            deadline: deadline + CUE_SETTLE,
                        };
                    } else {
                        // Group boundary: advance the cursor, then observe
                        // pause requests and the end of the sequence
                        self.current_index = group_end;
                        if self.pause_requested {
                            self.pause_requested = false;
                            self.phase = StepPhase::Idle;
                            self.state = PlaybackState::Paused;
                            break;
                        }
                        if self.current_index >= self.events.len() {
                            self.phase = StepPhase::Idle;
                            self.state = PlaybackState::Stopped;
                            break;
                        }
                        self.phase = StepPhase::Holding {
                            deadline: deadline + self.group_hold(),
                        };
                    }
                }
                StepPhase::Holding { deadline } => {
                    if deadline > now {
                        break;
                    }
                    if !self.enter_group(now, &mut fired) {
                        break;
                    }
                }
            }
        }

        fired
    }

    /// Begin the day group at the cursor, firing its first cue.
    /// Returns false if the cursor is already past the end.
    fn enter_group(&mut self, now: Instant, fired: &mut Vec<usize>) -> bool {
        if self.current_index >= self.events.len() {
            self.phase = StepPhase::Idle;
            self.state = PlaybackState::Stopped;
            return false;
        }
        let group_end = self.day_group_end(self.current_index);
        fired.push(self.current_index);
        self.phase = StepPhase::Sounding {
            group_end,
            next: self.current_index + 1,
            deadline: now + CUE_SETTLE,
        };
        true
    }

    /// End (exclusive) of the contiguous run of records sharing the date
    /// at `start`
    fn day_group_end(&self, start: usize) -> usize {
        let date = self.events[start].date;
        let mut end = start + 1;
        while end < self.events.len() && self.events[end].date == date {
            end += 1;
        }
        end
    }

    fn group_hold(&self) -> Duration {
        Duration::from_secs_f64(GROUP_HOLD.as_secs_f64() / self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Direction, VesselType};

    fn event(name: &str, date: (i32, u32, u32), tonnage: f64) -> VesselEvent {
        VesselEvent::new(
            name,
            VesselType::Schooner,
            Direction::Inbound,
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            tonnage,
        )
    }

    /// Drive the engine to completion with synthetic time, collecting the
    /// order in which cues fired
    fn run_to_end(engine: &mut PlaybackEngine, start: Instant) -> Vec<usize> {
        let mut fired = Vec::new();
        let mut now = start;
        // Step well past any deadline each iteration
        for _ in 0..10_000 {
            fired.extend(engine.update(now));
            if !engine.is_playing() {
                break;
            }
            now += Duration::from_millis(100);
        }
        assert!(!engine.is_playing(), "engine did not run to completion");
        fired
    }

    #[test]
    fn test_visits_every_record_once() {
        let mut engine = PlaybackEngine::new(vec![
            event("A", (1890, 1, 1), 100.0),
            event("B", (1890, 1, 2), 200.0),
            event("C", (1890, 1, 2), 300.0),
            event("D", (1890, 2, 10), 50.0),
        ]);
        engine.play();
        let fired = run_to_end(&mut engine, Instant::now());
        assert_eq!(fired, vec![0, 1, 2, 3]);
        assert_eq!(engine.position(), 4);
        assert_eq!(engine.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_day_group_cues_before_advancing() {
        let mut engine = PlaybackEngine::new(vec![
            event("A", (1890, 1, 1), 100.0),
            event("B", (1890, 1, 1), 200.0),
            event("C", (1890, 1, 1), 300.0),
            event("D", (1890, 1, 5), 50.0),
        ]);
        engine.play();

        let t0 = Instant::now();
        // First cue fires on group entry, index untouched
        assert_eq!(engine.update(t0), vec![0]);
        assert_eq!(engine.position(), 0);

        // Second and third cues at settle spacing, still index 0
        assert_eq!(engine.update(t0 + CUE_SETTLE), vec![1]);
        assert_eq!(engine.update(t0 + CUE_SETTLE * 2), vec![2]);
        assert_eq!(engine.position(), 0);

        // One more settle closes the group and advances by its size
        assert_eq!(engine.update(t0 + CUE_SETTLE * 3), Vec::<usize>::new());
        assert_eq!(engine.position(), 3);
    }

    #[test]
    fn test_end_to_end_scenario() {
        // A and B share a date, C follows two days later
        let mut engine = PlaybackEngine::new(vec![
            event("A", (2021, 1, 1), 100.0),
            event("B", (2021, 1, 1), 200.0),
            event("C", (2021, 1, 3), 50.0),
        ]);
        engine.play();
        assert_eq!(engine.position(), 0);

        let t0 = Instant::now();
        assert_eq!(engine.update(t0), vec![0]);
        assert_eq!(engine.update(t0 + CUE_SETTLE), vec![1]);

        // Group of two closes
        assert_eq!(engine.update(t0 + CUE_SETTLE * 2), Vec::<usize>::new());
        assert_eq!(engine.position(), 2);

        // After the hold, C's group begins
        let c_at = t0 + CUE_SETTLE * 2 + GROUP_HOLD;
        assert_eq!(engine.update(c_at), vec![2]);
        assert_eq!(engine.position(), 2);

        assert_eq!(engine.update(c_at + CUE_SETTLE), Vec::<usize>::new());
        assert_eq!(engine.position(), 3);
        assert!(!engine.is_playing());
    }

    #[test]
    fn test_pause_finishes_group_then_suspends() {
        let mut engine = PlaybackEngine::new(vec![
            event("A", (1890, 1, 1), 100.0),
            event("B", (1890, 1, 1), 200.0),
            event("C", (1890, 1, 9), 300.0),
        ]);
        engine.play();

        let t0 = Instant::now();
        assert_eq!(engine.update(t0), vec![0]);

        // Pause mid-group: the remaining cue still fires, the cursor
        // advances past the group, then the engine suspends
        engine.pause();
        assert!(engine.is_playing());
        assert_eq!(engine.update(t0 + CUE_SETTLE), vec![1]);
        let fired = engine.update(t0 + Duration::from_secs(60));
        assert_eq!(fired, Vec::<usize>::new());
        assert_eq!(engine.state(), PlaybackState::Paused);
        assert_eq!(engine.position(), 2);

        // Resume continues from that exact index
        engine.play();
        assert_eq!(engine.update(t0 + Duration::from_secs(61)), vec![2]);
    }

    #[test]
    fn test_interrupt_is_immediate() {
        let mut engine = PlaybackEngine::new(vec![
            event("A", (1890, 1, 1), 100.0),
            event("B", (1890, 1, 1), 200.0),
        ]);
        engine.play();

        let t0 = Instant::now();
        assert_eq!(engine.update(t0), vec![0]);

        engine.interrupt();
        assert_eq!(engine.state(), PlaybackState::Paused);
        // No trailing cues, cursor untouched
        assert_eq!(engine.update(t0 + Duration::from_secs(60)), Vec::<usize>::new());
        assert_eq!(engine.position(), 0);
    }

    #[test]
    fn test_speed_scales_group_hold_only() {
        let make = || {
            let mut e = PlaybackEngine::new(vec![
                event("A", (1890, 1, 1), 100.0),
                event("B", (1890, 1, 4), 200.0),
            ]);
            e.play();
            e
        };

        // At 1x the next group starts at settle + hold
        let mut engine = make();
        let t0 = Instant::now();
        assert_eq!(engine.update(t0), vec![0]);
        let boundary = t0 + CUE_SETTLE + GROUP_HOLD;
        assert_eq!(engine.update(boundary - Duration::from_millis(1)), Vec::<usize>::new());
        assert_eq!(engine.update(boundary), vec![1]);

        // At 2x the hold halves; the settle interval does not
        let mut engine = make();
        engine.set_speed(2.0);
        let t0 = Instant::now();
        assert_eq!(engine.update(t0), vec![0]);
        let boundary = t0 + CUE_SETTLE + GROUP_HOLD / 2;
        assert_eq!(engine.update(boundary - Duration::from_millis(1)), Vec::<usize>::new());
        assert_eq!(engine.update(boundary), vec![1]);
    }

    #[test]
    fn test_speed_clamped_to_floor() {
        let mut engine = PlaybackEngine::new(vec![]);
        engine.set_speed(0.0);
        assert_eq!(engine.speed(), 0.1);
        engine.set_speed(-3.0);
        assert_eq!(engine.speed(), 0.1);
        engine.set_speed(100.0);
        assert_eq!(engine.speed(), 10.0);
    }

    #[test]
    fn test_empty_dataset_never_plays() {
        let mut engine = PlaybackEngine::new(vec![]);
        engine.play();
        assert!(!engine.is_playing());
        assert_eq!(engine.update(Instant::now()), Vec::<usize>::new());
        assert_eq!(engine.current_date(), None);
    }

    #[test]
    fn test_play_at_end_restarts() {
        let mut engine = PlaybackEngine::new(vec![event("A", (1890, 1, 1), 100.0)]);
        engine.play();
        run_to_end(&mut engine, Instant::now());
        assert_eq!(engine.position(), 1);

        engine.play();
        assert_eq!(engine.position(), 0);
        assert!(engine.is_playing());
    }

    #[test]
    fn test_new_sorts_by_date() {
        let engine = PlaybackEngine::new(vec![
            event("late", (1891, 6, 1), 100.0),
            event("early", (1890, 1, 1), 200.0),
        ]);
        assert_eq!(engine.events()[0].name, "early");
        assert_eq!(engine.events()[1].name, "late");
    }

    #[test]
    fn test_seek_to_date_lands_on_first_of_group() {
        let mut engine = PlaybackEngine::new(vec![
            event("A", (1890, 1, 1), 100.0),
            event("B", (1890, 1, 5), 200.0),
            event("C", (1890, 1, 5), 300.0),
        ]);
        engine.play();
        engine.seek_to_date(NaiveDate::from_ymd_opt(1890, 1, 5).unwrap());
        assert_eq!(engine.position(), 1);
        assert!(!engine.is_playing());
    }
}
