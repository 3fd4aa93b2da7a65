use crate::playback::{PlaybackEngine, PlaybackState};
use imgui::{Condition, Ui};

/// Speed options offered by the selector
const SPEEDS: &[(&str, f64)] = &[("0.5x", 0.5), ("1x", 1.0), ("2x", 2.0), ("4x", 4.0)];

/// Actions returned by the playback controls
#[derive(Clone, Copy, Debug)]
pub enum ControlAction {
    None,
    Play,
    Pause,
    SetSpeed(f64),
}

/// Play / pause buttons and the speed selector
pub struct PlaybackControls {
    speed_index: usize,
}

impl Default for PlaybackControls {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackControls {
    pub fn new() -> Self {
        Self { speed_index: 1 }
    }

    pub fn render(&mut self, ui: &Ui, engine: &PlaybackEngine, is_open: &mut bool) -> ControlAction {
        let mut action = ControlAction::None;

        ui.window("Playback")
            .size([260.0, 120.0], Condition::FirstUseEver)
            .position([30.0, 580.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                action = self.render_content(ui, engine);
            });

        action
    }

    fn render_content(&mut self, ui: &Ui, engine: &PlaybackEngine) -> ControlAction {
        let mut action = ControlAction::None;

        if engine.is_playing() {
            if ui.button("Pause") {
                action = ControlAction::Pause;
            }
        } else if ui.button("Play") {
            action = ControlAction::Play;
        }
        ui.same_line();

        ui.set_next_item_width(80.0);
        let labels: Vec<&str> = SPEEDS.iter().map(|(label, _)| *label).collect();
        if ui.combo_simple_string("Speed", &mut self.speed_index, &labels) {
            action = ControlAction::SetSpeed(SPEEDS[self.speed_index].1);
        }

        match engine.state() {
            PlaybackState::Stopped if engine.position() >= engine.len() && !engine.is_empty() => {
                ui.text("Finished");
            }
            PlaybackState::Stopped => ui.text("Stopped"),
            PlaybackState::Playing => ui.text("Playing"),
            PlaybackState::Paused => ui.text("Paused"),
        }

        if let Some(date) = engine.current_date() {
            ui.text_colored(
                [0.7, 0.8, 0.9, 1.0],
                format!(
                    "{}  (vessel {} / {})",
                    date.format("%Y-%m-%d"),
                    engine.position().min(engine.len()),
                    engine.len()
                ),
            );
        }

        action
    }
}
