use crate::core::{LinearScale, TimeScale, VesselType};
use crate::playback::{PlaybackEngine, TimelineScrubber};
use chrono::Datelike;
use imgui::{Condition, StyleColor, Ui};

/// Plot margins around the inner drawing area
const MARGIN_TOP: f32 = 20.0;
const MARGIN_RIGHT: f32 = 30.0;
const MARGIN_BOTTOM: f32 = 30.0;
const MARGIN_LEFT: f32 = 60.0;

const MARK_RADIUS: f32 = 5.0;
/// Horizontal slack for grabbing the playback cursor
const CURSOR_GRAB_PX: f32 = 6.0;

const AXIS_COLOR: [f32; 4] = [0.6, 0.6, 0.6, 0.8];
const GRID_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 0.15];
const CURSOR_COLOR: [f32; 4] = [1.0, 1.0, 0.5, 0.6];
const OTHER_TYPE_COLOR: [f32; 4] = [0.6, 0.6, 0.6, 1.0];

/// Mark color per vessel type (tableau-style palette); categories outside
/// the palette fall back to a neutral gray
pub fn type_color(kind: &VesselType) -> [f32; 4] {
    match kind {
        VesselType::Bark => [0.31, 0.47, 0.65, 1.0],
        VesselType::Brig => [0.95, 0.56, 0.17, 1.0],
        VesselType::Schooner => [0.88, 0.34, 0.35, 1.0],
        VesselType::Steamer => [0.46, 0.72, 0.70, 1.0],
        VesselType::Ship => [0.35, 0.63, 0.31, 1.0],
        VesselType::Sloop => [0.93, 0.79, 0.29, 1.0],
        VesselType::Barkentine => [0.69, 0.48, 0.63, 1.0],
        VesselType::Other(_) => OTHER_TYPE_COLOR,
    }
}

/// Interactions the plot hands back to the app shell
#[derive(Clone, Copy, Debug)]
pub enum PlotAction {
    None,
    /// A mark was clicked; play its cue directly
    PlayCue(usize),
    /// Cursor grabbed at a plot-relative x position
    ScrubBegin(f32),
    /// Pointer moved while the cursor is grabbed
    ScrubDrag(f32),
    /// Cursor released
    ScrubEnd(f32),
}

/// Date-vs-tonnage scatter plot with the draggable playback cursor
pub struct ScatterPlotWindow {
    last_scale: Option<TimeScale>,
    plot_width: f32,
}

impl Default for ScatterPlotWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl ScatterPlotWindow {
    pub fn new() -> Self {
        Self {
            last_scale: None,
            plot_width: 0.0,
        }
    }

    /// Time scale of the most recent frame, for resolving scrub drops
    pub fn time_scale(&self) -> Option<TimeScale> {
        self.last_scale
    }

    pub fn plot_width(&self) -> f32 {
        self.plot_width
    }

    pub fn render(
        &mut self,
        ui: &Ui,
        engine: &PlaybackEngine,
        scrubber: &TimelineScrubber,
        is_open: &mut bool,
    ) -> PlotAction {
        let mut action = PlotAction::None;

        ui.window("Vessel Traffic")
            .size([900.0, 520.0], Condition::FirstUseEver)
            .position([30.0, 40.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                action = self.render_content(ui, engine, scrubber);
            });

        action
    }

    fn render_content(
        &mut self,
        ui: &Ui,
        engine: &PlaybackEngine,
        scrubber: &TimelineScrubber,
    ) -> PlotAction {
        let events = engine.events();
        if events.is_empty() {
            ui.text("Open a vessel log to begin (File > Open Vessel Log...)");
            self.last_scale = None;
            return PlotAction::None;
        }

        let avail = ui.content_region_avail();
        let size = [avail[0].max(200.0), avail[1].max(160.0)];
        let cursor_pos = ui.cursor_screen_pos();
        let draw_list = ui.get_window_draw_list();

        // Inner plot rectangle
        let plot_min = [cursor_pos[0] + MARGIN_LEFT, cursor_pos[1] + MARGIN_TOP];
        let plot_max = [
            cursor_pos[0] + size[0] - MARGIN_RIGHT,
            cursor_pos[1] + size[1] - MARGIN_BOTTOM,
        ];
        let plot_width = plot_max[0] - plot_min[0];
        self.plot_width = plot_width;

        draw_list
            .add_rect(plot_min, plot_max, ui.style_color(StyleColor::FrameBg))
            .filled(true)
            .build();

        // Scales: x over the date extent, y over [0, max tonnage] with a
        // little headroom, pixel-flipped so larger values sit higher
        let (start, end) = match (engine.start_date(), engine.end_date()) {
            (Some(s), Some(e)) => (s, e),
            _ => return PlotAction::None,
        };
        let x_scale = TimeScale::new(start, end, (0.0, plot_width));
        self.last_scale = Some(x_scale);

        let max_tonnage = events.iter().fold(0.0_f64, |m, e| m.max(e.tonnage));
        let y_scale = LinearScale::new(
            (0.0, (max_tonnage * 1.05).max(1.0)),
            (plot_max[1] - plot_min[1], 0.0),
        );

        self.draw_axes(&draw_list, start, end, &x_scale, &y_scale, plot_min, plot_max);

        // Marks, with hover detection for the tooltip
        let mouse_pos = ui.io().mouse_pos;
        let mut hovered: Option<usize> = None;

        for (idx, event) in events.iter().enumerate() {
            let x = plot_min[0] + x_scale.map(event.date);
            let y = plot_min[1] + y_scale.map(event.tonnage);

            draw_list
                .add_circle([x, y], MARK_RADIUS, type_color(&event.kind))
                .filled(true)
                .num_segments(16)
                .build();

            let dx = mouse_pos[0] - x;
            let dy = mouse_pos[1] - y;
            if dx * dx + dy * dy <= (MARK_RADIUS + 2.0) * (MARK_RADIUS + 2.0) {
                hovered = Some(idx);
            }
        }

        // Playback cursor: the scrub echo while dragging, the engine's
        // current date otherwise
        let cursor_x = match scrubber.position() {
            Some(px) => Some(plot_min[0] + px),
            None => engine
                .current_date()
                .map(|d| plot_min[0] + x_scale.map(d)),
        };

        if let Some(cx) = cursor_x {
            draw_list
                .add_line([cx, plot_min[1]], [cx, plot_max[1]], CURSOR_COLOR)
                .thickness(2.0)
                .build();
        }

        // Cursor drag takes priority over mark clicks
        let in_plot = mouse_pos[0] >= plot_min[0]
            && mouse_pos[0] <= plot_max[0]
            && mouse_pos[1] >= plot_min[1]
            && mouse_pos[1] <= plot_max[1];
        let rel_x = mouse_pos[0] - plot_min[0];

        let on_cursor = matches!(cursor_x, Some(cx) if (mouse_pos[0] - cx).abs() <= CURSOR_GRAB_PX);

        let mut action = PlotAction::None;

        if scrubber.is_dragging() {
            if ui.is_mouse_down(imgui::MouseButton::Left) {
                action = PlotAction::ScrubDrag(rel_x);
            } else if ui.is_mouse_released(imgui::MouseButton::Left) {
                action = PlotAction::ScrubEnd(rel_x);
            }
        } else if in_plot && on_cursor && ui.is_mouse_clicked(imgui::MouseButton::Left) {
            action = PlotAction::ScrubBegin(rel_x);
        }

        if let Some(idx) = hovered {
            let event = &events[idx];
            ui.tooltip(|| {
                ui.text(&event.name);
                ui.text_colored(
                    [0.7, 0.7, 0.75, 1.0],
                    format!(
                        "{}, {}, {} tons",
                        event.kind.label(),
                        event.direction.label(),
                        event.tonnage
                    ),
                );
            });

            if matches!(action, PlotAction::None)
                && in_plot
                && !on_cursor
                && ui.is_mouse_clicked(imgui::MouseButton::Left)
            {
                action = PlotAction::PlayCue(idx);
            }
        }

        ui.dummy(size);
        action
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_axes(
        &self,
        draw_list: &imgui::DrawListMut,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
        x_scale: &TimeScale,
        y_scale: &LinearScale,
        plot_min: [f32; 2],
        plot_max: [f32; 2],
    ) {
        // Axis lines
        draw_list
            .add_line([plot_min[0], plot_max[1]], [plot_max[0], plot_max[1]], AXIS_COLOR)
            .build();
        draw_list
            .add_line([plot_min[0], plot_min[1]], [plot_min[0], plot_max[1]], AXIS_COLOR)
            .build();

        // Year ticks on the time axis, thinned to keep labels readable
        let year_span = (end.year() - start.year()).max(0);
        if year_span >= 1 {
            let step = (year_span / 6).max(1);
            let mut year = start.year();
            while year <= end.year() {
                if let Some(tick) = chrono::NaiveDate::from_ymd_opt(year, 1, 1) {
                    if tick >= start && tick <= end {
                        let x = plot_min[0] + x_scale.map(tick);
                        draw_list
                            .add_line([x, plot_max[1]], [x, plot_max[1] + 5.0], AXIS_COLOR)
                            .build();
                        draw_list.add_text(
                            [x - 14.0, plot_max[1] + 8.0],
                            AXIS_COLOR,
                            format!("{}", year),
                        );
                    }
                }
                year += step;
            }
        } else {
            // Short range: label the extent ends with full dates
            draw_list.add_text(
                [plot_min[0], plot_max[1] + 8.0],
                AXIS_COLOR,
                start.format("%Y-%m-%d").to_string(),
            );
            draw_list.add_text(
                [plot_max[0] - 70.0, plot_max[1] + 8.0],
                AXIS_COLOR,
                end.format("%Y-%m-%d").to_string(),
            );
        }

        // Tonnage gridlines
        let (_, y_max) = y_scale.domain();
        let step = nice_step(y_max, 5);
        let mut value = 0.0;
        while value <= y_max {
            let y = plot_min[1] + y_scale.map(value);
            draw_list
                .add_line([plot_min[0], y], [plot_max[0], y], GRID_COLOR)
                .build();
            draw_list
                .add_line([plot_min[0] - 5.0, y], [plot_min[0], y], AXIS_COLOR)
                .build();
            draw_list.add_text(
                [plot_min[0] - MARGIN_LEFT + 8.0, y - 7.0],
                AXIS_COLOR,
                format!("{:.0}", value),
            );
            value += step;
        }
    }
}

/// A 1/2/5-series step that yields at most `max_ticks` ticks over [0, max]
fn nice_step(max: f64, max_ticks: usize) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    let rough = max / max_ticks as f64;
    let magnitude = 10f64.powf(rough.log10().floor());
    for mult in [1.0, 2.0, 5.0, 10.0] {
        let step = magnitude * mult;
        if max / step <= max_ticks as f64 {
            return step;
        }
    }
    magnitude * 10.0
}
