pub mod controls;
pub mod dialogs;
pub mod scatter;

pub use controls::{ControlAction, PlaybackControls};
pub use dialogs::FileDialogs;
pub use scatter::{PlotAction, ScatterPlotWindow};
