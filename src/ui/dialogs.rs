use rfd::FileDialog;
use std::path::PathBuf;

/// File dialog helper for Harbor-Viz
pub struct FileDialogs;

impl FileDialogs {
    /// Open a file dialog for selecting a vessel log
    pub fn open_vessel_log() -> Option<PathBuf> {
        FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .add_filter("All Files", &["*"])
            .set_title("Open Vessel Log")
            .pick_file()
    }
}
