/// DOM ids, browser-side tuning and file names.
///
/// Simulation constants live in `sgraffito_core::constants`; these only
/// concern the page and the WebAudio graph.

// Elements looked up at startup
pub const CANVAS_ID: &str = "ink-canvas";
pub const STATUS_ID: &str = "status-overlay";
pub const BTN_CLEAR_ID: &str = "btn-clear";
pub const BTN_EXPORT_ID: &str = "btn-export";
pub const BTN_MIC_ID: &str = "btn-mic";
pub const BTN_GYRO_ID: &str = "btn-gyro";

// Analyser: 512 byte bins, heavily smoothed by the browser
pub const FFT_SIZE: u32 = 1024;
pub const ANALYSER_SMOOTHING: f64 = 0.85;

pub const EXPORT_FILENAME: &str = "sgraffito-cercle.png";
