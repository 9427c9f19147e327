//! Real-time gyro spectrograph: per-axis magnitude spectra with running-peak
//! normalization and a max-hold envelope, drawn as an on-screen-display page.

pub mod axis;
pub mod display;
pub mod fft_analysis;
pub mod make_waves;
pub mod osd;
pub mod peak_hold;
pub mod presets;
pub mod sample_staging;
pub mod spectrum;
pub mod text_canvas;
pub mod utils;
pub mod window;

pub use axis::Axis;
pub use display::{GraphicsArea, NotchFilters, NotchSlot, SpecCommand, ViewController, ViewState};
pub use osd::OsdCanvas;
pub use sample_staging::{BufferState, SampleProducer};
pub use spectrum::{spectrograph, AxisSnapshot, CycleReport, SpectrumProcessor, SpectrumReader};
pub use window::{FftLength, SupportedLength};
