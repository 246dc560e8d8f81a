//! Sliding-window waveform rendering: window selection, axis scaling, background placement
//! and CPU rasterization of a frame.

pub mod placement;
pub mod plot;
pub mod raster;
pub mod window;

pub use placement::{place_background, DataRect};
pub use plot::{PlotState, Y_MARGIN};
pub use raster::{column_envelope, plot_area, rasterize};
pub use window::{VisibleWindow, WindowPoints, WINDOW_SECS};
