//! The retained image/screen table and the software rasterizer's
//! compositing primitives: blit, line, ellipse, arc, and polygon, all
//! honouring clip rectangles, replication tiling, and Porter–Duff
//! operators.

pub mod image;
pub mod operator;
pub mod raster;
pub mod refresh;
pub mod screen;
pub mod store;

pub use image::Image;
pub use operator::Operator;
pub use raster::Winding;
pub use refresh::RefreshTracker;
pub use screen::Screen;
pub use store::{ImageStore, RefreshMethod, DISPLAY_ID};
