// Core of a virtual-camera background application: the persisted background
// image library and the camera source selection policy. Presentation (grid,
// file picker, windowing) lives in the host and calls in through these
// modules.

pub mod background;
pub mod camera;
pub mod codec;
pub mod config;

pub use background::store::BackgroundStore;
pub use background::types::{ImageId, ImageRecord, StoreEvent};
pub use camera::selector::{select_source, Selection};
pub use config::SelectorConfig;
