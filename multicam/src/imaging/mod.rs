//! Image operations on BGR frames: cropping, annotation, grid assembly,
//! JPEG encoding and white balance.

pub mod codec;
pub mod crop;
pub mod grid;
pub mod overlay;
pub mod white_balance;

pub use codec::{encode_jpeg, read_image};
pub use crop::center_crop;
pub use grid::{GRID_CELLS, compose_grid};
pub use overlay::{draw_crosshair, draw_label, placeholder_tile};

use crate::error::CameraError;

/// Maps an OpenCV failure during image assembly onto `Composition`.
pub(crate) fn composition_error(context: &str) -> impl FnOnce(opencv::Error) -> CameraError + '_ {
    move |e| CameraError::Composition(format!("{}: {}", context, e))
}
