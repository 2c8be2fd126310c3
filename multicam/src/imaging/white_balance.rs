//! Grey-world white balance.
//!
//! `grey_world_gains` computes the red and blue gains that equalise the
//! channel means of a reference shot; `apply_gains` applies them.

use crate::config::ColourGains;
use crate::error::{CameraError, Result};
use opencv::core::{self, Mat, Vector};
use opencv::prelude::*;

const BLUE: usize = 0;
const GREEN: usize = 1;
const RED: usize = 2;

/// Estimates gains assuming the scene averages to grey.
///
/// A channel whose mean is zero gets a gain of 1.0.
pub fn grey_world_gains(mat: &Mat) -> Result<ColourGains> {
    if mat.channels() != 3 {
        return Err(CameraError::Capture(format!(
            "White balance needs a 3-channel image, got {}",
            mat.channels()
        )));
    }

    let means = core::mean_def(mat)?;
    let green = means[GREEN];
    let ratio = |channel: f64| if channel > 0.0 { green / channel } else { 1.0 };

    Ok(ColourGains {
        red: ratio(means[RED]),
        blue: ratio(means[BLUE]),
    })
}

/// Scales the red and blue channels, saturating at 255.
pub fn apply_gains(mat: &Mat, gains: ColourGains) -> Result<Mat> {
    if gains.is_unity() {
        return Ok(mat.try_clone()?);
    }

    let mut channels = Vector::<Mat>::new();
    core::split(mat, &mut channels)?;

    for (index, gain) in [(BLUE, gains.blue), (RED, gains.red)] {
        let source = channels.get(index)?;
        let mut scaled = Mat::default();
        source.convert_to(&mut scaled, -1, gain, 0.0)?;
        channels.set(index, scaled)?;
    }

    let mut balanced = Mat::default();
    core::merge(&channels, &mut balanced)?;
    Ok(balanced)
}
