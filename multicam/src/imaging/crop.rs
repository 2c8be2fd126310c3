use super::composition_error;
use crate::error::{CameraError, Result};
use opencv::core::{Mat, Rect, Size};
use opencv::imgproc;
use opencv::prelude::*;

/// Cuts a `width` x `height` region anchored at the frame centre.
///
/// A frame smaller than the target in either dimension is resized to the
/// target instead, so every grid cell comes out the same size.
pub fn center_crop(frame: &Mat, width: i32, height: i32) -> Result<Mat> {
    if width <= 0 || height <= 0 {
        return Err(CameraError::Composition(format!(
            "Invalid crop size {}x{}",
            width, height
        )));
    }

    let cols = frame.cols();
    let rows = frame.rows();

    if cols < width || rows < height {
        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(width, height),
            0.0,
            0.0,
            imgproc::INTER_AREA,
        )
        .map_err(composition_error("resize to cell"))?;
        return Ok(resized);
    }

    let x = (cols - width) / 2;
    let y = (rows - height) / 2;

    Mat::roi(frame, Rect::new(x, y, width, height))
        .and_then(|roi| roi.try_clone())
        .map_err(composition_error("center crop"))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{pixel, solid};
    use super::*;
    use opencv::core::Scalar;

    #[test]
    fn test_crop_is_centered() {
        let mut frame = solid(100, 200, 0.0, 0.0, 0.0);
        // mark the exact centre region white
        imgproc::rectangle(
            &mut frame,
            Rect::new(90, 40, 20, 20),
            Scalar::all(255.0),
            -1,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let cropped = center_crop(&frame, 20, 20).unwrap();
        assert_eq!((cropped.cols(), cropped.rows()), (20, 20));
        assert_eq!(pixel(&cropped, 0, 0), (255, 255, 255));
        assert_eq!(pixel(&cropped, 19, 19), (255, 255, 255));
    }

    #[test]
    fn test_smaller_source_is_resized() {
        let frame = solid(30, 40, 1.0, 2.0, 3.0);
        let cropped = center_crop(&frame, 80, 60).unwrap();
        assert_eq!((cropped.cols(), cropped.rows()), (80, 60));
    }

    #[test]
    fn test_zero_size_rejected() {
        let frame = solid(30, 40, 0.0, 0.0, 0.0);
        assert!(matches!(
            center_crop(&frame, 0, 10),
            Err(CameraError::Composition(_))
        ));
    }
}
