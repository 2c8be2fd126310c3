//! Frame annotations.

use super::composition_error;
use crate::error::Result;
use opencv::core::{CV_8UC3, Mat, Point, Rect, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

const CROSSHAIR_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const LABEL_FONT: i32 = imgproc::FONT_HERSHEY_SIMPLEX;

fn bgr(color: (f64, f64, f64)) -> Scalar {
    Scalar::new(color.0, color.1, color.2, 0.0)
}

/// Draws a 1-px green cross through the centre, each arm `min(w, h) / 20` long.
pub fn draw_crosshair(mat: &mut Mat) -> Result<()> {
    let cx = mat.cols() / 2;
    let cy = mat.rows() / 2;
    let arm = mat.cols().min(mat.rows()) / 20;
    let color = bgr(CROSSHAIR_COLOR);

    imgproc::line(
        mat,
        Point::new(cx - arm, cy),
        Point::new(cx + arm, cy),
        color,
        1,
        imgproc::LINE_8,
        0,
    )
    .map_err(composition_error("crosshair"))?;
    imgproc::line(
        mat,
        Point::new(cx, cy - arm),
        Point::new(cx, cy + arm),
        color,
        1,
        imgproc::LINE_8,
        0,
    )
    .map_err(composition_error("crosshair"))
}

/// Writes white text on a dark box in the top-left corner.
pub fn draw_label(mat: &mut Mat, text: &str) -> Result<()> {
    let scale = (f64::from(mat.rows()) / 720.0).max(0.5);
    let thickness = if scale >= 1.0 { 2 } else { 1 };
    let mut baseline = 0;
    let size = imgproc::get_text_size(text, LABEL_FONT, scale, thickness, &mut baseline)
        .map_err(composition_error("label size"))?;

    let pad = 6;
    let backing = Rect::new(
        4,
        4,
        (size.width + 2 * pad).min(mat.cols() - 4).max(0),
        (size.height + baseline + 2 * pad).min(mat.rows() - 4).max(0),
    );
    imgproc::rectangle(
        mat,
        backing,
        Scalar::new(20.0, 20.0, 20.0, 0.0),
        -1,
        imgproc::LINE_8,
        0,
    )
    .map_err(composition_error("label backing"))?;

    imgproc::put_text(
        mat,
        text,
        Point::new(4 + pad, 4 + pad + size.height),
        LABEL_FONT,
        scale,
        Scalar::all(255.0),
        thickness,
        imgproc::LINE_AA,
        false,
    )
    .map_err(composition_error("label text"))
}

/// Builds the tile shown for a slot with no usable frame.
///
/// Dark grey with a red border and diagonal cross, captioned
/// "DISCONNECTED" and the camera name.
pub fn placeholder_tile(width: i32, height: i32, slot_label: &str) -> Result<Mat> {
    let mut tile =
        Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::new(40.0, 40.0, 40.0, 0.0))
            .map_err(composition_error("placeholder"))?;

    let red = Scalar::new(0.0, 0.0, 255.0, 0.0);
    let border = (width.min(height) / 100).max(2);

    imgproc::rectangle(
        &mut tile,
        Rect::new(0, 0, width, height),
        red,
        border,
        imgproc::LINE_8,
        0,
    )
    .map_err(composition_error("placeholder border"))?;

    for (from, to) in [
        (Point::new(0, 0), Point::new(width - 1, height - 1)),
        (Point::new(width - 1, 0), Point::new(0, height - 1)),
    ] {
        imgproc::line(&mut tile, from, to, red, border, imgproc::LINE_AA, 0)
            .map_err(composition_error("placeholder cross"))?;
    }

    let scale = (f64::from(height) / 400.0).max(0.4);
    let thickness = (border / 2).max(1);
    put_centered(&mut tile, "DISCONNECTED", height / 2 - height / 12, scale, thickness)?;
    put_centered(&mut tile, slot_label, height / 2 + height / 8, scale * 0.8, thickness)?;

    Ok(tile)
}

fn put_centered(mat: &mut Mat, text: &str, baseline_y: i32, scale: f64, thickness: i32) -> Result<()> {
    let mut baseline = 0;
    let size = imgproc::get_text_size(text, LABEL_FONT, scale, thickness, &mut baseline)
        .map_err(composition_error("caption size"))?;
    let x = ((mat.cols() - size.width) / 2).max(0);

    imgproc::put_text(
        mat,
        text,
        Point::new(x, baseline_y),
        LABEL_FONT,
        scale,
        Scalar::all(255.0),
        thickness,
        imgproc::LINE_AA,
        false,
    )
    .map_err(composition_error("caption"))
}
