use super::composition_error;
use crate::error::{CameraError, Result};
use opencv::core::{Mat, Vector};
use opencv::imgcodecs;
use opencv::prelude::*;
use std::path::Path;

/// Encodes a BGR matrix as JPEG.
///
/// # Arguments
/// * `mat` - 8-bit BGR image
/// * `quality` - JPEG quality, clamped to 1..=100
pub fn encode_jpeg(mat: &Mat, quality: i32) -> Result<Vec<u8>> {
    let mut buffer = Vector::<u8>::new();
    let params = Vector::<i32>::from_slice(&[imgcodecs::IMWRITE_JPEG_QUALITY, quality.clamp(1, 100)]);

    let encoded = imgcodecs::imencode(".jpg", mat, &mut buffer, &params)
        .map_err(composition_error("JPEG encode"))?;
    if !encoded || buffer.is_empty() {
        return Err(CameraError::Composition("JPEG encoder produced no data".to_string()));
    }

    Ok(buffer.to_vec())
}

/// Reads an image file as 8-bit BGR.
pub fn read_image(path: &Path) -> Result<Mat> {
    let path_str = path
        .to_str()
        .ok_or_else(|| CameraError::Capture(format!("Non UTF-8 path: {}", path.display())))?;
    let mat = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR)?;

    if mat.empty() {
        return Err(CameraError::Capture(format!(
            "Could not decode image {}",
            path.display()
        )));
    }
    Ok(mat)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::solid;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_encode_jpeg_magic() {
        let mat = solid(48, 64, 10.0, 120.0, 240.0);
        let jpeg = encode_jpeg(&mat, 90).unwrap();

        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_empty_fails() {
        let result = encode_jpeg(&Mat::default(), 90);
        assert!(matches!(result, Err(CameraError::Composition(_))));
    }

    #[test]
    fn test_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        std::fs::write(&path, encode_jpeg(&solid(30, 40, 0.0, 0.0, 0.0), 95).unwrap()).unwrap();

        let mat = read_image(&path).unwrap();
        assert_eq!((mat.cols(), mat.rows()), (40, 30));
    }

    #[test]
    fn test_read_missing() {
        let dir = tempdir().unwrap();
        assert!(read_image(&dir.path().join("none.jpg")).is_err());
    }
}
