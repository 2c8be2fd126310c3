use crate::error::{CameraError, Result};
use std::path::Path;

/// Sets the Unix mode of `path` and reads it back.
#[cfg(unix)]
pub fn set_and_verify(path: &Path, mode: u32) -> Result<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;

    let actual = fs::metadata(path)?.permissions().mode() & 0o777;
    if actual != mode & 0o777 {
        return Err(CameraError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!(
                "{} has mode {:o}, expected {:o}",
                path.display(),
                actual,
                mode & 0o777
            ),
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn set_and_verify(path: &Path, _mode: u32) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CameraError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            path.display().to_string(),
        )))
    }
}
