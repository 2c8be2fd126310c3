use serde::{Deserialize, Serialize};

/// Grid composite layout and encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Width of one grid cell after center cropping
    pub cell_width: u32,
    /// Height of one grid cell after center cropping
    pub cell_height: u32,
    /// JPEG quality for saved captures and preview frames (1-100)
    pub jpeg_quality: i32,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        CompositionConfig {
            cell_width: 1775,
            cell_height: 1160,
            jpeg_quality: 90,
        }
    }
}

/// Captures directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub captures_dir: String,
    /// Unix mode of the captures directory
    pub dir_mode: u32,
    /// Unix mode of every saved image
    pub file_mode: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            captures_dir: "captures".to_string(),
            dir_mode: 0o755,
            file_mode: 0o644,
        }
    }
}
