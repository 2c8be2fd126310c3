//! Results handed to the request layer.

use crate::error::Result;
use crate::mux::{MuxTarget, Slot};
use crate::session::SensorMode;
use serde::Serialize;

/// Outcome for one slot of a capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCapture {
    pub slot: Slot,
    pub success: bool,
    /// Saved full-resolution image, absent for placeholders
    pub filename: Option<String>,
    /// Why the slot is a placeholder
    pub error: Option<String>,
}

impl SlotCapture {
    pub fn captured(slot: Slot, filename: String) -> Self {
        SlotCapture {
            slot,
            success: true,
            filename: Some(filename),
            error: None,
        }
    }

    pub fn failed(slot: Slot, reason: String) -> Self {
        SlotCapture {
            slot,
            success: false,
            filename: None,
            error: Some(reason),
        }
    }
}

/// Result of `capture_all_cameras`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureReport {
    /// At least one slot produced a real image
    pub success: bool,
    /// Timestamp shared by every file of the batch
    pub captured_at: String,
    /// One entry per slot, in slot order
    pub slots: Vec<SlotCapture>,
    pub grid_filename: String,
}

impl CaptureReport {
    pub fn new(captured_at: String, slots: Vec<SlotCapture>, grid_filename: String) -> Self {
        CaptureReport {
            success: slots.iter().any(|s| s.success),
            captured_at,
            slots,
            grid_filename,
        }
    }

    /// Saved per-slot filenames, in slot order
    pub fn filenames(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter_map(|s| s.filename.clone())
            .collect()
    }

    pub fn success_flags(&self) -> Vec<bool> {
        self.slots.iter().map(|s| s.success).collect()
    }

    pub fn succeeded(&self) -> usize {
        self.slots.iter().filter(|s| s.success).count()
    }
}

/// JSON body for a capture request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filenames: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<SlotCapture>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureResponse {
    /// Turns a capture outcome into a response; errors become a readable cause
    pub fn from_result(result: &Result<CaptureReport>) -> Self {
        match result {
            Ok(report) => CaptureResponse {
                success: report.success,
                filenames: Some(report.filenames()),
                grid_filename: Some(report.grid_filename.clone()),
                slots: Some(report.slots.clone()),
                error: None,
            },
            Err(e) => CaptureResponse {
                success: false,
                filenames: None,
                grid_filename: None,
                slots: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Snapshot returned by `get_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerStatus {
    /// Selected slot, `"all"`, or null before the first select
    pub current_slot: Option<MuxTarget>,
    pub is_cycling: bool,
    pub camera_count: u8,
    pub cycle_interval_ms: u64,
    /// Most recent grid composite
    pub latest_capture: Option<String>,
    pub active_mode: Option<SensorMode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CameraError;

    fn report() -> CaptureReport {
        CaptureReport::new(
            "20240101_000000_000".to_string(),
            vec![
                SlotCapture::captured(Slot(0), "a.jpg".to_string()),
                SlotCapture::failed(Slot(1), "Capture error: timeout".to_string()),
            ],
            "grid.jpg".to_string(),
        )
    }

    #[test]
    fn test_partial_success() {
        let report = report();
        assert!(report.success);
        assert_eq!(report.filenames(), vec!["a.jpg".to_string()]);
        assert_eq!(report.success_flags(), vec![true, false]);
    }

    #[test]
    fn test_no_success() {
        let report = CaptureReport::new(
            "x".to_string(),
            vec![SlotCapture::failed(Slot(3), "marked non-functional".to_string())],
            "grid.jpg".to_string(),
        );
        assert!(!report.success);
    }

    #[test]
    fn test_response_json() {
        let json = serde_json::to_value(CaptureResponse::from_result(&Ok(report()))).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["grid_filename"], "grid.jpg");
        assert_eq!(json["slots"][1]["slot"], 1);
        assert_eq!(json["slots"][1]["success"], false);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_response_json() {
        let result: Result<CaptureReport> = Err(CameraError::Composition("disk full".to_string()));
        let json = serde_json::to_value(CaptureResponse::from_result(&result)).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Composition error: disk full");
        assert!(json.get("filenames").is_none());
    }

    #[test]
    fn test_status_json() {
        let status = ManagerStatus {
            current_slot: Some(MuxTarget::All),
            is_cycling: false,
            camera_count: 4,
            cycle_interval_ms: 1000,
            latest_capture: None,
            active_mode: Some(SensorMode::Preview),
        };
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["current_slot"], "all");
        assert_eq!(json["active_mode"], "preview");
        assert!(json["latest_capture"].is_null());
    }
}
