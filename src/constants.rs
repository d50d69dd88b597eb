//! Application constants for the exoplanet intake pipeline
//!
//! This module contains the required field catalog, accepted file types,
//! data categories and the default values used by the configuration layer.

// =============================================================================
// Required Field Catalog
// =============================================================================

/// Required CSV columns and their human-readable descriptions, in catalog order
pub const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("pl_orbper", "Planet orbital period (days)"),
    ("pl_trandep", "Transit depth (%)"),
    ("pl_trandur", "Transit duration (hours)"),
    ("pl_rade", "Planet radius (Earth radii)"),
    ("pl_imppar", "Impact parameter (0-1)"),
    ("pl_ratror", "Planet/star radius ratio"),
    ("pl_ratdor", "Semi-major axis/stellar radius ratio"),
    ("st_rad", "Stellar radius (Solar radii)"),
    ("st_teff", "Stellar effective temperature (K)"),
];

// =============================================================================
// File Admission
// =============================================================================

/// Declared content type accepted for admission
pub const CSV_MIME_TYPE: &str = "text/csv";

/// File name extension accepted for admission (compared case-insensitively)
pub const CSV_EXTENSION: &str = "csv";

/// Field delimiter for dataset files
pub const FIELD_DELIMITER: char = ',';

// =============================================================================
// Data Categories
// =============================================================================

/// Categories a submission can be filed under, with display labels
pub const CATEGORIES: &[(&str, &str)] = &[
    ("exoplanet", "Exoplanet data"),
    ("research", "Research"),
    ("analysis", "Analysis"),
    ("discovery", "Discoveries"),
    ("observation", "Observations"),
];

/// Category values accepted on the command line
pub const CATEGORY_VALUES: &[&str] = &[
    "exoplanet",
    "research",
    "analysis",
    "discovery",
    "observation",
];

/// Look up the display label for a category value
pub fn category_label(value: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|(key, _)| *key == value)
        .map(|(_, label)| *label)
}

// =============================================================================
// Defaults
// =============================================================================

/// Default category for submissions
pub const DEFAULT_CATEGORY: &str = "exoplanet";

/// Storage backend endpoint accepting planet batches
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/planetas/agregarPlanetas";

/// Key the submission payload is wrapped under
pub const DEFAULT_PAYLOAD_KEY: &str = "planetas";

/// Interval between transfer progress ticks
pub const DEFAULT_TRANSFER_TICK_MS: u64 = 200;

/// Bounds of a single random transfer progress step (percentage points)
pub const DEFAULT_MIN_PROGRESS_STEP: f64 = 1.0;
pub const DEFAULT_MAX_PROGRESS_STEP: f64 = 20.0;

/// Progress value at which a transfer is complete
pub const TRANSFER_COMPLETE: f64 = 100.0;

/// HTTP request timeout for submissions
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Buffered notifications per subscriber before the oldest are dropped
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// Message used when the backend reports failure without one
pub const GENERIC_SUBMISSION_FAILURE: &str = "The storage backend returned an error.";

/// Directory name used under the platform config directory
pub const CONFIG_DIR_NAME: &str = "exo-intake";

/// Config file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_values_match_labels() {
        let keys: Vec<&str> = CATEGORIES.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, CATEGORY_VALUES);
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label("research"), Some("Research"));
        assert_eq!(category_label("unknown"), None);
    }

    #[test]
    fn test_progress_step_bounds() {
        assert!(DEFAULT_MIN_PROGRESS_STEP > 0.0);
        assert!(DEFAULT_MIN_PROGRESS_STEP <= DEFAULT_MAX_PROGRESS_STEP);
    }
}
