//! Values passed between pipeline stages

use qrlink_common::{Stage, StageError};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Placeholder URL used when input is unavailable
pub const DEFAULT_URL: &str = "https://devfolios.online";

/// Placeholder mobile number used when input is unavailable
pub const DEFAULT_MOBILE_NUMBER: &str = "0000000000";

/// Constant stored in the `generated_qr_code` column
pub const QR_CODE_LABEL: &str = "QRCOdeDmo";

/// Stored in `short_description` when no summary was obtained
///
/// Literal text, not SQL NULL.
pub const ABSENT_DESCRIPTION: &str = "null";

/// User input captured at the start of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInput {
    pub url: String,
    pub mobile_number: String,
}

impl Default for RunInput {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            mobile_number: DEFAULT_MOBILE_NUMBER.to_string(),
        }
    }
}

/// Outcome of the QR encoding stage
#[derive(Debug, Clone)]
pub struct EncodedArtifact {
    pub source_text: String,
    pub width: u32,
    pub height: u32,
    pub output_path: PathBuf,
    pub success: bool,
}

impl EncodedArtifact {
    /// Artifact record for an encoding attempt that produced no file
    pub fn failed(source_text: &str, width: u32, height: u32, output_path: &Path) -> Self {
        Self {
            source_text: source_text.to_string(),
            width,
            height,
            output_path: output_path.to_path_buf(),
            success: false,
        }
    }
}

/// Outcome of the summary request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResult {
    /// Raw response body; `None` on any failure
    pub body: Option<String>,
    /// Text extracted from the response for storage
    pub summary: Option<String>,
}

impl ApiResult {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.body.is_none()
    }
}

/// Row written to `qrcode_generator`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRecord {
    pub link: String,
    pub recipient_mobile_number: String,
    pub generated_qr_code: String,
    pub short_description: Option<String>,
}

impl QrRecord {
    /// Build the record for a run, carrying an absent summary forward
    pub fn from_run(input: &RunInput, api: &ApiResult) -> Self {
        Self {
            link: input.url.clone(),
            recipient_mobile_number: input.mobile_number.clone(),
            generated_qr_code: QR_CODE_LABEL.to_string(),
            short_description: api.summary.clone(),
        }
    }

    /// Value bound to the `short_description` column
    pub fn description_value(&self) -> &str {
        self.short_description
            .as_deref()
            .unwrap_or(ABSENT_DESCRIPTION)
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub input: RunInput,
    pub artifact: EncodedArtifact,
    pub api: ApiResult,
    pub record: QrRecord,
    pub persisted: bool,
    /// Stages that degraded, in the order they failed
    pub failures: Vec<(Stage, StageError)>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, stage: Stage) -> bool {
        self.failures.iter().any(|(s, _)| *s == stage)
    }
}
