use std::fs;
use std::path::Path;

use tracing::info;

use powerlaw_core::{FitReport, PowerLawError};

/// Write the fit report as pretty-printed JSON.
///
/// The report is staged in a sibling temp file and renamed into place, so a
/// reader never observes a half-written document. Parent directories are
/// created on demand.
pub fn write_report(path: &Path, report: &FitReport) -> Result<(), PowerLawError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                PowerLawError::store(format!("create {}: {}", parent.display(), e))
            })?;
        }
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| PowerLawError::store(format!("serialize report: {}", e)))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| PowerLawError::store(format!("write {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .map_err(|e| PowerLawError::store(format!("rename {}: {}", path.display(), e)))?;

    info!(path = %path.display(), points = report.data.len(), "report written");
    Ok(())
}
