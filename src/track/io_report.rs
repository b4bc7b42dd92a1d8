use crate::track::*;

/// Writes each report as a pretty JSON file in a directory.
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    out_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonReportSink {
    pub fn new(out_dir: &Path) -> JsonReportSink {
        JsonReportSink {
            out_dir: out_dir.to_path_buf(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ReportSink for JsonReportSink {
    fn deliver(&mut self, report: &Report) -> Result<(), ServiceError> {
        let storage = |e: &dyn std::fmt::Display| ServiceError::Storage(e.to_string());
        fs::create_dir_all(&self.out_dir).map_err(|e| storage(&e))?;
        let path = self.out_dir.join(&report.file_name);
        let contents = serde_json::to_string_pretty(report).map_err(|e| storage(&e))?;
        fs::write(&path, contents).map_err(|e| storage(&e))?;
        debug!("deliver: wrote {:?}", path);
        self.written.push(path);
        Ok(())
    }
}

/// Compares the summary of a report with the one of an earlier report.
///
/// Returns true when they agree. The differences are printed otherwise.
pub fn check_reference(report: &Report, reference_path: &str) -> TrackResult<bool> {
    let reference = read_summary(reference_path)?;
    let summary_ref = reference
        .get("summary")
        .cloned()
        .context(MissingSummarySnafu {
            path: reference_path.to_string(),
        })?;
    let summary = serde_json::to_value(&report.summary).context(SerializingJsonSnafu {
        path: report.file_name.clone(),
    })?;
    if summary_ref == summary {
        return Ok(true);
    }
    let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {
        path: reference_path.to_string(),
    })?;
    let pretty = serde_json::to_string_pretty(&summary).context(SerializingJsonSnafu {
        path: report.file_name.clone(),
    })?;
    warn!("Found differences with the reference report");
    print_diff(pretty_ref.as_str(), pretty.as_str(), "\n");
    Ok(false)
}
