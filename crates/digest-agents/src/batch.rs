//! Batch validation of JSON content records.
//!
//! Each file is read, validated and serialized on the blocking pool; a
//! semaphore caps how many run at once. All workers share one pipeline, so
//! breaker counts and the kill switch are seen by every in-flight record.

use anyhow::{Context, Result};
use gatekeeper::record::ContentRecord;
use gatekeeper::{ValidationPipeline, ValidationReport};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Key the report is stored under in written records.
pub const REPORT_KEY: &str = "_agent_validation";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Concurrent records, at least 1.
    pub workers: usize,
    /// When this file exists at pickup time, the kill switch is thrown.
    pub kill_switch: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            kill_switch: None,
        }
    }
}

/// One processed input file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Record to publish. In shadow mode this is the input plus the report.
    pub output: Value,
    pub report: ValidationReport,
}

/// Validate every file, preserving input order in the result.
///
/// A file that cannot be read or parsed yields an `Err` entry; the rest of
/// the batch still runs.
pub async fn validate_files(
    pipeline: Arc<ValidationPipeline>,
    files: Vec<PathBuf>,
    options: &BatchOptions,
) -> Vec<Result<FileOutcome>> {
    let permits = Arc::new(Semaphore::new(options.workers.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let pipeline = Arc::clone(&pipeline);
        let permits = Arc::clone(&permits);
        let kill_switch = options.kill_switch.clone();
        handles.push(tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .context("worker pool closed")?;
            tokio::task::spawn_blocking(move || {
                if let Some(flag) = kill_switch.as_deref() {
                    check_kill_switch(&pipeline, flag);
                }
                validate_file(&pipeline, path)
            })
            .await
            .context("validation worker panicked")?
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(anyhow::Error::new(e).context("validation task failed")),
        };
        outcomes.push(outcome);
    }
    outcomes
}

/// Throw the pipeline's kill switch if the flag file is present.
pub fn check_kill_switch(pipeline: &ValidationPipeline, flag: &Path) {
    if flag.exists() && pipeline.is_enabled() {
        warn!(flag = %flag.display(), "Kill switch file present");
        pipeline.emergency_control().force_disable();
    }
}

/// Read, validate and render one record file.
pub fn validate_file(pipeline: &ValidationPipeline, path: PathBuf) -> Result<FileOutcome> {
    let content =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let input: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    let record = ContentRecord::from_json(input.clone())
        .with_context(|| format!("{} is not a content record", path.display()))?;

    let validated = pipeline.validate(record);
    let (output, report) = render(input, validated, pipeline.shadow_mode())?;
    info!(
        file = %path.display(),
        status = %report.status,
        confidence = report.overall_confidence,
        "Validated record"
    );
    Ok(FileOutcome {
        path,
        output,
        report,
    })
}

/// Record to write out. Shadow mode keeps the input as given and only adds
/// the report.
pub fn render(
    input: Value,
    validated: ContentRecord,
    shadow_mode: bool,
) -> Result<(Value, ValidationReport)> {
    let report = validated
        .validation
        .clone()
        .context("pipeline returned a record without a report")?;

    let output = if shadow_mode {
        let mut original = match input {
            Value::Object(map) => map,
            other => anyhow::bail!("expected a JSON object, found {other}"),
        };
        original.insert(REPORT_KEY.to_string(), serde_json::to_value(&report)?);
        Value::Object(original)
    } else {
        serde_json::to_value(&validated)?
    };
    Ok((output, report))
}

/// Write the output next to its input name under `out_dir`.
pub fn write_outcome(outcome: &FileOutcome, out_dir: &Path) -> Result<PathBuf> {
    let name = outcome
        .path
        .file_name()
        .with_context(|| format!("{} has no file name", outcome.path.display()))?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let target = out_dir.join(name);
    let body = serde_json::to_string_pretty(&outcome.output)?;
    std::fs::write(&target, body).with_context(|| format!("writing {}", target.display()))?;
    Ok(target)
}
