//! Batch orchestration across many charts.
//!
//! Charts are independent, so a batch is a parallel map: jobs go onto the
//! work queue and a fixed pool of scoped worker threads drains it. A failure
//! in one chart is recorded in its report and never stops the batch.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::thread;
use std::time::Instant;

use super::queue::{create_work_queue, next_job, ChartJob};
use super::runner::{extract_series, extract_with_debug, Diagnostics};
use crate::analysis::{self, charts, JobCount, SeriesSummary};
use crate::calibration::{self, CalibrationAnchor, DataPoint, ValidationReport};
use crate::capture;
use crate::config::PipelineConfig;
use crate::debug;
use crate::paths::{technology_slug, OutputLayout};

const CHART_EXTENSIONS: [&str; 2] = ["webp", "png"];
const ANCHOR_EXTENSIONS: [&str; 2] = ["json", "csv"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStatus {
    /// A non-empty series was recovered and written
    Success,
    /// Nothing recoverable in the image
    Empty,
    /// Decode, configuration or output error
    Failed,
}

impl ChartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartStatus::Success => "success",
            ChartStatus::Empty => "empty",
            ChartStatus::Failed => "failed",
        }
    }
}

/// Outcome of one chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartReport {
    pub slug: String,
    pub source: PathBuf,
    pub status: ChartStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Series as read off the image
    pub raw: Vec<DataPoint>,
    /// Series after anchor correction
    pub calibrated: Option<Vec<DataPoint>>,
    pub anchors: Vec<CalibrationAnchor>,
    /// Raw series checked against the anchors
    pub validation: Option<ValidationReport>,
    pub summary: Option<SeriesSummary>,
    pub job_counts: Option<Vec<JobCount>>,
    pub diagnostics: Option<Diagnostics>,
    /// Time between queueing and a worker picking the job up
    pub queue_wait_ms: u64,
    pub elapsed_ms: u64,
}

impl ChartReport {
    fn new(job: &ChartJob) -> Self {
        Self {
            slug: job.slug.clone(),
            source: job.source.clone(),
            status: ChartStatus::Failed,
            error: None,
            warnings: Vec::new(),
            raw: Vec::new(),
            calibrated: None,
            anchors: Vec::new(),
            validation: None,
            summary: None,
            job_counts: None,
            diagnostics: None,
            queue_wait_ms: 0,
            elapsed_ms: 0,
        }
    }

    fn failed(mut self, error: impl std::fmt::Display) -> Self {
        self.status = ChartStatus::Failed;
        self.error = Some(error.to_string());
        self
    }

    /// The series handed downstream: calibrated when anchors were applied.
    pub fn final_series(&self) -> &[DataPoint] {
        self.calibrated.as_deref().unwrap_or(&self.raw)
    }
}

/// Written to `<out>/summary.json` after a batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchSummary {
    pub generated_at: String,
    pub total: usize,
    pub succeeded: usize,
    pub empty: usize,
    pub failed: usize,
    pub charts: Vec<ChartReport>,
}

impl BatchSummary {
    pub fn new(charts: Vec<ChartReport>) -> Self {
        let count = |status: ChartStatus| charts.iter().filter(|r| r.status == status).count();
        Self {
            generated_at: Local::now().to_rfc3339(),
            total: charts.len(),
            succeeded: count(ChartStatus::Success),
            empty: count(ChartStatus::Empty),
            failed: count(ChartStatus::Failed),
            charts,
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// `<anchors_dir>/<slug>.json` or `.csv`, whichever exists first.
pub fn find_anchor_file(anchors_dir: &Path, slug: &str) -> Option<PathBuf> {
    ANCHOR_EXTENSIONS
        .iter()
        .map(|ext| anchors_dir.join(format!("{slug}.{ext}")))
        .find(|p| p.is_file())
}

/// Expands files and directories into chart jobs, one per slug.
///
/// Directories contribute their `*.webp` and `*.png` files (not recursive).
/// When two files normalise to the same slug the first in path order wins.
pub fn discover_charts(inputs: &[PathBuf], anchors_dir: Option<&Path>) -> Result<Vec<ChartJob>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let entries = std::fs::read_dir(input)
                .with_context(|| format!("Failed to read directory {}", input.display()))?;
            let mut found: Vec<PathBuf> = entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && has_extension(p, &CHART_EXTENSIONS))
                .collect();
            found.sort();
            sources.extend(found);
        } else if input.is_file() {
            sources.push(input.clone());
        } else {
            return Err(anyhow!("Input not found: {}", input.display()));
        }
    }

    let mut by_slug: BTreeMap<String, ChartJob> = BTreeMap::new();
    for source in sources {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Unusable file name: {}", source.display()))?;
        let slug = technology_slug(stem)?;
        if slug.is_empty() {
            log::warn!("Skipping {}: empty technology name", source.display());
            continue;
        }
        if let Some(existing) = by_slug.get(&slug) {
            log::warn!(
                "Skipping {}: slug '{}' already taken by {}",
                source.display(),
                slug,
                existing.source.display()
            );
            continue;
        }
        let anchors = anchors_dir.and_then(|dir| find_anchor_file(dir, &slug));
        by_slug.insert(slug.clone(), ChartJob::new(slug, source, anchors));
    }

    Ok(by_slug.into_values().collect())
}

fn process_inner(job: &ChartJob, config: &PipelineConfig, layout: &OutputLayout) -> ChartReport {
    let mut report = ChartReport::new(job);

    let img = match capture::load_chart(&job.source) {
        Ok(img) => img,
        Err(e) => return report.failed(e),
    };

    if config.output.cache_png && !has_extension(&job.source, &["png"]) {
        capture::cache_png(&img, &layout.converted_path(&job.slug));
    }

    let extraction = if config.output.debug {
        match extract_with_debug(&img, config) {
            Ok((extraction, capture)) => {
                if let Err(e) = debug::save_debug_images(&layout.debug_dir(), &job.slug, &capture) {
                    log::warn!("{}: failed to save debug images: {:#}", job.slug, e);
                    report.warnings.push(format!("debug images: {e:#}"));
                }
                extraction
            }
            Err(e) => return report.failed(e),
        }
    } else {
        match extract_series(&img, config) {
            Ok(extraction) => extraction,
            Err(e) => return report.failed(e),
        }
    };

    report.diagnostics = Some(extraction.diagnostics);
    if extraction.points.is_empty() {
        log::info!("{}: no data recoverable", job.slug);
        report.status = ChartStatus::Empty;
        return report;
    }
    report.raw = extraction.points;

    if let Some(anchor_path) = &job.anchors {
        match calibration::load_anchors(anchor_path) {
            Ok(anchors) => report.anchors = anchors,
            Err(e) => {
                log::warn!("{}: ignoring anchors: {}", job.slug, e);
                report.warnings.push(e.to_string());
            }
        }
    }

    if !report.anchors.is_empty() {
        report.validation = Some(calibration::validate_series(
            &report.raw,
            &report.anchors,
            config.calibration.tolerance,
        ));
        report.calibrated = Some(calibration::calibrate(&report.raw, &report.anchors));
    }

    let series = report.final_series().to_vec();
    if let Err(e) = analysis::write_series(&series, &layout.data_path(&job.slug)) {
        return report.failed(format!("{e:#}"));
    }

    if config.output.render_charts {
        let result = charts::render_series_chart(
            &job.slug,
            &report.raw,
            report.calibrated.as_deref(),
            &report.anchors,
            &config.axis,
            &config.output.chart,
            &layout.chart_path(&job.slug),
        );
        if let Err(e) = result {
            log::warn!("{}: chart rendering failed: {:#}", job.slug, e);
            report.warnings.push(format!("chart: {e:#}"));
        }
    }

    report.summary = SeriesSummary::from_series(&series);
    report.job_counts = config
        .output
        .market_size
        .map(|size| analysis::job_counts(&series, size));
    report.status = ChartStatus::Success;
    report
}

/// Runs one chart end to end and writes its outputs.
///
/// Never fails: errors and panics become a `Failed` report.
pub fn process_chart(job: &ChartJob, config: &PipelineConfig, layout: &OutputLayout) -> ChartReport {
    let started = Instant::now();
    let queue_wait_ms = Local::now()
        .signed_duration_since(job.queued_at)
        .num_milliseconds()
        .max(0) as u64;
    log::info!(
        "Processing {} ({}, queued {} ms)",
        job.slug,
        job.source.display(),
        queue_wait_ms
    );

    let mut report = match panic::catch_unwind(AssertUnwindSafe(|| process_inner(job, config, layout))) {
        Ok(report) => report,
        Err(_) => ChartReport::new(job).failed("panicked during extraction"),
    };
    report.queue_wait_ms = queue_wait_ms;
    report.elapsed_ms = started.elapsed().as_millis() as u64;

    match report.status {
        ChartStatus::Success => log::info!(
            "{}: {} yearly points in {} ms",
            report.slug,
            report.final_series().len(),
            report.elapsed_ms
        ),
        ChartStatus::Empty => log::info!("{}: empty", report.slug),
        ChartStatus::Failed => log::warn!(
            "{}: failed: {}",
            report.slug,
            report.error.as_deref().unwrap_or("unknown error")
        ),
    }
    report
}

fn worker_count(config: &PipelineConfig, jobs: usize) -> usize {
    let wanted = if config.workers == 0 {
        thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    } else {
        config.workers
    };
    wanted.clamp(1, jobs.max(1))
}

/// Processes all jobs on a worker pool. Reports come back sorted by slug.
pub fn run_batch(jobs: Vec<ChartJob>, config: &PipelineConfig, layout: &OutputLayout) -> Vec<ChartReport> {
    let workers = worker_count(config, jobs.len());
    log::info!("Processing {} charts on {} workers", jobs.len(), workers);

    let (job_sender, job_receiver) = create_work_queue();
    for job in jobs {
        if job_sender.send(job).is_err() {
            break;
        }
    }
    drop(job_sender);

    let (report_sender, report_receiver) = channel();
    thread::scope(|scope| {
        for id in 0..workers {
            let receiver = job_receiver.clone();
            let sender = report_sender.clone();
            scope.spawn(move || {
                log::debug!("Worker {} started", id);
                while let Some(job) = next_job(&receiver) {
                    if sender.send(process_chart(&job, config, layout)).is_err() {
                        break;
                    }
                }
                log::debug!("Worker {} finished", id);
            });
        }
    });
    drop(report_sender);

    let mut reports: Vec<ChartReport> = report_receiver.into_iter().collect();
    reports.sort_by(|a, b| a.slug.cmp(&b.slug));
    reports
}

/// Writes `<out>/summary.json` and returns the summary it wrote.
pub fn write_summary(reports: Vec<ChartReport>, layout: &OutputLayout) -> Result<BatchSummary> {
    let summary = BatchSummary::new(reports);
    let path = layout.summary_path();
    analysis::export_to_json(&summary, &path)?;
    log::info!(
        "Summary saved: {} ({} ok, {} empty, {} failed)",
        path.display(),
        summary.succeeded,
        summary.empty,
        summary.failed
    );
    Ok(summary)
}
