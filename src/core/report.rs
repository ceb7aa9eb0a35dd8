use crate::domain::model::{Engine, MatchMode, OutputFormat, SizeMeasurement, SweepReport};
use crate::utils::error::{Result, SweepError};
use serde::Serialize;

pub fn render(reports: &[SweepReport], format: OutputFormat, quiet_matches: bool) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Text => Ok(render_text(reports, quiet_matches).into_bytes()),
        OutputFormat::Csv => render_csv(reports),
        OutputFormat::Json => render_json(reports),
    }
}

pub fn text_header(name: &str, workload: &str, engine: Engine, mode: MatchMode, pattern: &str) -> String {
    format!("# {}: {} on {} ({}) pattern={}\n", name, workload, engine, mode, pattern)
}

/// One line per repetition with its match result, then the mean in seconds.
pub fn text_size(measurement: &SizeMeasurement, quiet_matches: bool) -> String {
    let mut out = String::new();
    if !quiet_matches {
        for sample in &measurement.samples {
            out.push_str(&sample.outcome.to_string());
            out.push('\n');
        }
    }
    out.push_str(&format!(
        "n={} Time: {:.9}\n",
        measurement.n,
        measurement.mean_seconds()
    ));
    out
}

pub fn text_footer(report: &SweepReport) -> String {
    if report.stopped_early {
        let last = report.measurements.last().map(|m| m.n).unwrap_or(0);
        format!("# stopped early at n={} (time budget exceeded)\n", last)
    } else {
        String::new()
    }
}

pub fn render_text(reports: &[SweepReport], quiet_matches: bool) -> String {
    let mut out = String::new();
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&text_header(
            &report.name,
            &report.workload,
            report.engine,
            report.mode,
            &report.pattern_template,
        ));
        for measurement in &report.measurements {
            out.push_str(&text_size(measurement, quiet_matches));
        }
        out.push_str(&text_footer(report));
    }
    out
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    experiment: &'a str,
    engine: Engine,
    workload: &'a str,
    n: usize,
    repetitions: usize,
    mean_ns: u64,
    min_ns: u64,
    max_ns: u64,
    outcome: String,
}

pub fn render_csv(reports: &[SweepReport]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for report in reports {
        for m in &report.measurements {
            writer.serialize(CsvRow {
                experiment: &report.name,
                engine: report.engine,
                workload: &report.workload,
                n: m.n,
                repetitions: m.samples.len(),
                mean_ns: m.mean_ns,
                min_ns: m.min_ns,
                max_ns: m.max_ns,
                outcome: m.outcome().map(|o| o.to_string()).unwrap_or_default(),
            })?;
        }
    }

    writer.into_inner().map_err(|e| SweepError::ReportError {
        message: format!("CSV flush failed: {}", e),
    })
}

pub fn render_json(reports: &[SweepReport]) -> Result<Vec<u8>> {
    let mut data = serde_json::to_vec_pretty(reports)?;
    data.push(b'\n');
    Ok(data)
}
