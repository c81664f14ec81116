//! Shift report and the observer that writes it.

use std::fmt::Write as _;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::ShiftObserver;
use crate::domain::{KindCounts, ShiftMetrics, TrainKind};

/// Output format for shift reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Summary of one shift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftReport {
    pub shift_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,

    /// Wagons queued when the shift started
    pub initial_wagons: usize,

    pub metrics: ShiftMetrics,

    /// Wagons no sent train picked up, per kind
    pub missed: KindCounts,
}

impl ShiftReport {
    pub fn new(
        shift_id: Uuid,
        started_at: DateTime<Utc>,
        initial_wagons: usize,
        metrics: ShiftMetrics,
    ) -> Self {
        let missed = metrics.missed_by_kind();
        Self {
            shift_id,
            started_at,
            ended_at: Utc::now(),
            initial_wagons,
            metrics,
            missed,
        }
    }

    /// Human-readable table
    pub fn render_text(&self) -> String {
        let m = &self.metrics;
        let mut out = String::new();
        let rows: [(&str, usize); 8] = [
            ("Paths prepared", m.prepared_paths),
            ("Trains planned", m.planned_trains),
            ("Locomotives arrived", m.arrived_locos),
            ("Wagons processed", m.processed_wagons),
            ("Trains sent", m.sent_trains),
            ("Wagons departed", m.departed_wagons),
            ("Wagons left (queue + holding)", m.wagons_left()),
            ("Holding track peak", m.holding_peak),
        ];

        let _ = writeln!(out, "===== SHIFT REPORT {} =====", self.shift_id);
        let _ = writeln!(out, "{:<32} {}", "Paths in yard", m.paths);
        for (label, value) in rows {
            let _ = writeln!(out, "{:<32} {}", label, value);
        }
        for kind in TrainKind::ALL {
            let label = format!("Missed wagons ({})", kind);
            let _ = writeln!(out, "{:<32} {}", label, self.missed[kind]);
        }
        let _ = writeln!(out, "{}", "=".repeat(40));
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Passive observer that writes a report when the shift ends
pub struct ShiftReporter<W: Write> {
    out: W,
    format: ReportFormat,
    shift_id: Uuid,
    started_at: DateTime<Utc>,
    initial_wagons: usize,
    last_report: Option<ShiftReport>,
}

impl<W: Write> ShiftReporter<W> {
    pub fn new(out: W, format: ReportFormat) -> Self {
        Self {
            out,
            format,
            shift_id: Uuid::nil(),
            started_at: Utc::now(),
            initial_wagons: 0,
            last_report: None,
        }
    }

    /// Report written at the most recent shift end
    pub fn last_report(&self) -> Option<&ShiftReport> {
        self.last_report.as_ref()
    }

    fn write_report(&mut self, report: &ShiftReport) -> anyhow::Result<()> {
        let rendered = match self.format {
            ReportFormat::Text => report.render_text(),
            ReportFormat::Json => report.render_json()? + "\n",
        };
        self.out.write_all(rendered.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> ShiftObserver for ShiftReporter<W> {
    fn name(&self) -> &str {
        "shift-reporter"
    }

    fn shift_started(&mut self, metrics: &ShiftMetrics) {
        self.shift_id = Uuid::new_v4();
        self.started_at = Utc::now();
        self.initial_wagons = metrics.pending_total();
        info!(
            shift_id = %self.shift_id,
            wagons = self.initial_wagons,
            "Shift report opened"
        );
    }

    fn shift_ended(&mut self, metrics: &ShiftMetrics) {
        let report = ShiftReport::new(
            self.shift_id,
            self.started_at,
            self.initial_wagons,
            metrics.clone(),
        );
        if let Err(e) = self.write_report(&report) {
            warn!(error = %e, "Failed to write shift report");
        }
        self.last_report = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> ShiftMetrics {
        ShiftMetrics {
            paths: 3,
            prepared_paths: 4,
            planned_trains: 4,
            arrived_locos: 5,
            processed_wagons: 40,
            sent_trains: 3,
            departed_wagons: 36,
            holding_total: 4,
            holding_peak: 9,
            holding_by_kind: KindCounts {
                dangerous: 4,
                ..Default::default()
            },
            pending_by_kind: KindCounts {
                freight: 2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_text_report_lists_missed_by_kind() {
        let report = ShiftReport::new(Uuid::new_v4(), Utc::now(), 42, sample_metrics());
        let text = report.render_text();

        assert!(text.contains("Trains sent"));
        assert!(text.contains("Missed wagons (dangerous)        4"));
        assert!(text.contains("Missed wagons (freight)          2"));
        assert!(text.contains("Wagons left (queue + holding)    6"));
    }

    #[test]
    fn test_json_report_roundtrip() {
        let report = ShiftReport::new(Uuid::new_v4(), Utc::now(), 42, sample_metrics());
        let json = report.render_json().unwrap();
        let parsed: ShiftReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.metrics, report.metrics);
        assert_eq!(parsed.missed.dangerous, 4);
    }

    #[test]
    fn test_reporter_writes_at_shift_end() {
        let mut reporter = ShiftReporter::new(Vec::new(), ReportFormat::Text);
        let mut metrics = sample_metrics();
        reporter.shift_started(&metrics);
        assert!(reporter.last_report().is_none());

        metrics.sent_trains = 4;
        reporter.shift_ended(&metrics);

        let report = reporter.last_report().unwrap();
        assert_eq!(report.initial_wagons, 2);
        assert_eq!(report.metrics.sent_trains, 4);
        assert!(String::from_utf8_lossy(&reporter.out).contains("SHIFT REPORT"));
    }
}
