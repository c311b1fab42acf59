//! Prometheus counters for inventory submissions.

use inventory_models::EntrySource;
use inventory_utils::inventory::SubmissionReport;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    findings: IntCounterVec,
    rejected: IntCounterVec,
}

pub fn source_label(source: EntrySource) -> &'static str {
    match source {
        EntrySource::Interactive => "interactive",
        EntrySource::Csv => "csv",
    }
}

impl Metrics {
    pub fn new(namespace: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("submissions_total", "Inventory submissions validated").namespace(namespace),
            &["source"],
        )?;
        let findings = IntCounterVec::new(
            Opts::new("findings_total", "Validation findings by code").namespace(namespace),
            &["code"],
        )?;
        let rejected = IntCounterVec::new(
            Opts::new("rejected_entries_total", "Entries rejected as invalid input")
                .namespace(namespace),
            &["source"],
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(findings.clone()))?;
        registry.register(Box::new(rejected.clone()))?;

        Ok(Self {
            registry,
            submissions,
            findings,
            rejected,
        })
    }

    pub fn record(&self, report: &SubmissionReport) {
        let source = source_label(report.source);
        self.submissions.with_label_values(&[source]).inc();
        self.rejected
            .with_label_values(&[source])
            .inc_by(report.rejected.len() as u64);
        for finding in report.findings() {
            self.findings.with_label_values(&[finding.code()]).inc();
        }
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
