//! Flat per-category rows shared by the tabular report backends

use crate::analytics_core::types::{Divergence, IndexKind, Outcome, SnapshotReport};
use chrono::NaiveDate;

pub const MASTER_INDEX_ROW: &str = "masterIndex";

/// Column headers in stable order
pub const COLUMNS: [&str; 10] = [
    "date",
    "category",
    "Gini",
    "HHI",
    "Atkinson",
    "Shannon",
    "euclideanDistance",
    "js_divergence",
    "decileRatio",
    "error",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub category: String,
    pub gini: Option<f64>,
    pub hhi: Option<f64>,
    pub atkinson: Option<f64>,
    pub shannon: Option<f64>,
    pub euclidean_distance: Option<f64>,
    pub js_divergence: Option<Divergence>,
    pub decile_ratio: Option<i64>,
    pub error: Option<String>,
}

impl ReportRow {
    fn empty(date: NaiveDate, category: &str) -> Self {
        Self {
            date,
            category: category.to_string(),
            gini: None,
            hhi: None,
            atkinson: None,
            shannon: None,
            euclidean_distance: None,
            js_divergence: None,
            decile_ratio: None,
            error: None,
        }
    }

    /// Cells as text; undefined values are empty
    pub fn cells(&self) -> Vec<String> {
        fn num(v: Option<f64>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }

        vec![
            self.date.to_string(),
            self.category.clone(),
            num(self.gini),
            num(self.hhi),
            num(self.atkinson),
            num(self.shannon),
            num(self.euclidean_distance),
            match self.js_divergence {
                Some(Divergence::Defined(v)) => v.to_string(),
                Some(Divergence::Undefined) => "undefined".to_string(),
                None => String::new(),
            },
            self.decile_ratio.map(|v| v.to_string()).unwrap_or_default(),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

/// One row per category plus a trailing master index row
pub fn rows(report: &SnapshotReport) -> Vec<ReportRow> {
    let mut rows = Vec::with_capacity(report.categories.len() + 1);

    for (name, outcome) in &report.categories {
        let mut row = ReportRow::empty(report.date, name);
        match outcome {
            Outcome::Computed(r) => {
                row.gini = Some(r.gini);
                row.hhi = Some(r.hhi);
                row.atkinson = r.atkinson;
                row.shannon = Some(r.shannon);
                row.euclidean_distance = r.euclidean_distance;
                row.js_divergence = r.js_divergence;
                row.decile_ratio = r.decile_ratio;
            }
            Outcome::Failed { error } => row.error = Some(error.to_string()),
        }
        rows.push(row);
    }

    let mut master = ReportRow::empty(report.date, MASTER_INDEX_ROW);
    let mut errors = Vec::new();
    for kind in IndexKind::all() {
        let outcome = report.master_index.get(kind);
        let value = outcome.computed().copied();
        if let Some(e) = outcome.error() {
            errors.push(format!("{}: {}", kind.as_str(), e));
        }
        match kind {
            IndexKind::Gini => master.gini = value,
            IndexKind::Hhi => master.hhi = value,
            IndexKind::Atkinson => master.atkinson = value,
            IndexKind::Shannon => master.shannon = value,
        }
    }
    if !errors.is_empty() {
        master.error = Some(errors.join("; "));
    }
    rows.push(master);

    rows
}
