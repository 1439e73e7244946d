//! Plain-text table of one snapshot report for the console

use super::rows::{rows, COLUMNS};
use crate::analytics_core::types::SnapshotReport;

/// Render every row of the report as an aligned text table
///
/// The date column is dropped since it is identical on every row and shown in
/// the title line instead.
pub fn render_table(report: &SnapshotReport) -> String {
    let header: Vec<String> = COLUMNS[1..].iter().map(|c| c.to_string()).collect();
    let body: Vec<Vec<String>> = rows(report)
        .iter()
        .map(|row| row.cells().into_iter().skip(1).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("│ {} │", padded.join(" │ "))
    };
    let rule = |left: &str, mid: &str, right: &str| -> String {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };

    let mut out = format!("Snapshot {}\n", report.date);
    out.push_str(&rule("┌", "┬", "┐"));
    out.push('\n');
    out.push_str(&line(&header));
    out.push('\n');
    out.push_str(&rule("├", "┼", "┤"));
    out.push('\n');
    for cells in &body {
        out.push_str(&line(cells));
        out.push('\n');
    }
    out.push_str(&rule("└", "┴", "┘"));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::analytics_core::types::{Observation, Snapshot};
    use crate::pipeline::{PipelineState, SnapshotPipeline};
    use chrono::NaiveDate;

    #[test]
    fn test_table_has_header_and_rows() {
        let pipeline = SnapshotPipeline::new(EngineConfig::empty()).unwrap();
        let snapshot = Snapshot::new(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()).with_category(
            "pools",
            vec![Observation::new("a", 10.0), Observation::new("b", 30.0)],
        );
        let report = pipeline.process(&mut PipelineState::new(), &snapshot).unwrap();

        let table = render_table(&report);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Snapshot 2023-06-01");
        assert!(lines[2].contains("category") && lines[2].contains("decileRatio"));
        assert!(lines[4].starts_with("│ pools"));
        assert!(lines[5].starts_with("│ masterIndex"));
        // Every body line has the same display width
        let width = lines[1].chars().count();
        assert!(lines[1..].iter().all(|l| l.chars().count() == width));
    }
}
