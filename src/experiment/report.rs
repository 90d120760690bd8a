//! CSV persistence and a textual summary of sweep results.

use crate::experiment::sweep::{Outcome, Record};
use crate::sat::error::Result;
use std::collections::BTreeMap;
use std::io::Write;

/// First line of every CSV file.
pub const CSV_HEADER: &str = "clauses,variables,size,steps,outcome,micros";

/// Writes the header line.
///
/// # Errors
///
/// `Io` if the writer fails.
pub fn write_csv_header<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    Ok(())
}

/// Writes one row per record, without a header.
///
/// # Errors
///
/// `Io` if the writer fails.
pub fn write_csv_row<W: Write>(writer: &mut W, record: &Record) -> Result<()> {
    writeln!(
        writer,
        "{},{},{},{},{},{}",
        record.clauses,
        record.variables,
        record.size,
        record.steps,
        record.outcome,
        record.elapsed.as_micros()
    )?;
    Ok(())
}

/// Writes the header followed by every record.
///
/// # Errors
///
/// `Io` if the writer fails.
pub fn write_csv<'a, W: Write>(
    writer: &mut W,
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<()> {
    write_csv_header(writer)?;
    for record in records {
        write_csv_row(writer, record)?;
    }
    Ok(())
}

/// Step statistics for one problem size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeSummary {
    /// Instances of this size.
    pub instances: usize,
    /// Instances answered satisfiable.
    pub satisfiable: usize,
    /// Instances stopped by a budget.
    pub unknown: usize,
    /// Sum of steps.
    pub total_steps: u64,
    /// Largest step count.
    pub max_steps: u64,
}

impl SizeSummary {
    /// Average steps per instance; 0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_steps(&self) -> f64 {
        if self.instances == 0 {
            return 0.0;
        }
        self.total_steps as f64 / self.instances as f64
    }

    /// Share of satisfiable instances, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn satisfiable_ratio(&self) -> f64 {
        if self.instances == 0 {
            return 0.0;
        }
        self.satisfiable as f64 / self.instances as f64
    }
}

/// Results grouped by `size = clauses + variables`, smallest first.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    /// Statistics keyed by size.
    pub by_size: BTreeMap<usize, SizeSummary>,
}

impl Summary {
    /// Folds one record into its size bucket.
    pub fn add(&mut self, record: &Record) {
        let entry = self.by_size.entry(record.size).or_default();
        entry.instances += 1;
        entry.total_steps += record.steps;
        entry.max_steps = entry.max_steps.max(record.steps);
        match record.outcome {
            Outcome::Satisfiable => entry.satisfiable += 1,
            Outcome::Unknown => entry.unknown += 1,
            Outcome::Unsatisfiable => {}
        }
    }

    /// Summarises every record.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.add(record);
        }
        summary
    }

    /// Records seen across all sizes.
    #[must_use]
    pub fn instances(&self) -> usize {
        self.by_size.values().map(|s| s.instances).sum()
    }

    /// Renders the table printed at the end of a sweep.
    #[must_use]
    pub fn table(&self) -> String {
        let mut out = String::new();
        out.push_str("==========================[ Sweep Summary ]==========================\n");
        out.push_str(&format!(
            "|  {:>6} {:>9} {:>12} {:>10} {:>8} {:>8}  |\n",
            "size", "instances", "mean steps", "max steps", "sat %", "unknown"
        ));
        for (size, s) in &self.by_size {
            out.push_str(&format!(
                "|  {:>6} {:>9} {:>12.1} {:>10} {:>8.1} {:>8}  |\n",
                size,
                s.instances,
                s.mean_steps(),
                s.max_steps,
                100.0 * s.satisfiable_ratio(),
                s.unknown
            ));
        }
        out.push_str("=====================================================================\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn record(clauses: usize, variables: usize, steps: u64, outcome: Outcome) -> Record {
        Record {
            clauses,
            variables,
            size: clauses + variables,
            steps,
            outcome,
            elapsed: Duration::from_micros(42),
        }
    }

    #[test]
    fn test_write_csv() {
        let records = vec![
            record(10, 5, 7, Outcome::Satisfiable),
            record(20, 5, 12, Outcome::Unsatisfiable),
            record(20, 6, 100, Outcome::Unknown),
        ];
        let mut out = Vec::new();
        write_csv(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "clauses,variables,size,steps,outcome,micros\n\
             10,5,15,7,sat,42\n\
             20,5,25,12,unsat,42\n\
             20,6,26,100,unknown,42\n"
        );
    }

    #[test]
    fn test_write_csv_empty() {
        let mut out = Vec::new();
        write_csv(&mut out, &[] as &[Record]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_summary_groups_by_size() {
        let records = vec![
            record(10, 5, 4, Outcome::Satisfiable),
            record(11, 4, 8, Outcome::Unsatisfiable),
            record(20, 5, 30, Outcome::Unknown),
        ];
        let summary = Summary::from_records(&records);
        assert_eq!(summary.instances(), 3);
        assert_eq!(summary.by_size.len(), 2);

        let fifteen = summary.by_size[&15];
        assert_eq!(fifteen.instances, 2);
        assert_eq!(fifteen.max_steps, 8);
        assert!((fifteen.mean_steps() - 6.0).abs() < f64::EPSILON);
        assert!((fifteen.satisfiable_ratio() - 0.5).abs() < f64::EPSILON);

        let twenty_five = summary.by_size[&25];
        assert_eq!(twenty_five.unknown, 1);
        assert_eq!(twenty_five.satisfiable, 0);
    }

    #[test]
    fn test_table_lists_every_size() {
        let summary = Summary::from_records(&[
            record(3, 3, 1, Outcome::Satisfiable),
            record(9, 3, 5, Outcome::Unsatisfiable),
        ]);
        let table = summary.table();
        assert!(table.contains("Sweep Summary"));
        assert_eq!(table.lines().count(), 5);
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::default();
        assert_eq!(summary.instances(), 0);
        assert!((SizeSummary::default().mean_steps()).abs() < f64::EPSILON);
    }
}
