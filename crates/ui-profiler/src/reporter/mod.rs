//! Benchmark record reporting
//!
//! This module formats [`BenchmarkRecord`]s for machines or people.
//!
//! # Output Formats
//!
//! - **JSON**: Machine-readable record, as stored by the host
//! - **Console**: Human-readable tables of timings or hot functions
//!
//! # Example
//!
//! ```no_run
//! use ui_profiler::profiler::BenchmarkRecord;
//! use ui_profiler::reporter::{OutputFormat, Reporter};
//!
//! # fn example(record: BenchmarkRecord) -> anyhow::Result<()> {
//! Reporter::new(OutputFormat::Console).report(&record)?;
//! let json = Reporter::new(OutputFormat::Json).format_record(&record)?;
//! # Ok(())
//! # }
//! ```

mod console;
mod json;

use anyhow::Result;
use std::io::{self, Write};

use crate::profiler::BenchmarkRecord;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Output format for benchmark records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Console tables
    #[default]
    Console,
}

/// Reporter for benchmark records
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    /// Create a new reporter with the specified output format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report a record to stdout
    pub fn report(&self, record: &BenchmarkRecord) -> Result<()> {
        let output = self.format_record(record)?;
        print!("{}", output);
        io::stdout().flush()?;
        Ok(())
    }

    /// Format a record as a string
    pub fn format_record(&self, record: &BenchmarkRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(record, false),
            OutputFormat::JsonPretty => JsonReporter::format(record, true),
            OutputFormat::Console => ConsoleReporter::format(record),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::measurement::{Outcome, TimeMeasurement, TimingReport};
    use crate::profiler::RecordOptions;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    pub(crate) fn create_test_record() -> BenchmarkRecord {
        BenchmarkRecord {
            id: "isolation_menu-open_2024-01-01T00:00:00.000Z".to_string(),
            benchmark: "isolation".to_string(),
            scenario: "menu-open".to_string(),
            options: RecordOptions {
                scenario: json!({"menu": "file"}),
                benchmark: json!({"repeats": 4}),
            },
            completed: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            result: Outcome::Timing(TimingReport {
                results: vec![
                    TimeMeasurement {
                        times: vec![10.0, 12.0, 14.0, 16.0],
                        ..Default::default()
                    }
                    .with("label", "theme.css"),
                    TimeMeasurement {
                        times: vec![20.0, 21.0, 22.0, 23.0],
                        ..Default::default()
                    }
                    .with("label", "toolbar.css"),
                ],
                reference: Some(TimeMeasurement {
                    times: vec![20.0, 20.0, 22.0, 22.0],
                    ..Default::default()
                }),
                total_time: 250.0,
                interrupted: false,
            }),
        }
    }

    #[test]
    fn test_reporter_json_format() {
        let record = create_test_record();
        let reporter = Reporter::new(OutputFormat::Json);
        let output = reporter.format_record(&record).unwrap();

        assert!(output.contains("menu-open"));
        assert!(output.contains("\"type\":\"timing\""));
    }

    #[test]
    fn test_reporter_console_format() {
        let record = create_test_record();
        let reporter = Reporter::new(OutputFormat::Console);
        let output = reporter.format_record(&record).unwrap();

        assert!(output.contains("menu-open"));
        assert!(output.contains("theme.css"));
    }

    #[test]
    fn test_default_format() {
        let reporter = Reporter::default();
        assert_eq!(reporter.format, OutputFormat::Console);
    }
}
