//! JSON reporter for benchmark records

use crate::profiler::BenchmarkRecord;
use anyhow::Result;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format a benchmark record as JSON
    ///
    /// # Arguments
    ///
    /// * `record` - The record to format
    /// * `pretty` - Whether to pretty-print the JSON
    pub fn format(record: &BenchmarkRecord, pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(record)?
        } else {
            serde_json::to_string(record)?
        };
        Ok(output)
    }
}
