//! Per-run record of a batch over one issue of the Congressional Record.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Issue date of the processed records
    pub issued_date: NaiveDate,
    pub success: bool,
    pub message: String,
    pub files_written: usize,
}

impl RunReport {
    pub fn succeeded(issued_date: NaiveDate, files_written: usize, message: impl Into<String>) -> Self {
        Self {
            issued_date,
            success: true,
            message: message.into(),
            files_written,
        }
    }

    pub fn failed(issued_date: NaiveDate, files_written: usize, message: impl Into<String>) -> Self {
        Self {
            issued_date,
            success: false,
            message: message.into(),
            files_written,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.success { "successful" } else { "failed" };
        write!(
            f,
            "CREC Issued Date: {}, processing {}: {}",
            self.issued_date.format("%Y-%m-%d"),
            outcome,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, 3).unwrap()
    }

    #[test]
    fn test_display() {
        let ok = RunReport::succeeded(date(), 12, "12 documents refined");
        assert_eq!(
            ok.to_string(),
            "CREC Issued Date: 2017-01-03, processing successful: 12 documents refined"
        );

        let failed = RunReport::failed(date(), 0, "no annotations found");
        assert_eq!(
            failed.to_string(),
            "CREC Issued Date: 2017-01-03, processing failed: no annotations found"
        );
    }

    #[test]
    fn test_json_shape() {
        let report = RunReport::succeeded(date(), 2, "done");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["issued_date"], "2017-01-03");
        assert_eq!(json["files_written"], 2);
        assert_eq!(serde_json::from_value::<RunReport>(json).unwrap(), report);
    }
}
