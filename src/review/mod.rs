pub mod report;

pub use report::{parse_report, Dimension, ReportSchema, ReviewReport, DEFAULT_SCHEMA};
