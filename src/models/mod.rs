pub mod enums;
pub mod report;

pub use enums::{TestStatus, Trend};
pub use report::{PatientInfo, ReportSnapshot, TestObservation, TestValue};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
}
