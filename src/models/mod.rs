pub mod diagnosis;
pub mod enums;

pub use diagnosis::{DisplayReport, PredictionResult};
pub use enums::{Disease, ReportStyle};
