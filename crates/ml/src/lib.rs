pub mod features;
pub mod models;
pub mod calibration;
pub mod training;
pub mod evaluation;

pub use features::*;
pub use models::*;
pub use calibration::*;
pub use training::*;
pub use evaluation::*;
