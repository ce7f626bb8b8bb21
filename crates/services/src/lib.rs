pub mod data_feed;
pub mod predictor;
pub mod metrics;
pub mod export;
pub mod engine;

pub use data_feed::*;
pub use predictor::*;
pub use metrics::*;
pub use export::*;
pub use engine::*;
