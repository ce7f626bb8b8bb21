pub mod games;
pub mod predictions;
pub mod betting;
pub mod market;
pub mod weights;
pub mod analytics;
pub mod error;

pub use games::*;
pub use predictions::*;
pub use betting::*;
pub use market::*;
pub use weights::*;
pub use analytics::*;
pub use error::*;
