pub mod cli;
pub mod core;
pub mod error;
pub mod model;
pub mod session;
pub mod settings;

pub use cli::run;
pub use error::TimingError;
pub use model::{TimingDocument, TimingRow};
pub use session::{TimelineSink, TimingSession};
