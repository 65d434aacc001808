// Output module: errors, log sink and event relay

#[cfg(test)]
pub mod capture;
pub mod errors;
pub mod logfile;
pub mod logging;
pub mod relay;

pub use errors::*;
pub use logfile::RotatingFile;
pub use relay::{log_at, log_event};
