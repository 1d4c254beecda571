pub mod config;
pub mod error;
pub mod gate;
pub mod logfile;
pub mod server;
pub mod session;
pub mod stats;
pub mod topic;

pub use config::Config;
pub use error::{BrokerError, BrokerResult};
pub use logfile::Logger;
pub use server::{run, BrokerCore};
pub use session::run_session;
pub use stats::StatsSnapshot;
