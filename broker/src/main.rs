use broker::{Config, Logger};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::parse(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(1);
        }
    };

    let logger = Arc::new(Logger::new());

    if let Err(err) = broker::run(config, Arc::clone(&logger)) {
        logger.error(&format!("fatal: {}", err));
        eprintln!("{}", err);
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}
