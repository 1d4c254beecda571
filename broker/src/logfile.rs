use chrono::Local;
use std::io::{self, Write};
use std::sync::mpsc::{self, Sender};
use std::thread;

const LOG_LEVEL_INFO: &str = "INFO";
const LOG_LEVEL_ERROR: &str = "ERROR";

/// Timestamped, leveled logging that never blocks a protocol-handling
/// thread on I/O: log lines are handed to a dedicated writer thread over a
/// channel, which alone writes to the diagnostic stream.
#[derive(Debug, Clone)]
pub struct Logger {
    sender: Sender<String>,
}

impl Logger {
    /// Spawns the writer thread and returns a handle that can be cloned
    /// freely between sessions.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel::<String>();

        thread::spawn(move || {
            let mut err = io::stderr();
            for line in receiver {
                if writeln!(err, "{}", line).is_err() {
                    break;
                }
                let _ = err.flush();
            }
        });

        Logger { sender }
    }

    fn log(&self, level: &str, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let entry = format!("[{}] {}: {}", timestamp, level, message);
        let _ = self.sender.send(entry);
    }

    pub fn info(&self, message: &str) {
        self.log(LOG_LEVEL_INFO, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LOG_LEVEL_ERROR, message);
    }

    pub fn log_accept(&self) {
        self.info("Accepted a new connection");
    }

    pub fn log_accept_error(&self, err: &io::Error) {
        self.error(&format!("Error accepting connection: {}", err));
    }

    pub fn log_named(&self, name: &[u8]) {
        self.info(&format!(
            "Client named itself {}",
            String::from_utf8_lossy(name)
        ));
    }

    pub fn log_subscribe(&self, name: &[u8], topic: &[u8]) {
        self.info(&format!(
            "Client {} subscribed to {}",
            String::from_utf8_lossy(name),
            String::from_utf8_lossy(topic)
        ));
    }

    pub fn log_unsubscribe(&self, name: &[u8], topic: &[u8], removed: bool) {
        if removed {
            self.info(&format!(
                "Client {} unsubscribed from {}",
                String::from_utf8_lossy(name),
                String::from_utf8_lossy(topic)
            ));
        } else {
            self.info(&format!(
                "Client {} unsub ignored, not subscribed to {}",
                String::from_utf8_lossy(name),
                String::from_utf8_lossy(topic)
            ));
        }
    }

    pub fn log_publish(&self, name: &[u8], topic: &[u8], subscriber_count: usize) {
        self.info(&format!(
            "Client {} published to {} ({} subscribers)",
            String::from_utf8_lossy(name),
            String::from_utf8_lossy(topic),
            subscriber_count
        ));
    }

    pub fn log_publish_no_subscribers(&self, name: &[u8], topic: &[u8]) {
        self.info(&format!(
            "Client {} published to {} with no subscribers",
            String::from_utf8_lossy(name),
            String::from_utf8_lossy(topic)
        ));
    }

    pub fn log_invalid(&self) {
        self.info("Replied :invalid to a malformed command");
    }

    pub fn log_teardown(&self, name: Option<&[u8]>) {
        match name {
            Some(name) => self.info(&format!(
                "Disconnecting client {}",
                String::from_utf8_lossy(name)
            )),
            None => self.info("Disconnecting a client that never sent a name"),
        }
    }

    pub fn log_stats_emitted(&self) {
        self.info("Emitted stats snapshot on trigger");
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
