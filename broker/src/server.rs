use crate::config::Config;
use crate::error::BrokerResult;
use crate::gate::AdmissionGate;
use crate::logfile::Logger;
use crate::session::{self, Subscriber};
use crate::stats::{spawn_stats_worker, Stats};
use crate::topic::TopicTable;
use socket2::{Domain, Socket, Type};
use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread;

/// Shared broker state. Every mutation goes through one method here so the
/// lock-acquisition order - topic table, then stats, released innermost
/// first - is enforced in exactly one place.
pub struct BrokerCore {
    topics: Mutex<TopicTable>,
    stats: Arc<Mutex<Stats>>,
    gate: AdmissionGate,
    logger: Arc<Logger>,
}

impl BrokerCore {
    pub fn new(connections: usize, logger: Arc<Logger>) -> Self {
        BrokerCore {
            topics: Mutex::new(TopicTable::new()),
            stats: Arc::new(Mutex::new(Stats::new())),
            gate: AdmissionGate::new(connections),
            logger,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn stats(&self) -> Arc<Mutex<Stats>> {
        Arc::clone(&self.stats)
    }

    pub fn stats_snapshot(&self) -> crate::stats::StatsSnapshot {
        let stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
        stats.snapshot()
    }

    pub fn subscribe(&self, subscriber: Subscriber, topic: &[u8]) {
        let name = subscriber.name().to_vec();
        {
            let mut topics = self.topics.lock().unwrap_or_else(|p| p.into_inner());
            topics.subscribe(topic, subscriber);
            let mut stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
            stats.on_sub();
        }
        self.logger.log_subscribe(&name, topic);
    }

    pub fn unsubscribe(&self, subscriber: &Subscriber, topic: &[u8]) {
        let removed = {
            let mut topics = self.topics.lock().unwrap_or_else(|p| p.into_inner());
            let removed = topics.unsubscribe(topic, subscriber);
            if removed {
                let mut stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
                stats.on_unsub();
            }
            removed
        };
        self.logger
            .log_unsubscribe(subscriber.name(), topic, removed);
    }

    pub fn publish(&self, publisher: &Subscriber, topic: &[u8], value: &[u8]) {
        let subscriber_count = {
            let topics = self.topics.lock().unwrap_or_else(|p| p.into_inner());
            let count = match topics.lookup(topic) {
                Some(set) => {
                    let line = protocol::format_fanout(publisher.name(), topic, value);
                    for subscriber in set.iter() {
                        subscriber.send_line(&line);
                    }
                    set.len()
                }
                None => 0,
            };
            let mut stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
            stats.on_pub();
            count
        };

        if subscriber_count == 0 {
            self.logger
                .log_publish_no_subscribers(publisher.name(), topic);
        } else {
            self.logger
                .log_publish(publisher.name(), topic, subscriber_count);
        }
    }

    /// Called once per connection, whether or not it ever named itself.
    /// A session that never named itself was never subscribed to anything,
    /// so the topic table never needs to be touched. Every torn-down
    /// session releases one admission slot, named or not, or the gate
    /// would permanently saturate once `connections` sessions had ever
    /// been accepted.
    pub fn finalize_session(&self, handle: Option<Subscriber>) {
        if let Some(subscriber) = handle {
            let mut topics = self.topics.lock().unwrap_or_else(|p| p.into_inner());
            topics.remove_everywhere(&subscriber);
        }
        let mut stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
        stats.on_teardown();
        drop(stats);
        self.gate.release();
    }

    pub fn on_accept(&self) {
        let mut stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
        stats.on_accept();
    }
}

/// Binds the listening socket with an explicit backlog (std's
/// `TcpListener::bind` has no way to pass one through), announces the
/// bound port on the diagnostic stream, spawns the stats worker, then
/// loops taking an admission-gate permit before every `accept`.
pub fn run(config: Config, logger: Arc<Logger>) -> BrokerResult<()> {
    let listener = bind_listener(config.port(), config.connections())?;
    let bound_port = listener.local_addr()?.port();
    announce_port(bound_port)?;

    let core = Arc::new(BrokerCore::new(config.connections(), Arc::clone(&logger)));
    spawn_stats_worker(core.stats(), Arc::clone(&logger))?;

    loop {
        core.gate().acquire();
        match listener.accept() {
            Ok((stream, _addr)) => {
                logger.log_accept();
                core.on_accept();
                let core = Arc::clone(&core);
                thread::spawn(move || {
                    let _ = session::run_session(core, stream);
                });
            }
            Err(err) => {
                logger.log_accept_error(&err);
                core.gate().release();
            }
        }
    }
}

fn bind_listener(port: u16, connections: usize) -> io::Result<TcpListener> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;

    // `connections == 0` means "unlimited" to the admission gate, but the
    // backlog argument to `listen` is passed through exactly as given,
    // including the degenerate 0 case.
    socket.listen(connections as i32)?;
    Ok(socket.into())
}

fn announce_port(port: u16) -> io::Result<()> {
    let mut out = io::stderr();
    writeln!(out, "Listening on port {}", port)?;
    out.flush()
}
