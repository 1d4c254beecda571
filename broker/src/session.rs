use crate::server::BrokerCore;
use protocol::{self, Command};
use std::io::{self, BufReader, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};

/// A named, connected client. Identity is by `Arc` pointer, never by
/// `name` - two sessions may share a name.
#[derive(Debug)]
pub struct SessionHandle {
    name: Vec<u8>,
    out: Arc<Mutex<TcpStream>>,
}

impl SessionHandle {
    pub fn new(name: Vec<u8>, out: Arc<Mutex<TcpStream>>) -> Self {
        SessionHandle { name, out }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Writes one line to the client. Any failure (broken pipe, reset
    /// connection) is swallowed here: the sender doesn't learn whether a
    /// fan-out reached a particular subscriber, only the subscriber's own
    /// read loop will notice the disconnect.
    pub fn send_line(&self, line: &[u8]) {
        write_line(&self.out, line);
    }
}

pub type Subscriber = Arc<SessionHandle>;

fn write_line(out: &Mutex<TcpStream>, line: &[u8]) {
    let Ok(mut stream) = out.lock() else {
        return;
    };
    let _ = stream.write_all(line);
    let _ = stream.flush();
}

/// Drives one accepted connection until EOF, a fatal read error, or a
/// malformed command forces a reply; unsubscribes and tears down the
/// session's bookkeeping in `core` on the way out.
pub fn run_session(core: Arc<BrokerCore>, stream: TcpStream) -> io::Result<()> {
    let out = Arc::new(Mutex::new(stream.try_clone()?));
    let mut reader = BufReader::new(stream);
    let mut handle: Option<Subscriber> = None;

    loop {
        let line = match protocol::read_line(&mut reader) {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(_) => break,
        };

        let command = protocol::parse(&line);

        if handle.is_none() {
            // Unnamed: a valid `name` transitions the session; anything
            // else is dropped with no reply at all, valid or not.
            if let Some(Command::Name(name)) = command {
                let session = Arc::new(SessionHandle::new(name, Arc::clone(&out)));
                core.logger().log_named(session.name());
                handle = Some(session);
            }
            continue;
        }

        let session = handle.as_ref().expect("checked above");
        match command {
            // A second `name` while already Named is ignored outright.
            Some(Command::Name(_)) => {}
            Some(Command::Sub(topic)) => core.subscribe(Arc::clone(session), &topic),
            Some(Command::Unsub(topic)) => core.unsubscribe(session, &topic),
            Some(Command::Pub { topic, value }) => core.publish(session, &topic, &value),
            None => {
                core.logger().log_invalid();
                session.send_line(protocol::INVALID_REPLY);
            }
        }
    }

    core.logger()
        .log_teardown(handle.as_ref().map(|s| s.name()));
    core.finalize_session(handle);
    Ok(())
}
