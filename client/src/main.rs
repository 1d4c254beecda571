//! Thin terminal companion to the broker: connects, announces a name,
//! subscribes to any topics given on the command line, then relays stdin
//! to the socket and the socket to stdout.

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process::ExitCode;
use std::thread;

const USAGE: &str = "Usage: client portnum name [topic] ...";

const EXIT_NOT_ENOUGH_ARGS: u8 = 1;
const EXIT_INVALID_NAME_OR_TOPIC: u8 = 2;
const EXIT_UNABLE_TO_CONNECT: u8 = 3;
const EXIT_CONNECTION_CLOSED: u8 = 4;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.len() < 2 {
        eprintln!("{}", USAGE);
        return ExitCode::from(EXIT_NOT_ENOUGH_ARGS);
    }

    let port = &args[0];
    let name = &args[1];
    let topics = &args[2..];

    if !is_valid_name_or_topic(name) || topics.iter().any(|t| !is_valid_name_or_topic(t)) {
        eprintln!("client: invalid name or topic");
        return ExitCode::from(EXIT_INVALID_NAME_OR_TOPIC);
    }

    let stream = match TcpStream::connect(("localhost", match port.parse::<u16>() {
        Ok(port) => port,
        Err(_) => {
            eprintln!("client: unable to connect to port {}", port);
            return ExitCode::from(EXIT_UNABLE_TO_CONNECT);
        }
    })) {
        Ok(stream) => stream,
        Err(_) => {
            eprintln!("client: unable to connect to port {}", port);
            return ExitCode::from(EXIT_UNABLE_TO_CONNECT);
        }
    };

    if let Err(err) = send_initial_commands(&stream, name, topics) {
        eprintln!("client: unable to connect to port {}: {}", port, err);
        return ExitCode::from(EXIT_UNABLE_TO_CONNECT);
    }

    let stdin_writer = match stream.try_clone() {
        Ok(stream) => stream,
        Err(_) => {
            eprintln!("client: unable to connect to port {}", port);
            return ExitCode::from(EXIT_UNABLE_TO_CONNECT);
        }
    };
    thread::spawn(move || forward_stdin(stdin_writer));

    forward_socket_to_stdout(stream);
    eprintln!("client: server connection terminated");
    ExitCode::from(EXIT_CONNECTION_CLOSED)
}

/// Rejects what the wire grammar can't carry in a single field: empty,
/// embedded space, colon, or newline.
fn is_valid_name_or_topic(value: &str) -> bool {
    !value.is_empty()
        && !value.contains(' ')
        && !value.contains(':')
        && !value.contains('\n')
}

fn send_initial_commands(mut stream: &TcpStream, name: &str, topics: &[String]) -> io::Result<()> {
    stream.write_all(&protocol::format_name(name.as_bytes()))?;
    for topic in topics {
        stream.write_all(&protocol::format_sub(topic.as_bytes()))?;
    }
    stream.flush()
}

/// Runs on a dedicated thread for the life of the connection, relaying
/// every line typed at the terminal straight to the broker.
fn forward_stdin(mut out: TcpStream) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        if out.write_all(line.as_bytes()).is_err() || out.write_all(b"\n").is_err() {
            break;
        }
        if out.flush().is_err() {
            break;
        }
    }
}

/// Runs on the main thread: prints every line the broker sends until it
/// closes the connection.
fn forward_socket_to_stdout(stream: TcpStream) {
    let reader = BufReader::new(stream);
    let stdout = io::stdout();
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        let mut out = stdout.lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}
