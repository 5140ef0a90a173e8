//! Process entry point: argument parsing, logger bring-up, and running the
//! reactor until a fatal error takes the process down.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process;

use engine::reactor::Reactor;
use support::logging::{error, info, Severity};

/// Number of live entries the store may hold before the recency tail is
/// evicted on insert.
const CAPACITY: usize = 1024;

fn main() {
    let log = support::logging::init(Severity::Debug);

    let port = match parse_port(std::env::args().collect()) {
        Ok(port) => port,
        Err(program) => {
            eprintln!("Usage: {} <port>", program);
            process::exit(1);
        }
    };

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);

    let mut reactor = match Reactor::bind(addr, CAPACITY, log.clone()) {
        Ok(reactor) => reactor,
        Err(e) => {
            error!(log, "failed to start server"; "error" => %e);
            process::exit(1);
        }
    };

    info!(log, "listening"; "port" => port);

    if let Err(e) = reactor.run() {
        error!(log, "server terminated"; "error" => %e);
        process::exit(1);
    }
}

/// Accepts exactly one positional argument: the port, as a base-10 integer in
/// `[1, 65535]`. On any other shape, returns the program name so the caller
/// can print the exact usage diagnostic.
fn parse_port(args: Vec<String>) -> Result<u16, String> {
    let program = args.first().cloned().unwrap_or_else(|| "server".to_string());

    if args.len() != 2 {
        return Err(program);
    }

    args[1].parse::<u16>().map_err(|_| program).and_then(|port| {
        if port == 0 {
            Err(args.first().cloned().unwrap_or_else(|| "server".to_string()))
        } else {
            Ok(port)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_single_valid_port() {
        let args = vec!["server".to_string(), "6379".to_string()];
        assert_eq!(parse_port(args), Ok(6379));
    }

    #[test]
    fn rejects_missing_argument() {
        let args = vec!["server".to_string()];
        assert_eq!(parse_port(args), Err("server".to_string()));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let args = vec!["server".to_string(), "not-a-port".to_string()];
        assert_eq!(parse_port(args), Err("server".to_string()));
    }

    #[test]
    fn rejects_port_zero() {
        let args = vec!["server".to_string(), "0".to_string()];
        assert_eq!(parse_port(args), Err("server".to_string()));
    }
}
