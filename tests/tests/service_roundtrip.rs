//! System test: the TCP service serving several sessions in a row.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread;

use pretty_assertions::assert_eq;
use pytok_service::{ErrorReply, Service, TokenizeReply, TokenizeRequest};

fn request_line(python: &str) -> String {
    let request = TokenizeRequest {
        python: python.to_string(),
    };
    let mut line = serde_json::to_string(&request).unwrap();
    line.push('\n');
    line
}

#[test]
fn sequential_sessions_share_one_service() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();

    let service = Service::bind("127.0.0.1:0").unwrap();
    let addr = service.local_addr().unwrap();
    let handle = service.handle();
    let server = thread::spawn(move || service.run());

    // First session: a failing request followed by a good one.
    {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .write_all(request_line("s = 'open\n").as_bytes())
            .unwrap();
        stream.write_all(request_line("x = 1\n").as_bytes()).unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let error: ErrorReply = serde_json::from_str(&line).unwrap();
        assert!(error.error.contains("unterminated"));

        line.clear();
        reader.read_line(&mut line).unwrap();
        let reply: TokenizeReply = serde_json::from_str(&line).unwrap();
        assert_eq!(reply.tokens.len(), 5);
    }

    // Second session on the same listener.
    {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .write_all(request_line("print(1+2**2)\n").as_bytes())
            .unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let reply: TokenizeReply = serde_json::from_str(&line).unwrap();
        let kinds: Vec<&str> = reply.tokens.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "NAME", "OP", "NUMBER", "OP", "NUMBER", "OP", "NUMBER", "OP", "NEWLINE",
                "ENDMARKER"
            ]
        );
    }

    handle.stop();
    server.join().unwrap().unwrap();
}
