//! A small HTTP endpoint mirroring the two conversion directions.
//!
//! Grounded on `jeremyhahn-neurlang/src/bin/rest_api.rs`'s hand-rolled
//! request-line/header parsing over a raw [`TcpListener`], and on
//! `original_source/server/app.py`'s two routes and response shape.
//! Development convenience, not a production service: no TLS, no
//! keep-alive, one thread per connection.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};

use tracing::{error, info, warn};

use crate::cheatfile::{assemble_file, disassemble_file, Dialect};
use crate::disassembler::DecodeOptions;

/// Runs the server until the process is killed. `indent` is the
/// rendering indent width passed to [`crate::cheatfile::CheatFile::render`].
pub fn run(bind_addr: &str, indent: usize) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    info!(%bind_addr, "listening");
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => handle_connection(stream, indent),
            Err(e) => warn!(error = %e, "accept failed"),
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream, indent: usize) {
    let peer = stream.peer_addr().ok();
    let mut reader = BufReader::new(&stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", "invalid request line");
        return;
    }
    let method = parts[0];
    let path = parts[1];

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).is_err() {
            break;
        }
        let header = header.trim();
        if header.is_empty() {
            break;
        }
        if let Some(value) = header.to_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        let _ = reader.read_exact(&mut body);
    }
    let body_str = String::from_utf8_lossy(&body);
    let text = form_field(&body_str, "text").unwrap_or_default();

    info!(%method, %path, ?peer, "request");
    match (method, path) {
        ("POST", "/dmnt_dism") => handle_dism(&mut stream, &text, indent),
        ("POST", "/dmnt_asm") => handle_asm(&mut stream, &text, indent),
        ("GET", "/health") => send_response(&mut stream, 200, "OK", "healthy"),
        _ => send_response(&mut stream, 404, "Not Found", "unknown endpoint"),
    }
}

fn handle_dism(stream: &mut TcpStream, text: &str, indent: usize) {
    let mut errors = Vec::new();
    let (file, all_ok) = disassemble_file(text, DecodeOptions::default(), |line_no, fragment, e| {
        errors.push(format!("line #{line_no}, {fragment}: {e}"));
    });
    let dism = file.render(indent, Dialect::Assembly);
    if !all_ok {
        warn!(error_count = errors.len(), "disassembly had errors");
    }
    let json = json_object(&[("success", json_bool(all_ok)), ("dism", json_string(&dism)), ("errors", json_string_array(&errors))]);
    send_json_response(stream, 200, "OK", &json);
}

fn handle_asm(stream: &mut TcpStream, text: &str, indent: usize) {
    let mut errors = Vec::new();
    let (file, all_ok) = assemble_file(text, |line_no, fragment, e| {
        errors.push(format!("line #{line_no}, {fragment}: {e}"));
    });
    let asm = file.render(indent, Dialect::MachineCode);
    if !all_ok {
        warn!(error_count = errors.len(), "assembly had errors");
    }
    let json = json_object(&[("success", json_bool(all_ok)), ("asm", json_string(&asm)), ("errors", json_string_array(&errors))]);
    send_json_response(stream, 200, "OK", &json);
}

/// Extracts one field out of an `application/x-www-form-urlencoded` body.
fn form_field<'a>(body: &'a str, name: &str) -> Option<String> {
    body.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| percent_decode(value))
    })
}

fn percent_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut bytes = s.bytes().peekable();
    while let Some(b) = bytes.next() {
        match b {
            b'+' => out.push(' '),
            b'%' => {
                let hi = bytes.next();
                let lo = bytes.next();
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    if let (Some(hi), Some(lo)) = (
                        (hi as char).to_digit(16),
                        (lo as char).to_digit(16),
                    ) {
                        out.push(((hi * 16 + lo) as u8) as char);
                        continue;
                    }
                }
                out.push('%');
            }
            _ => out.push(b as char),
        }
    }
    out
}

fn json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn json_bool(b: bool) -> String {
    b.to_string()
}

fn json_string_array(items: &[String]) -> String {
    format!("[{}]", items.iter().map(|s| json_string(s)).collect::<Vec<_>>().join(","))
}

fn json_object(fields: &[(&str, String)]) -> String {
    let body = fields.iter().map(|(k, v)| format!("\"{k}\":{v}")).collect::<Vec<_>>().join(",");
    format!("{{{body}}}")
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status} {status_text}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(e) = stream.write_all(response.as_bytes()) {
        error!(error = %e, "failed to write response");
    }
    let _ = stream.flush();
}

fn send_json_response(stream: &mut TcpStream, status: u16, status_text: &str, json_body: &str) {
    let response = format!(
        "HTTP/1.1 {status} {status_text}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{json_body}",
        json_body.len()
    );
    if let Err(e) = stream.write_all(response.as_bytes()) {
        error!(error = %e, "failed to write response");
    }
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_decode_handles_escapes_and_plus() {
        assert_eq!(percent_decode("a+b%3Dc"), "a b=c");
    }

    #[test]
    fn form_field_extracts_named_value() {
        let body = "text=nop%0Aendif&other=1";
        assert_eq!(form_field(body, "text"), Some("nop\nendif".to_string()));
    }

    #[test]
    fn json_string_escapes_quotes_and_newlines() {
        assert_eq!(json_string("a\"b\nc"), "\"a\\\"b\\nc\"");
    }
}
