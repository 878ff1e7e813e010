//! Minimal STOMP 1.2 framing for the ingestion sub-protocol.
//!
//! The uplink only ever exchanges four commands: it sends `CONNECT` and
//! `SEND`, the backend answers `CONNECTED` or `ERROR`. Frames travel as
//! WebSocket text messages; a lone `\n` is a heartbeat and is ignored.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Connected,
    Send,
    Error,
}

impl Command {
    fn as_str(self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Error => "ERROR",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "CONNECT" => Some(Command::Connect),
            "CONNECTED" => Some(Command::Connected),
            "SEND" => Some(Command::Send),
            "ERROR" => Some(Command::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    /// Client handshake frame. The bearer token rides on the connection URL,
    /// not in here.
    pub fn connect(host: &str) -> Self {
        Self {
            command: Command::Connect,
            headers: vec![
                ("accept-version".into(), "1.2".into()),
                ("host".into(), host.into()),
                ("heart-beat".into(), "0,0".into()),
            ],
            body: String::new(),
        }
    }

    pub fn send(destination: &str, body: String) -> Self {
        Self {
            command: Command::Send,
            headers: vec![
                ("destination".into(), destination.into()),
                ("content-type".into(), "application/json".into()),
                ("content-length".into(), body.len().to_string()),
            ],
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Wire form: command line, header lines, blank line, body, NUL.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 64);
        out.push_str(self.command.as_str());
        out.push('\n');
        for (k, v) in &self.headers {
            out.push_str(k);
            out.push(':');
            out.push_str(v);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parses one frame. Returns `None` for heartbeats and anything that
    /// does not frame correctly; the session treats those as noise.
    pub fn parse(raw: &str) -> Option<Frame> {
        let raw = raw.trim_end_matches('\0');
        if raw.trim().is_empty() {
            return None; // heartbeat
        }

        let (head, body) = match raw.split_once("\n\n") {
            Some((head, body)) => (head, body),
            None => (raw, ""),
        };

        let mut lines = head.lines();
        let command = Command::from_str(lines.next()?.trim_end_matches('\r'))?;
        let mut headers = Vec::new();
        for line in lines {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let (k, v) = line.split_once(':')?;
            headers.push((k.to_string(), v.to_string()));
        }

        Some(Frame {
            command,
            headers,
            body: body.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_frame_encodes_handshake_headers() {
        let encoded = Frame::connect("api.example.com").encode();
        assert_eq!(
            encoded,
            "CONNECT\naccept-version:1.2\nhost:api.example.com\nheart-beat:0,0\n\n\0"
        );
    }

    #[test]
    fn send_frame_carries_destination_and_body() {
        let frame = Frame::send("/app/ubicacion", r#"{"id":1}"#.into());
        let encoded = frame.encode();
        assert!(encoded.starts_with("SEND\ndestination:/app/ubicacion\n"));
        assert!(encoded.contains("content-type:application/json\n"));
        assert!(encoded.ends_with("\n\n{\"id\":1}\0"));
    }

    #[test]
    fn parses_connected_and_error_replies() {
        let ok = Frame::parse("CONNECTED\nversion:1.2\n\n\0").unwrap();
        assert_eq!(ok.command, Command::Connected);
        assert_eq!(ok.header("version"), Some("1.2"));

        let err = Frame::parse("ERROR\nmessage:bad token\n\ndetails here\0").unwrap();
        assert_eq!(err.command, Command::Error);
        assert_eq!(err.header("message"), Some("bad token"));
        assert_eq!(err.body, "details here");
    }

    #[test]
    fn heartbeats_and_noise_parse_to_none() {
        assert!(Frame::parse("\n").is_none());
        assert!(Frame::parse("").is_none());
        assert!(Frame::parse("NOTACOMMAND\n\n\0").is_none());
    }

    #[test]
    fn encode_parse_preserves_send_frame() {
        let frame = Frame::send("/app/ubicacion", r#"{"id":2,"ubicaciones":[]}"#.into());
        let parsed = Frame::parse(&frame.encode()).unwrap();
        assert_eq!(parsed, frame);
    }
}
