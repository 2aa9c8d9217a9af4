use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{SourceError, UplinkEvent, UplinkSource};
use crate::protocols::common::parse_hex;

/// Reads uplinks from text, one per line: `<hex>` or `<port> <hex>`.
///
/// Blank lines and `#` comments are skipped. Lines without a port use the
/// default port given at construction.
pub struct HexFileSource<R = BufReader<File>> {
    reader: R,
    default_port: u32,
    line: usize,
    buf: String,
}

impl HexFileSource {
    pub fn open(path: &Path, default_port: u32) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), default_port))
    }
}

impl<R: BufRead> HexFileSource<R> {
    pub fn new(reader: R, default_port: u32) -> Self {
        Self {
            reader,
            default_port,
            line: 0,
            buf: String::new(),
        }
    }
}

fn parse_line(
    text: &str,
    line: usize,
    default_port: u32,
) -> Result<Option<UplinkEvent>, SourceError> {
    let invalid = |message: String| SourceError::InvalidLine { line, message };

    let content = text.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = content.split_whitespace().collect();
    let (port, hex) = match fields.as_slice() {
        [hex] => (default_port, *hex),
        [port, hex] => {
            let port = port
                .parse::<u32>()
                .map_err(|err| invalid(format!("invalid port '{port}': {err}")))?;
            (port, *hex)
        }
        _ => {
            return Err(invalid(format!(
                "expected '<hex>' or '<port> <hex>', got {} fields",
                fields.len()
            )));
        }
    };
    let payload = parse_hex(hex).map_err(|err| invalid(err.to_string()))?;

    Ok(Some(UplinkEvent {
        line,
        port,
        payload,
    }))
}

impl<R: BufRead> UplinkSource for HexFileSource<R> {
    fn next_uplink(&mut self) -> Result<Option<UplinkEvent>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            if let Some(event) = parse_line(&self.buf, self.line, self.default_port)? {
                return Ok(Some(event));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(input: &str) -> Result<Vec<UplinkEvent>, SourceError> {
        let mut source = HexFileSource::new(Cursor::new(input.as_bytes()), 18);
        let mut events = Vec::new();
        while let Some(event) = source.next_uplink()? {
            events.push(event);
        }
        Ok(events)
    }

    #[test]
    fn reads_ports_and_skips_comments() {
        let events = collect("# uplinks\n\n00a7\n2 0500 # trailing\n").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            UplinkEvent {
                line: 3,
                port: 18,
                payload: vec![0x00, 0xa7],
            }
        );
        assert_eq!(events[1].line, 4);
        assert_eq!(events[1].port, 2);
        assert_eq!(events[1].payload, vec![0x05, 0x00]);
    }

    #[test]
    fn rejects_bad_hex() {
        let err = collect("00a\n").unwrap_err();
        assert!(matches!(err, SourceError::InvalidLine { line: 1, .. }));
        assert!(err.to_string().contains("odd number of hex digits"));
    }

    #[test]
    fn rejects_bad_port_and_extra_fields() {
        let err = collect("x1 00a7\n").unwrap_err();
        assert!(err.to_string().contains("invalid port"));
        let err = collect("1 00 a7\n").unwrap_err();
        assert!(err.to_string().contains("got 3 fields"));
    }
}
