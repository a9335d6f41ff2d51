// hiveq-core/src/infrastructure/adapters/thrift/transport.rs
//
// SASL PLAIN handshake as HiveServer2 expects it for NONE/LDAP/CUSTOM auth.
// Negotiation frames are `status:u8 | len:u32be | payload`. After COMPLETE
// the stream carries framed Thrift traffic (`thrift::transport::TFramed*`).

use std::io::{self, Read, Write};
use tracing::debug;

const START: u8 = 1;
const OK: u8 = 2;
const BAD: u8 = 3;
const ERROR: u8 = 4;
const COMPLETE: u8 = 5;

const MAX_SASL_PAYLOAD: usize = 1024 * 1024;

fn send_sasl<W: Write>(stream: &mut W, status: u8, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "SASL payload too large"))?;
    stream.write_all(&[status])?;
    stream.write_all(&len.to_be_bytes())?;
    stream.write_all(payload)
}

fn receive_sasl<R: Read>(stream: &mut R) -> io::Result<(u8, Vec<u8>)> {
    let mut status = [0u8; 1];
    stream.read_exact(&mut status)?;
    let mut len = [0u8; 4];
    stream.read_exact(&mut len)?;
    let len = u32::from_be_bytes(len) as usize;
    if len > MAX_SASL_PAYLOAD {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("SASL payload of {} bytes exceeds the {} byte limit", len, MAX_SASL_PAYLOAD),
        ));
    }
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload)?;
    Ok((status[0], payload))
}

/// Runs the PLAIN handshake. On success the stream is ready for framed
/// Thrift traffic.
pub fn negotiate_plain<S: Read + Write>(
    stream: &mut S,
    username: &str,
    password: &str,
) -> io::Result<()> {
    send_sasl(stream, START, b"PLAIN")?;

    let mut response = Vec::with_capacity(username.len() + password.len() + 2);
    response.push(0);
    response.extend_from_slice(username.as_bytes());
    response.push(0);
    response.extend_from_slice(password.as_bytes());
    send_sasl(stream, OK, &response)?;
    stream.flush()?;

    let (status, payload) = receive_sasl(stream)?;
    let detail = String::from_utf8_lossy(&payload).into_owned();
    match status {
        COMPLETE => {
            debug!("SASL PLAIN negotiation complete");
            Ok(())
        }
        BAD | ERROR => Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("SASL authentication rejected: {}", detail),
        )),
        OK => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "unexpected SASL challenge for PLAIN mechanism",
        )),
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unexpected SASL status {}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Cursor;

    /// Scripted peer: reads come from `incoming`, writes land in `outgoing`.
    struct Duplex {
        incoming: Cursor<Vec<u8>>,
        outgoing: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.incoming.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.outgoing.write(data)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sasl_frame(status: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![status];
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_plain_handshake_bytes() -> Result<()> {
        let mut peer = Duplex {
            incoming: Cursor::new(sasl_frame(COMPLETE, b"")),
            outgoing: Vec::new(),
        };

        negotiate_plain(&mut peer, "alice", "pw")?;

        let mut expected = sasl_frame(START, b"PLAIN");
        expected.extend(sasl_frame(OK, b"\0alice\0pw"));
        assert_eq!(peer.outgoing, expected);
        Ok(())
    }

    #[test]
    fn test_rejected_handshake() {
        let mut peer = Duplex {
            incoming: Cursor::new(sasl_frame(BAD, b"Error validating LDAP user")),
            outgoing: Vec::new(),
        };

        let err = negotiate_plain(&mut peer, "alice", "wrong").err();
        let err = err.map(|e| (e.kind(), e.to_string()));
        assert!(matches!(
            err,
            Some((io::ErrorKind::PermissionDenied, ref msg)) if msg.contains("LDAP user")
        ));
    }

    #[test]
    fn test_oversized_sasl_payload_is_rejected() {
        let mut wire = vec![COMPLETE];
        wire.extend_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
        let mut peer = Duplex {
            incoming: Cursor::new(wire),
            outgoing: Vec::new(),
        };
        let err = negotiate_plain(&mut peer, "alice", "pw").err().map(|e| e.kind());
        assert_eq!(err, Some(io::ErrorKind::InvalidData));
    }
}
