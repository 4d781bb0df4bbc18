//! In-memory loopback transport

use super::{LineBuffer, Transport, TransportError};

/// Transport backed by in-memory queues.
///
/// Inbound bytes are pushed with [`MemTransport::push_input`], everything written by the arm is
/// collected and can be drained with [`MemTransport::take_output`].
#[derive(Debug, Default)]
pub struct MemTransport {
    inbound: LineBuffer,

    outbound: Vec<String>,
}

impl MemTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw inbound text. Lines only become readable once their newline has arrived.
    pub fn push_input(&mut self, text: &str) {
        self.inbound.push_bytes(text.as_bytes());
    }

    /// Queue a complete inbound line.
    pub fn push_line(&mut self, line: &str) {
        self.inbound.push_line(line);
    }

    /// Drain every line written so far.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbound)
    }

    /// Lines written so far, without draining them.
    pub fn output(&self) -> &[String] {
        &self.outbound
    }
}

impl Transport for MemTransport {
    fn bytes_available(&mut self) -> bool {
        self.inbound.has_line()
    }

    fn read_line_into(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.inbound.pop_line_into(buf)
    }

    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.outbound.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_loopback() {
        let mut t = MemTransport::new();
        let mut buf = [0u8; 63];

        assert!(!t.bytes_available());
        t.push_input("stop");
        assert!(!t.bytes_available());
        t.push_input("\r\n");
        assert!(t.bytes_available());

        let n = t.read_line_into(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"stop\r");

        t.write_line("RET ok").unwrap();
        assert_eq!(t.output(), &[String::from("RET ok")]);
        assert_eq!(t.take_output().len(), 1);
        assert!(t.output().is_empty());
    }
}
