//! Splits a byte stream into CRLF-terminated protocol lines, buffering any
//! partial line across reads.

use crate::constants::MAX_LINE_BUFFER;

/// How a [`LineFramer::push`] call failed. The two cases get different
/// treatment from the caller: a decode error is a skip-and-continue, an
/// overflow is fatal to the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The chunk was not valid UTF-8. The buffer is left untouched; the
    /// caller should log a warning and keep reading on the next chunk.
    Decode,
    /// The buffered partial line exceeded [`MAX_LINE_BUFFER`] without a
    /// terminator. The caller should close the connection.
    Overflow,
}

/// Accumulates bytes from successive socket reads and yields complete lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        LineFramer { buf: Vec::new() }
    }

    /// Feeds a freshly-read chunk into the buffer and returns every complete
    /// line it can now extract, in order. A trailing partial line (no CRLF
    /// yet) is retained for the next call. Empty lines are dropped. A chunk
    /// that does not decode as UTF-8 is skipped (`Err(FrameError::Decode)`)
    /// so the caller can log it and keep reading on the next chunk; the
    /// buffer is left untouched by the bad chunk in that case.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, FrameError> {
        if std::str::from_utf8(chunk).is_err() {
            return Err(FrameError::Decode);
        }

        self.buf.extend_from_slice(chunk);
        if self.buf.len() > MAX_LINE_BUFFER && !self.buf.windows(2).any(|w| w == b"\r\n") {
            return Err(FrameError::Overflow);
        }

        let mut lines = Vec::new();
        loop {
            let Some(pos) = find_crlf(&self.buf) else {
                break;
            };
            let line_bytes: Vec<u8> = self.buf.drain(..pos + 2).collect();
            let line = &line_bytes[..line_bytes.len() - 2];
            let line = match std::str::from_utf8(line) {
                Ok(s) => s.trim(),
                Err(_) => continue,
            };
            if !line.is_empty() {
                lines.push(line.to_owned());
            }
        }
        Ok(lines)
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_single_chunk() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"NICK alice\r\n").unwrap();
        assert_eq!(lines, vec!["NICK alice"]);
    }

    #[test]
    fn partial_line_across_two_reads() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"NICK al").unwrap().is_empty());
        let lines = framer.push(b"ice\r\n").unwrap();
        assert_eq!(lines, vec!["NICK alice"]);
    }

    #[test]
    fn multiple_lines_one_chunk() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"NICK alice\r\nUSER a 0 * :A\r\n").unwrap();
        assert_eq!(lines, vec!["NICK alice", "USER a 0 * :A"]);
    }

    #[test]
    fn empty_lines_are_ignored() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"\r\nNICK alice\r\n\r\n").unwrap();
        assert_eq!(lines, vec!["NICK alice"]);
    }

    #[test]
    fn arbitrary_rechunking_preserves_order() {
        let whole = b"NICK alice\r\nJOIN #t\r\nPRIVMSG #t :hi\r\n";
        for split in 1..whole.len() {
            let mut framer = LineFramer::new();
            let mut out = framer.push(&whole[..split]).unwrap();
            out.extend(framer.push(&whole[split..]).unwrap());
            assert_eq!(out, vec!["NICK alice", "JOIN #t", "PRIVMSG #t :hi"]);
        }
    }

    #[test]
    fn overflow_without_terminator_errors() {
        let mut framer = LineFramer::new();
        let garbage = vec![b'x'; MAX_LINE_BUFFER + 1];
        assert_eq!(framer.push(&garbage), Err(FrameError::Overflow));
    }

    #[test]
    fn non_utf8_chunk_is_a_decode_error_not_overflow() {
        let mut framer = LineFramer::new();
        let invalid = [0x4E, 0x49, 0xFF, 0xFE];
        assert_eq!(framer.push(&invalid), Err(FrameError::Decode));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"  NICK alice  \r\n").unwrap();
        assert_eq!(lines, vec!["NICK alice"]);
    }
}
