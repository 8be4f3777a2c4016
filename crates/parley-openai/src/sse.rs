//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary slices; an event is complete once a blank line
//! (`\n\n` or `\r\n\r\n`) has been seen. Only `data:` fields matter for the
//! completion endpoints. Multiple `data:` lines of one event are joined with
//! `\n`, comment lines (`:`) and other fields are ignored. Events whose
//! data ends up empty are not dispatched.
use std::str::Utf8Error;

#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    /// Feed a chunk of the body and return the data payloads of all events
    /// completed by it.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, Utf8Error> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some((end, delimiter)) = frame_end(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..end + delimiter).collect();
            if let Some(data) = parse_frame(std::str::from_utf8(&frame[..end])?) {
                events.push(data);
            }
        }

        Ok(events)
    }

    /// Flush a trailing event the server did not terminate with a blank
    /// line before closing the connection.
    pub(crate) fn finish(&mut self) -> Result<Option<String>, Utf8Error> {
        let frame = std::mem::take(&mut self.buf);
        Ok(parse_frame(std::str::from_utf8(&frame)?))
    }
}

fn frame_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|pos| (pos, 2));
    let crlf = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (pos, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_frame(frame: &str) -> Option<String> {
    let mut data: Option<String> = None;

    for line in frame.lines() {
        let Some(value) = line.strip_prefix("data:") else {
            continue;
        };
        let value = value.strip_prefix(' ').unwrap_or(value);

        match data.as_mut() {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(value);
            }
            None => data = Some(value.to_owned()),
        }
    }

    data.filter(|data| !data.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_split_across_chunks() {
        let mut decoder = SseDecoder::default();

        assert!(decoder.push(b"data: {\"a\"").unwrap().is_empty());
        assert_eq!(decoder.push(b":1}\n\ndata: [DO").unwrap(), vec![r#"{"a":1}"#]);
        assert_eq!(decoder.push(b"NE]\n\n").unwrap(), vec!["[DONE]"]);
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn crlf_delimiters_and_comments() {
        let mut decoder = SseDecoder::default();
        let events = decoder
            .push(b": keep-alive\r\n\r\ndata: one\r\n\r\nevent: x\r\ndata: two\r\n\r\n")
            .unwrap();

        assert_eq!(events, vec!["one", "two"]);
    }

    #[test]
    fn multi_line_data_is_joined() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b"data: a\ndata: b\n\n").unwrap();
        assert_eq!(events, vec!["a\nb"]);
    }

    #[test]
    fn empty_data_is_not_dispatched() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b"data:\n\ndata: \n\ndata: [DONE]\n\n").unwrap();
        assert_eq!(events, vec!["[DONE]"]);

        assert!(decoder.push(b"data:").unwrap().is_empty());
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn unterminated_trailing_event_is_flushed() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: tail").unwrap().is_empty());
        assert_eq!(decoder.finish().unwrap().as_deref(), Some("tail"));
    }
}
