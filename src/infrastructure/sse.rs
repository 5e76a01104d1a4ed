// Incremental text/event-stream decoder
use bytes::BytesMut;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Feeds arbitrary byte chunks and yields complete events. Lines split
/// across chunks (including split UTF-8 sequences) are buffered.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: BytesMut,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line = self.buffer.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }
            let text = String::from_utf8_lossy(&line[..]).into_owned();
            if let Some(event) = self.process_line(&text) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_event() {
        let mut parser = SseParser::default();
        let events = parser.feed(b"event: put\ndata: {\"path\":\"/\",\"data\":1}\n\n");

        assert_eq!(
            events,
            vec![SseEvent {
                event: "put".to_string(),
                data: "{\"path\":\"/\",\"data\":1}".to_string(),
            }]
        );
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut parser = SseParser::default();
        assert!(parser.feed(b"event: pa").is_empty());
        assert!(parser.feed(b"tch\r\ndata: {}\r\n").is_empty());
        let events = parser.feed(b"\r\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "patch");
        assert_eq!(events[0].data, "{}");
    }

    #[test]
    fn test_multibyte_split_is_preserved() {
        let mut parser = SseParser::default();
        let payload = "data: 25°C\n\n".as_bytes();
        let (head, tail) = payload.split_at(9);

        assert!(parser.feed(head).is_empty());
        let events = parser.feed(tail);
        assert_eq!(events[0].data, "25°C");
        assert_eq!(events[0].event, "message");
    }

    #[test]
    fn test_comments_and_multiline_data() {
        let mut parser = SseParser::default();
        let events = parser.feed(b": ping\nevent: keep-alive\ndata: a\ndata: b\n\nevent: x\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "keep-alive");
        assert_eq!(events[0].data, "a\nb");
    }
}
