/// Reassembles server-sent-event frames from arbitrary byte chunks.
///
/// Bytes are buffered raw and only decoded once a full frame is present, so a
/// multi-byte character split across two network chunks survives intact.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.buffer
            .extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));
    }

    pub fn next_event_block(&mut self) -> Option<String> {
        let boundary = self.buffer.windows(2).position(|pair| pair == b"\n\n")?;
        let remaining = self.buffer.split_off(boundary + 2);
        let frame = std::mem::replace(&mut self.buffer, remaining);
        Some(String::from_utf8_lossy(&frame).into_owned())
    }

    /// Whatever is left once the transport closes; servers may omit the
    /// trailing blank line on the final frame.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return None;
        }
        let frame = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&frame).into_owned())
    }
}

/// Joins the `data:` lines of one frame. Multi-line data is joined with `\n`
/// as the SSE format requires; comment and `event:` lines are dropped.
pub fn frame_data(event_block: &str) -> Option<String> {
    let lines: Vec<&str> = event_block
        .lines()
        .filter_map(|line| {
            line.strip_prefix("data:")
                .map(|data| data.strip_prefix(' ').unwrap_or(data))
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
