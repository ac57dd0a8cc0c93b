use std::io::Write;

/// A byte sink that tracks its write position.
///
/// Cross-reference data is built from the byte offsets of the objects
/// already emitted, so every write path goes through one of these and
/// the current position is always a plain field read. I/O failures from
/// the underlying writer propagate unchanged.
#[derive(Debug)]
pub struct Sink<W> {
    inner: W,
    written: u64,
}

impl<W: Write> Sink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Writes all of `data`, returning the number of bytes emitted.
    pub fn write_bytes(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.inner.write_all(data)?;
        self.written += data.len() as u64;

        Ok(data.len())
    }

    /// Total bytes written so far: the offset the next write lands at.
    pub fn position(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_tracks_writes() {
        let mut sink = Sink::new(Vec::new());

        assert_eq!(sink.position(), 0);
        assert_eq!(sink.write_bytes(b"%PDF-1.7").unwrap(), 8);
        assert_eq!(sink.position(), 8);
        sink.write_bytes(b"\r\n").unwrap();
        assert_eq!(sink.position(), 10);

        assert_eq!(sink.into_inner(), b"%PDF-1.7\r\n");
    }
}
