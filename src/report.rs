use std::io::Write;

/// Sink for per-instance textual reports.
///
/// Passed explicitly into each computation instead of living in
/// process-wide state; a batch driver can hand every case its own sink.
pub trait Sink {
    fn line(&mut self, text: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn line(&mut self, _text: &str) {}
}

/// Writes one line per call to the wrapped writer. Reports are diagnostic
/// output, so write errors are ignored rather than aborting a solve.
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    out: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for WriteSink<W> {
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sink_captures_lines() {
        let mut sink = WriteSink::new(Vec::new());
        sink.line("first");
        sink.line("second");

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "first\nsecond\n");
    }

    #[test]
    fn test_null_sink_is_silent() {
        let mut sink = NullSink;
        sink.line("dropped");
    }
}
