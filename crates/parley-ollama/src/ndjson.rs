//! Line splitter for newline-delimited JSON bodies.
use std::str::Utf8Error;

#[derive(Debug, Default)]
pub(crate) struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    /// Feed a chunk and return every complete, non-blank line it finished.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, Utf8Error> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = std::str::from_utf8(&line)?.trim();
            if !line.is_empty() {
                lines.push(line.to_owned());
            }
        }

        Ok(lines)
    }

    /// Whatever is left once the body ended without a final newline.
    pub(crate) fn finish(&mut self) -> Result<Option<String>, Utf8Error> {
        let rest = std::mem::take(&mut self.buf);
        let rest = std::str::from_utf8(&rest)?.trim();
        Ok((!rest.is_empty()).then(|| rest.to_owned()))
    }
}
