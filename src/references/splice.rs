use std::io::{self, Read};

const CHUNK_SIZE: usize = 8 * 1024;

/// Streaming replacement of every occurrence of a marker.
///
/// Wraps a reader and yields its bytes with `needle` replaced by `replacement`, including
/// occurrences that straddle the inner reader's chunk boundaries. Up to
/// `needle.len() - 1` bytes are held back until the next chunk shows whether they start
/// a match.
pub struct SpliceReader<R> {
  inner: R,
  needle: Vec<u8>,
  replacement: Vec<u8>,
  pending: Vec<u8>,
  ready: Vec<u8>,
  offset: usize,
  finished: bool,
}

impl<R: Read> SpliceReader<R> {
  /// Wrap `inner`, replacing `needle` with `replacement`.
  pub fn new(inner: R, needle: impl Into<Vec<u8>>, replacement: impl Into<Vec<u8>>) -> Self {
    Self {
      inner,
      needle: needle.into(),
      replacement: replacement.into(),
      pending: Vec::new(),
      ready: Vec::new(),
      offset: 0,
      finished: false,
    }
  }

  fn fill(&mut self) -> io::Result<()> {
    let mut chunk = [0u8; CHUNK_SIZE];
    let read = loop {
      match self.inner.read(&mut chunk) {
        Ok(read) => break read,
        Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
        Err(err) => return Err(err),
      }
    };

    if read == 0 {
      self.finished = true;
      self.ready.append(&mut self.pending);
      return Ok(());
    }

    self.pending.extend_from_slice(&chunk[..read]);

    let mut cursor = 0;
    while let Some(found) = find(&self.pending[cursor..], &self.needle) {
      self.ready.extend_from_slice(&self.pending[cursor..cursor + found]);
      self.ready.extend_from_slice(&self.replacement);
      cursor += found + self.needle.len();
    }

    let held = self
      .needle
      .len()
      .saturating_sub(1)
      .min(self.pending.len() - cursor);
    let flush_to = self.pending.len() - held;
    self.ready.extend_from_slice(&self.pending[cursor..flush_to]);
    self.pending.drain(..flush_to);

    Ok(())
  }
}

impl<R: Read> Read for SpliceReader<R> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    if buf.is_empty() {
      return Ok(0);
    }

    while self.offset == self.ready.len() {
      if self.finished {
        return Ok(0);
      }
      self.ready.clear();
      self.offset = 0;
      self.fill()?;
    }

    let available = &self.ready[self.offset..];
    let count = available.len().min(buf.len());
    buf[..count].copy_from_slice(&available[..count]);
    self.offset += count;
    Ok(count)
  }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.is_empty() || haystack.len() < needle.len() {
    return None;
  }
  haystack
    .windows(needle.len())
    .position(|window| window == needle)
}
