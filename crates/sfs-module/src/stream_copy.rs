//! Stream copier.
//!
//! Relays exactly `declared_len` bytes from a source to a destination in
//! fixed-size chunks, reusing one buffer for the whole copy. A read may
//! return fewer bytes than asked for; the loop keeps going until the
//! declared length is reached. Bytes are never transformed.

use crate::chunk_buffers::ChunkBuffers;
use sfs_core::error::CopyError;

use std::io::{self, Read, Write};

/// Copy exactly `declared_len` bytes from `source` to `dest` through `buf`.
///
/// Returns the number of bytes copied (always `declared_len` on success).
/// A source that reaches end-of-file early fails with
/// `CopyError::Truncated` instead of looping forever.
pub fn copy_exact<R, W>(
    source: &mut R,
    declared_len: u64,
    dest: &mut W,
    buf: &mut [u8],
) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if buf.is_empty() && declared_len > 0 {
        return Err(CopyError::Read(io::Error::new(
            io::ErrorKind::InvalidInput,
            "copy buffer is empty",
        )));
    }

    let mut copied: u64 = 0;
    while copied < declared_len {
        let want = (declared_len - copied).min(buf.len() as u64) as usize;
        let n = match source.read(&mut buf[..want]) {
            Ok(0) => {
                return Err(CopyError::Truncated {
                    expected: declared_len,
                    copied,
                })
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        dest.write_all(&buf[..n]).map_err(CopyError::Write)?;
        copied += n as u64;
    }
    Ok(copied)
}

/// Copies with buffers drawn from a shared `ChunkBuffers` pool.
pub struct StreamCopier {
    buffers: ChunkBuffers,
}

impl StreamCopier {
    pub fn new(buffers: ChunkBuffers) -> Self {
        Self { buffers }
    }

    /// `chunk_size` bytes per read, buffers kept for `workers` copies.
    pub fn with_chunk_size(chunk_size: usize, workers: usize) -> Self {
        Self::new(ChunkBuffers::new(chunk_size, workers))
    }

    pub fn copy<R, W>(&self, source: &mut R, declared_len: u64, dest: &mut W) -> Result<u64, CopyError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut buf = self.buffers.acquire();
        copy_exact(source, declared_len, dest, &mut buf)
    }

    pub fn buffers(&self) -> &ChunkBuffers {
        &self.buffers
    }
}

impl Default for StreamCopier {
    fn default() -> Self {
        Self::new(ChunkBuffers::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields reads of pseudo-random sizes in `1..=max`.
    struct ChunkyReader<'a> {
        data: &'a [u8],
        pos: usize,
        state: u64,
        max: usize,
    }

    impl<'a> ChunkyReader<'a> {
        fn new(data: &'a [u8], seed: u64, max: usize) -> Self {
            Self { data, pos: 0, state: seed | 1, max }
        }

        fn next_len(&mut self) -> usize {
            // xorshift64
            self.state ^= self.state << 13;
            self.state ^= self.state >> 7;
            self.state ^= self.state << 17;
            (self.state % self.max as u64) as usize + 1
        }
    }

    impl Read for ChunkyReader<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let n = self.next_len().min(out.len()).min(self.data.len() - self.pos);
            out[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Fails every other read with `Interrupted`.
    struct InterruptingReader<'a> {
        inner: &'a [u8],
        flip: bool,
    }

    impl Read for InterruptingReader<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            self.flip = !self.flip;
            if self.flip {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.inner.read(out)
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[test]
    fn test_sizes_around_buffer_boundary() {
        let mut buf = [0u8; 64];
        for len in [0usize, 1, 63, 64, 65, 64 * 10 + 3] {
            let data = pattern(len);
            let mut out = Vec::new();
            let n = copy_exact(&mut data.as_slice(), len as u64, &mut out, &mut buf).unwrap();
            assert_eq!(n, len as u64);
            assert_eq!(out, data);
        }
    }

    #[test]
    fn test_short_reads_copy_exact_length() {
        let data = pattern(50_000);
        for seed in 1..20u64 {
            let mut buf = [0u8; 1000];
            let mut src = ChunkyReader::new(&data, seed, buf.len());
            let mut out = Vec::new();
            let n = copy_exact(&mut src, data.len() as u64, &mut out, &mut buf).unwrap();
            assert_eq!(n, data.len() as u64);
            assert_eq!(out, data, "seed {}", seed);
        }
    }

    #[test]
    fn test_stops_at_declared_length() {
        let data = pattern(100);
        let mut out = Vec::new();
        let mut buf = [0u8; 16];
        copy_exact(&mut data.as_slice(), 40, &mut out, &mut buf).unwrap();
        assert_eq!(out, &data[..40]);
    }

    #[test]
    fn test_truncated_source_is_an_error() {
        let data = pattern(10);
        let mut buf = [0u8; 4];
        let err = copy_exact(&mut data.as_slice(), 25, &mut Vec::new(), &mut buf).unwrap_err();
        assert!(matches!(err, CopyError::Truncated { expected: 25, copied: 10 }));
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let data = pattern(300);
        let mut src = InterruptingReader { inner: &data, flip: false };
        let mut out = Vec::new();
        let mut buf = [0u8; 32];
        copy_exact(&mut src, 300, &mut out, &mut buf).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_write_failure_is_write_side() {
        let data = pattern(10);
        let mut buf = [0u8; 4];
        let err = copy_exact(&mut data.as_slice(), 10, &mut BrokenPipe, &mut buf).unwrap_err();
        assert!(matches!(err, CopyError::Write(_)));
    }

    #[test]
    fn test_copier_returns_buffer_to_pool() {
        let copier = StreamCopier::with_chunk_size(8, 2);
        let data = pattern(100);
        let mut out = Vec::new();
        copier.copy(&mut data.as_slice(), 100, &mut out).unwrap();
        copier.copy(&mut data.as_slice(), 100, &mut Vec::new()).unwrap();
        assert_eq!(out, data);
        assert_eq!(copier.buffers().in_use(), 0);
        assert_eq!(copier.buffers().allocated(), 1);
    }
}
