use std::io::{self, Read, Write};

use crate::ledger::{DigestHandle, HashLedger};

/// Reader that feeds every byte it yields into a ledger digest.
pub struct HashingReader<'a, R> {
    inner: R,
    ledger: &'a mut HashLedger,
    handle: DigestHandle,
}

impl<'a, R: Read> HashingReader<'a, R> {
    pub fn new(inner: R, ledger: &'a mut HashLedger, handle: DigestHandle) -> Self {
        Self {
            inner,
            ledger,
            handle,
        }
    }
}

impl<R: Read> Read for HashingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.ledger.feed(self.handle, &buf[..n]);
        Ok(n)
    }
}

/// Writer that feeds every byte the inner writer accepts into a ledger digest.
///
/// Only the bytes the inner writer reports as written are hashed, so a short
/// write never hashes a byte twice.
pub struct HashingWriter<'a, W> {
    inner: W,
    ledger: &'a mut HashLedger,
    handle: DigestHandle,
}

impl<'a, W: Write> HashingWriter<'a, W> {
    pub fn new(inner: W, ledger: &'a mut HashLedger, handle: DigestHandle) -> Self {
        Self {
            inner,
            ledger,
            handle,
        }
    }
}

impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.ledger.feed(self.handle, &buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
