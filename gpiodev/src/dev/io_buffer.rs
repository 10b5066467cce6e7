//! Caller-supplied buffers used in read and write calls.
//!
//! A copy can fail part-way (the caller's memory is not ours); both traits
//! report that as [Error::IoFault].

use crate::error::{Error, Result};

/// Buffer the caller hands to a write call.
pub trait IoBufferReader {
    /// Bytes left to be read. Reading fewer may still fail.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `out` completely, or fail with [Error::IoFault].
    fn read_slice(&mut self, out: &mut [u8]) -> Result<()>;
}

/// Buffer the caller hands to a read call.
pub trait IoBufferWriter {
    /// Room left in the buffer.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy all of `data`, or fail with [Error::IoFault] if it does not fit
    /// or the memory is not writable.
    fn write_slice(&mut self, data: &[u8]) -> Result<()>;
}

pub struct SliceReader<'a> {
    data: &'a [u8],
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> SliceReader<'a> {
        SliceReader { data }
    }
}

impl IoBufferReader for SliceReader<'_> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn read_slice(&mut self, out: &mut [u8]) -> Result<()> {
        if out.len() > self.data.len() {
            return Err(Error::IoFault);
        }
        let (head, rest) = self.data.split_at(out.len());
        out.copy_from_slice(head);
        self.data = rest;
        Ok(())
    }
}

pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> SliceWriter<'a> {
        SliceWriter { buf, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl IoBufferWriter for SliceWriter<'_> {
    fn len(&self) -> usize {
        self.buf.len() - self.written
    }

    fn write_slice(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.len() {
            return Err(Error::IoFault);
        }
        self.buf[self.written..self.written + data.len()].copy_from_slice(data);
        self.written += data.len();
        Ok(())
    }
}
