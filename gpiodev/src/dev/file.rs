//! An open session on an endpoint.
//!
//! [File] is what the platform's I/O dispatch holds between open and close.
//! It checks the endpoint's [FileCaps] before every call and gives the
//! session token back when dropped.

use crate::{
    dev::{
        chrdev::DevNum,
        endpoint::{Endpoint, FileCaps},
        handle::Handle,
        io_buffer::{IoBufferReader, IoBufferWriter, SliceReader, SliceWriter},
        session::SessionToken,
    },
    error::{Error, Result},
};

pub struct File {
    endpoint: Handle<Endpoint>,
    dev: DevNum,
    pos: u64,
    token: Option<SessionToken>,
}

impl File {
    pub fn open(endpoint: Handle<Endpoint>, dev: DevNum) -> Result<File> {
        if !endpoint.caps().contains(FileCaps::OPEN) {
            return Err(Error::NotSupported);
        }
        let token = endpoint.open(dev)?;
        Ok(File {
            endpoint,
            dev,
            pos: 0,
            token: Some(token),
        })
    }

    pub fn dev(&self) -> DevNum {
        self.dev
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Move the offset to `pos` (absolute), returning the new offset.
    pub fn seek(&mut self, pos: u64) -> u64 {
        self.pos = pos;
        self.pos
    }

    pub fn read(&mut self, writer: &mut impl IoBufferWriter) -> Result<usize> {
        if !self.endpoint.caps().contains(FileCaps::READ) {
            return Err(Error::NotSupported);
        }
        self.endpoint.read(&mut self.pos, writer)
    }

    pub fn write(&mut self, reader: &mut impl IoBufferReader) -> Result<usize> {
        if !self.endpoint.caps().contains(FileCaps::WRITE) {
            return Err(Error::NotSupported);
        }
        self.endpoint.write(reader)
    }

    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.read(&mut SliceWriter::new(buf))
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        self.write(&mut SliceReader::new(data))
    }

    pub fn close(self) {}
}

impl Drop for File {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.endpoint.release(token);
        }
    }
}
