// Licensed under the Apache-2.0 license

//! Bounds-checked iteration over a buffer of concatenated TLV objects.

use crate::error::{PersoTlvError, PersoTlvResult};
use crate::header::{ObjectHeader, OBJECT_HEADER_SIZE};
use core::iter::FusedIterator;

/// One object yielded by [`ObjectWalker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersoObject<'a> {
    /// Offset of the object header within the walked buffer.
    pub offset: usize,
    pub header: ObjectHeader,
    /// The whole object, header included.
    pub bytes: &'a [u8],
}

impl<'a> PersoObject<'a> {
    /// Object bytes following the header.
    pub fn body(&self) -> &'a [u8] {
        &self.bytes[OBJECT_HEADER_SIZE..]
    }
}

/// Lazily walks `buf` as a sequence of objects.
///
/// Each step checks that a full header is available and that the declared
/// object size fits in what remains, before any object byte is handed out.
/// After the first error the walker is exhausted. Cloning a walker restarts
/// from the clone point.
#[derive(Debug, Clone)]
pub struct ObjectWalker<'a> {
    buf: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> ObjectWalker<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ObjectWalker {
            buf,
            offset: 0,
            done: false,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn fail(&mut self, err: PersoTlvError) -> Option<PersoTlvResult<PersoObject<'a>>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<'a> Iterator for ObjectWalker<'a> {
    type Item = PersoTlvResult<PersoObject<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let remaining = self.buf.len() - self.offset;
        if remaining == 0 {
            self.done = true;
            return None;
        }

        let Some(header) = ObjectHeader::read_from(&self.buf[self.offset..]) else {
            log::error!(
                "{} trailing bytes at offset {} cannot hold an object header",
                remaining,
                self.offset
            );
            return self.fail(PersoTlvError::TruncatedHeader);
        };

        // A size below the header size would never advance past the header.
        let declared = header.size as usize;
        if declared < OBJECT_HEADER_SIZE || declared > remaining {
            log::error!(
                "object at offset {} declares size {}, {} bytes remaining",
                self.offset,
                declared,
                remaining
            );
            return self.fail(PersoTlvError::ObjectOverflow {
                declared,
                remaining,
            });
        }

        let object = PersoObject {
            offset: self.offset,
            header,
            bytes: &self.buf[self.offset..self.offset + declared],
        };
        self.offset += declared;
        Some(Ok(object))
    }
}

impl FusedIterator for ObjectWalker<'_> {}

/// Walks the first `length` bytes of `buf`.
pub fn walk(buf: &[u8], length: usize) -> PersoTlvResult<ObjectWalker<'_>> {
    if length > buf.len() {
        return Err(PersoTlvError::BlobTooLarge {
            got: length,
            max: buf.len(),
        });
    }
    Ok(ObjectWalker::new(&buf[..length]))
}
