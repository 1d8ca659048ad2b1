use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Error, ErrorKind, Read, Write};

pub use jdwp_macros::{JdwpReadable, JdwpWritable};

/// Identifier widths negotiated with the remote VM via `VM.IDSizes`.
///
/// These are fixed for the lifetime of a [`crate::session::Session`] and are
/// threaded through every [`JdwpReader`]/[`JdwpWriter`] so that id-typed
/// fields can be read and written at the width the VM actually uses.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IdSizes {
    pub field_id_size: u32,
    pub method_id_size: u32,
    pub object_id_size: u32,
    pub reference_type_id_size: u32,
    pub frame_id_size: u32,
}

impl Default for IdSizes {
    /// Sizes are unknown until `VM.IDSizes` replies; 8 is the common case
    /// for reference JVMs and is a safe default before negotiation.
    fn default() -> Self {
        IdSizes {
            field_id_size: 8,
            method_id_size: 8,
            object_id_size: 8,
            reference_type_id_size: 8,
            frame_id_size: 8,
        }
    }
}

pub struct JdwpReader<R> {
    inner: R,
    pub id_sizes: IdSizes,
}

impl<R: Read> JdwpReader<R> {
    pub fn new(inner: R, id_sizes: IdSizes) -> Self {
        JdwpReader { inner, id_sizes }
    }

    pub fn read_id(&mut self, size: u32) -> io::Result<u64> {
        match size {
            4 => self.inner.read_u32::<BigEndian>().map(u64::from),
            8 => self.inner.read_u64::<BigEndian>(),
            n => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("unsupported id width {n}"),
            )),
        }
    }
}

impl<R: Read> Read for JdwpReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

pub struct JdwpWriter<W> {
    inner: W,
    pub id_sizes: IdSizes,
}

impl<W: Write> JdwpWriter<W> {
    pub fn new(inner: W, id_sizes: IdSizes) -> Self {
        JdwpWriter { inner, id_sizes }
    }

    pub fn write_id(&mut self, value: u64, size: u32) -> io::Result<()> {
        match size {
            4 => self.inner.write_u32::<BigEndian>(value as u32),
            8 => self.inner.write_u64::<BigEndian>(value),
            n => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("unsupported id width {n}"),
            )),
        }
    }
}

impl<W: Write> Write for JdwpWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

pub trait JdwpReadable: Sized {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self>;
}

pub trait JdwpWritable {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()>;
}

impl JdwpReadable for () {
    #[inline]
    fn read<R: Read>(_: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok(())
    }
}

impl JdwpWritable for () {
    #[inline]
    fn write<W: Write>(&self, _: &mut JdwpWriter<W>) -> io::Result<()> {
        Ok(())
    }
}

impl JdwpReadable for bool {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u8().map(|n| n != 0)
    }
}

impl JdwpWritable for bool {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u8(if *self { 1 } else { 0 })
    }
}

impl JdwpReadable for u8 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u8()
    }
}

impl JdwpWritable for u8 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u8(*self)
    }
}

impl JdwpReadable for i16 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_i16::<BigEndian>()
    }
}

impl JdwpWritable for i16 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_i16::<BigEndian>(*self)
    }
}

impl JdwpReadable for u16 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u16::<BigEndian>()
    }
}

impl JdwpWritable for u16 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u16::<BigEndian>(*self)
    }
}

impl JdwpReadable for i32 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_i32::<BigEndian>()
    }
}

impl JdwpWritable for i32 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_i32::<BigEndian>(*self)
    }
}

impl JdwpReadable for u32 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u32::<BigEndian>()
    }
}

impl JdwpWritable for u32 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u32::<BigEndian>(*self)
    }
}

impl JdwpReadable for i64 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_i64::<BigEndian>()
    }
}

impl JdwpWritable for i64 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_i64::<BigEndian>(*self)
    }
}

impl JdwpReadable for u64 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u64::<BigEndian>()
    }
}

impl JdwpWritable for u64 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u64::<BigEndian>(*self)
    }
}

impl JdwpReadable for f32 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_f32::<BigEndian>()
    }
}

impl JdwpWritable for f32 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_f32::<BigEndian>(*self)
    }
}

impl JdwpReadable for f64 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_f64::<BigEndian>()
    }
}

impl JdwpWritable for f64 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_f64::<BigEndian>(*self)
    }
}

/// JDWP strings are length-prefixed modified-UTF-8 (CESU-8). Malformed bytes
/// are a codec fault, not a panic.
impl JdwpReadable for String {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        let mut bytes = vec![0; u32::read(read)? as usize];
        read.read_exact(&mut bytes)?;
        cesu8::from_java_cesu8(&bytes)
            .map(|s| s.into_owned())
            .map_err(|_| Error::from(ErrorKind::InvalidData))
    }
}

impl JdwpWritable for String {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        let bytes = cesu8::to_java_cesu8(self);
        (bytes.len() as u32).write(write)?;
        write.write_all(&bytes)
    }
}

impl<T: JdwpReadable> JdwpReadable for Vec<T> {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        let len = u32::read(read)?;
        let mut res = Vec::with_capacity(len as usize);
        for _ in 0..len {
            res.push(T::read(read)?);
        }
        Ok(res)
    }
}

impl<T: JdwpWritable> JdwpWritable for Vec<T> {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (self.len() as u32).write(write)?;
        for item in self {
            item.write(write)?;
        }
        Ok(())
    }
}

/// A slice writes the same way `Vec<T>` does: a 4-byte count followed by
/// each element. Used by commands (e.g. `EventRequest.Set`'s modifiers)
/// that borrow rather than own their payload.
impl<T: JdwpWritable> JdwpWritable for &[T] {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (self.len() as u32).write(write)?;
        for item in self.iter() {
            item.write(write)?;
        }
        Ok(())
    }
}

impl<A: JdwpReadable, B: JdwpReadable> JdwpReadable for (A, B) {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok((A::read(read)?, B::read(read)?))
    }
}

impl<A: JdwpWritable, B: JdwpWritable> JdwpWritable for (A, B) {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.0.write(write)?;
        self.1.write(write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: JdwpWritable + JdwpReadable + PartialEq + std::fmt::Debug>(value: T) {
        let mut buf = Vec::new();
        value.write(&mut JdwpWriter::new(&mut buf, IdSizes::default())).unwrap();
        let decoded = T::read(&mut JdwpReader::new(buf.as_slice(), IdSizes::default())).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn primitives_roundtrip() {
        roundtrip(true);
        roundtrip(false);
        roundtrip(0u8);
        roundtrip(255u8);
        roundtrip(-1i16);
        roundtrip(12345u16);
        roundtrip(i32::MIN);
        roundtrip(u32::MAX);
        roundtrip(i64::MIN);
        roundtrip(u64::MAX);
        roundtrip(1.5f32);
        roundtrip(-2.25f64);
    }

    #[test]
    fn string_roundtrips_as_cesu8() {
        roundtrip("hello, jdwp".to_owned());
        roundtrip(String::new());
        // U+1F600, outside the BMP: CESU-8 encodes it as a surrogate pair,
        // unlike standard UTF-8.
        roundtrip("\u{1F600}".to_owned());
    }

    #[test]
    fn string_rejects_malformed_bytes() {
        let malformed = [0xff, 0xff, 0xff, 0xff];
        let mut buf = Vec::new();
        (malformed.len() as u32).write(&mut JdwpWriter::new(&mut buf, IdSizes::default())).unwrap();
        buf.extend_from_slice(&malformed);
        let err = String::read(&mut JdwpReader::new(buf.as_slice(), IdSizes::default())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn vec_roundtrips_empty_and_populated() {
        roundtrip(Vec::<i32>::new());
        roundtrip(vec![1i32, 2, 3, -4]);
        roundtrip(vec!["a".to_owned(), "b".to_owned()]);
    }
}
