use std::io::{self, Read, Write};

use crate::codec::{JdwpReadable, JdwpReader, JdwpWritable, JdwpWriter};

/// An identifier whose wire width is one of the session-negotiated
/// [`IdSizes`] fields rather than a fixed Rust integer width.
pub trait JdwpId: Copy {
    fn from_raw(raw: u64) -> Self;
    fn raw(&self) -> u64;
}

macro_rules! ids {
    ($($name:ident => $field:ident),* $(,)?) => {
        $(
            #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
            pub struct $name(u64);

            impl JdwpId for $name {
                fn from_raw(raw: u64) -> Self {
                    $name(raw)
                }

                fn raw(&self) -> u64 {
                    self.0
                }
            }

            impl JdwpReadable for $name {
                fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
                    let size = read.id_sizes.$field;
                    read.read_id(size).map($name)
                }
            }

            impl JdwpWritable for $name {
                fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
                    let size = write.id_sizes.$field;
                    write.write_id(self.0, size)
                }
            }
        )*
    };
}

ids! {
    ObjectID => object_id_size,
    ReferenceTypeID => reference_type_id_size,
    MethodID => method_id_size,
    FrameID => frame_id_size,
}

/// Thread ids share the object-id width but are a distinct JDWP id kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ThreadID(ObjectID);

impl JdwpId for ThreadID {
    fn from_raw(raw: u64) -> Self {
        ThreadID(ObjectID::from_raw(raw))
    }

    fn raw(&self) -> u64 {
        self.0.raw()
    }
}

impl JdwpReadable for ThreadID {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        ObjectID::read(read).map(ThreadID)
    }
}

impl JdwpWritable for ThreadID {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.0.write(write)
    }
}

impl From<ThreadID> for ObjectID {
    fn from(tid: ThreadID) -> Self {
        tid.0
    }
}

/// The id the VM assigns an installed event request; fixed 4-byte width,
/// unlike the other ids above.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RequestID(i32);

impl RequestID {
    pub const fn new(raw: i32) -> Self {
        RequestID(raw)
    }
}

impl JdwpReadable for RequestID {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        i32::read(read).map(RequestID)
    }
}

impl JdwpWritable for RequestID {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.0.write(write)
    }
}
