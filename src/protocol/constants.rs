use std::{
    fmt::{Display, Formatter},
    io::{self, Error, ErrorKind, Read, Write},
};

use crate::codec::{JdwpReadable, JdwpReader, JdwpWritable, JdwpWriter};
use crate::error::UnrecognizedDiscriminant;

macro_rules! jdwp_enum {
    (
        $(#[doc = $endoc:literal])*
        #[repr($repr:ident)]
        pub enum $e:ident {
            $($(#[doc = $string:literal])* $name:ident = $id:literal),*
            $(,)?
        }
    ) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        $(#[doc = $endoc])*
        #[repr($repr)]
        pub enum $e {
            $($(#[doc = $string])* $name = $id,)*
        }

        impl TryFrom<$repr> for $e {
            type Error = $repr;

            fn try_from(value: $repr) -> Result<Self, Self::Error> {
                match value {
                    $($id => Ok($e::$name),)*
                    other => Err(other),
                }
            }
        }

        impl JdwpReadable for $e {
            fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
                // An unrecognised discriminant is a recoverable request
                // error, not a codec fault; see `UnrecognizedDiscriminant`.
                Self::try_from($repr::read(read)?)
                    .map_err(|other| Error::new(ErrorKind::InvalidData, UnrecognizedDiscriminant(other as u16)))
            }
        }

        impl JdwpWritable for $e {
            fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
                (*self as $repr).write(write)
            }
        }
    };
    (
        $(#[doc = $endoc:literal])*
        #[derive(Display)]
        #[repr($repr:ident)]
        pub enum $e:ident {
            $(#[doc = $string:literal] $name:ident = $id:literal),*
            $(,)?
        }
    ) => {
        jdwp_enum! {
            $(#[doc = $endoc])*
            #[repr($repr)]
            pub enum $e {
                $(#[doc = $string] $name = $id,)*
            }
        }

        impl Display for $e {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $($e::$name => $string,)*
                })
            }
        }
    };
    (
        $(
            $(#[doc = $endoc:literal])*
            $(#[derive($display:ident)])?
            #[repr($repr:ident)]
            pub enum $e:ident {
                $($(#[doc = $string:literal])? $name:ident = $id:literal),*
                $(,)?
            }
        )*
    ) => {
        $(
            jdwp_enum! {
                $(#[doc = $endoc])*
                $(#[derive($display)])?
                #[repr($repr)]
                pub enum $e {
                    $($(#[doc = $string])? $name = $id,)*
                }
            }
        )*
    };
}

jdwp_enum! {
    #[derive(Display)]
    #[repr(u16)]
    pub enum ErrorCode {
        /// No error has occurred
        None = 0,
        /// Passed thread is null, is not a valid thread or has exited
        InvalidThread = 10,
        /// Thread group invalid
        InvalidThreadGroup = 11,
        /// Invalid priority
        InvalidPriority = 12,
        /// If the specified thread has not been suspended by an event
        ThreadNotSuspended = 13,
        /// Thread already suspended
        ThreadSuspended = 14,
        /// Thread has not been started or is now dead
        ThreadNotAlive = 15,
        /// If this reference type has been unloaded and garbage collected
        InvalidObject = 20,
        /// Invalid class
        InvalidClass = 21,
        /// Class has been loaded but not yet prepared
        ClassNotPrepared = 22,
        /// Invalid method
        InvalidMethodid = 23,
        /// Invalid location
        InvalidLocation = 24,
        /// Invalid field
        InvalidFieldid = 25,
        /// Invalid jframeID
        InvalidFrameid = 30,
        /// There are no more Java or JNI frames on the call stack
        NoMoreFrames = 31,
        /// Information about the frame is not available
        OpaqueFrame = 32,
        /// Operation can only be performed on current frame
        NotCurrentFrame = 33,
        /// The variable is not an appropriate type for the function used
        TypeMismatch = 34,
        /// Invalid slot
        InvalidSlot = 35,
        /// Item already set
        Duplicate = 40,
        /// Desired element not found
        NotFound = 41,
        /// Invalid monitor
        InvalidMonitor = 50,
        /// This thread doesn't own the monitor
        NotMonitorOwner = 51,
        /// The call has been interrupted before completion
        Interrupt = 52,
        /// The virtual machine attempted to read a class file and determined that the file is malformed or otherwise cannot be interpreted as a class file
        InvalidClassFormat = 60,
        /// A circularity has been detected while initializing a class
        CircularClassDefinition = 61,
        /// The verifier detected that a class file, though well formed, contained some sort of internal inconsistency or security problem
        FailsVerification = 62,
        /// Adding methods has not been implemented
        AddMethodNotImplemented = 63,
        /// Schema change has not been implemented
        SchemaChangeNotImplemented = 64,
        /// The state of the thread has been modified, and is now inconsistent
        InvalidTypestate = 65,
        /// A direct superclass is different for the new class version, or the set of directly implemented interfaces is different and canUnrestrictedlyRedefineClasses is false
        HierarchyChangeNotImplemented = 66,
        /// The new class version does not declare a method declared in the old class version and canUnrestrictedlyRedefineClasses is false
        DeleteMethodNotImplemented = 67,
        /// A class file has a version number not supported by this VM
        UnsupportedVersion = 68,
        /// The class name defined in the new class file is different from the name in the old class object
        NamesDontMatch = 69,
        /// The new class version has different modifiers and and canUnrestrictedlyRedefineClasses is false
        ClassModifiersChangeNotImplemented = 70,
        /// A method in the new class version has different modifiers than its counterpart in the old class version and and canUnrestrictedlyRedefineClasses is false
        MethodModifiersChangeNotImplemented = 71,
        /// The functionality is not implemented in this virtual machine
        NotImplemented = 99,
        /// Invalid pointer
        NullPointer = 100,
        /// Desired information is not available
        AbsentInformation = 101,
        /// The specified event type id is not recognized
        InvalidEventType = 102,
        /// Illegal argument
        IllegalArgument = 103,
        /// The function needed to allocate memory and no more memory was available for allocation
        OutOfMemory = 110,
        /// Debugging has not been enabled in this virtual machine. JVMTI cannot be used
        AccessDenied = 111,
        /// The virtual machine is not running
        VmDead = 112,
        /// An unexpected internal error has occurred
        Internal = 113,
        /// The thread being used to call this function is not attached to the virtual machine. Calls must be made from attached threads
        UnattachedThread = 115,
        /// object type id or class tag
        InvalidTag = 500,
        /// Previous invoke not complete
        AlreadyInvoking = 502,
        /// Index is invalid
        InvalidIndex = 503,
        /// The length is invalid
        InvalidLength = 504,
        /// The string is invalid
        InvalidString = 506,
        /// The class loader is invalid
        InvalidClassLoader = 507,
        /// The array is invalid
        InvalidArray = 508,
        /// Unable to load the transport
        TransportLoad = 509,
        /// Unable to initialize the transport
        TransportInit = 510,
        /// NATIVE_METHOD
        NativeMethod = 511,
        /// The count is invalid
        InvalidCount = 512,
    }

    /// The reference-type flavour tag carried by `Class`/`RefType` and by
    /// `Location`'s owning type.
    #[repr(u8)]
    pub enum TypeTag {
        Class = 1,
        Interface = 2,
        Array = 3,
    }

    #[repr(u8)]
    pub enum SuspendPolicy {
        None = 0,
        EventThread = 1,
        All = 2,
    }
}

/// The JDWP value tag byte: dispatches the [`crate::protocol::Value`]
/// decoder and, untagged, the slot-tag in `StackFrame.GetValues`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Array = b'[',
    Byte = b'B',
    Char = b'C',
    Object = b'L',
    Float = b'F',
    Double = b'D',
    Int = b'I',
    Long = b'J',
    Short = b'S',
    Void = b'V',
    Boolean = b'Z',
    String = b's',
    Thread = b't',
    ThreadGroup = b'g',
    ClassLoader = b'l',
    ClassObject = b'c',
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Tag::*;
        Ok(match value {
            b'[' => Array,
            b'B' => Byte,
            b'C' => Char,
            b'L' => Object,
            b'F' => Float,
            b'D' => Double,
            b'I' => Int,
            b'J' => Long,
            b'S' => Short,
            b'V' => Void,
            b'Z' => Boolean,
            b's' => String,
            b't' => Thread,
            b'g' => ThreadGroup,
            b'l' => ClassLoader,
            b'c' => ClassObject,
            other => return Err(other),
        })
    }
}

impl JdwpReadable for Tag {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        Tag::try_from(u8::read(read)?)
            .map_err(|other| Error::new(ErrorKind::InvalidData, UnrecognizedDiscriminant(other as u16)))
    }
}

impl JdwpWritable for Tag {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (*self as u8).write(write)
    }
}

/// `EventRequest.Set` modifier-kind tag. Only the two modifiers the core
/// installs are named here.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModifierKind {
    ClassOnly = 4,
    LocationOnly = 7,
}
