//! Wire-level types: the packet header, identifier newtypes, value model and
//! the command structs the core dispatches.

use std::fmt::{self, Display};

use crate::codec::{JdwpReadable, JdwpWritable};

mod ids;
pub use ids::*;

mod constants;
pub use constants::*;

mod values;
pub use values::*;

pub mod commands;

/// A JDWP command, tying a request struct to its reply type and wire id.
///
/// Implemented by `#[jdwp_command(..)]`-annotated structs in
/// [`commands`]; never implemented by hand.
pub trait Command: JdwpWritable {
    const ID: CommandId;

    type Output: JdwpReadable;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, JdwpReadable, JdwpWritable)]
pub struct CommandId {
    command_set: u8,
    command: u8,
}

impl CommandId {
    pub const fn new(command_set: u8, command: u8) -> CommandId {
        CommandId {
            command_set,
            command,
        }
    }

    pub const fn command_set(&self) -> u8 {
        self.command_set
    }

    pub const fn command(&self) -> u8 {
        self.command
    }
}

impl Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.command_set, self.command)
    }
}

/// The composite-event command (64.100), handled outside the normal
/// request/reply correlation path.
pub const COMPOSITE_EVENT: CommandId = CommandId::new(64, 100);

/// Flags byte of a packet header: the high bit marks a reply.
#[derive(Debug, Copy, Clone, JdwpReadable, JdwpWritable)]
#[repr(u8)]
pub enum PacketMeta {
    Command(CommandId) = 0x00,
    Reply(ErrorCode) = 0x80,
}

/// The 11-byte JDWP packet header: length + id + flags + command/error-code.
#[derive(Debug, Copy, Clone, JdwpReadable, JdwpWritable)]
pub struct PacketHeader {
    length: u32,
    id: u32,
    meta: PacketMeta,
}

impl PacketHeader {
    pub const SIZE: u32 = 4 + 4 + 1 + 2;

    pub const fn new(length: u32, id: u32, meta: PacketMeta) -> PacketHeader {
        PacketHeader { length, id, meta }
    }

    pub const fn length(&self) -> u32 {
        self.length
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn meta(&self) -> PacketMeta {
        self.meta
    }
}
