//! The lazily-populated entity graph mirroring debuggee state (§3).
//!
//! Entities store only their identifying keys and [`crate::lazy::Lazy`]
//! attribute groups; related entities are reached by looking them up
//! through the owning [`crate::session::Session`]'s pools, never by direct
//! ownership. That keeps the naturally cyclic references (Class<->Method,
//! Location->Method->Class) acyclic in Rust: a `Method` knows its class's
//! key, not an `Arc<Class>`.

pub mod class;
pub mod frame;
pub mod location;
pub mod method;
pub mod object;
pub mod reftype;
pub mod slot;
pub mod string;
pub mod thread;

pub use class::{Class, MethodIndex};
pub use frame::Frame;
pub use location::Location;
pub use method::{LineTable, Method};
pub use object::Object;
pub use reftype::{RefType, Signature};
pub use slot::Slot;
pub use string::JavaString;
pub use thread::Thread;
