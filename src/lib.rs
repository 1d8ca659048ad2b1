#![allow(dead_code)]

//! A session-scoped JDWP client core for the Dalvik/Android VM.
//!
//! This crate implements the wire codec, the identifier/value model, the
//! command catalog the core dispatches, and the session/entity graph that
//! resolves classes, methods, threads and stack frames lazily and with
//! exactly-once identity per session. It does not implement a debugger UI,
//! bytecode verification, or anything beyond the commands it names.

extern crate self as jdwp;

pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod hook;
pub mod lazy;
pub mod pool;
pub mod protocol;
pub mod session;
pub mod transport;

pub use protocol::CommandId;
