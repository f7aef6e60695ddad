//! Ember Core
//!
//! Shared data types used by the compiler and the VM: values, the interned
//! string heap, the globals table, and the bytecode chunk.

pub mod chunk;
pub mod debug;
pub mod strings;
pub mod table;
pub mod value;

pub use chunk::{Chunk, ChunkError, OpCode};
pub use strings::{Heap, ObjString, StringId};
pub use table::Globals;
pub use value::{ObjRef, Value};
