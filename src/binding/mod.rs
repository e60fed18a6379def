//! Native engine binding.
//!
//! This module loads the TNN wrapper library and exposes its three entry
//! points (`init`, `forward`, `deinit`) behind a lifecycle-guarded
//! session.

mod ffi;
mod library;
mod session;

pub use library::{NativeLibrary, LIB_NAME};
pub use session::{device, EngineBindings, Image, NativeHandle, SessionState, TnnSession};
