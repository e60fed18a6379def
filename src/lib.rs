//! tnnlib: safe Rust binding for the TNN demo wrapper library.
//!
//! This crate loads the precompiled `tnn_wrapper` shared library at
//! runtime and exposes its three entry points — `init`, `forward`,
//! `deinit` — behind a session type that tracks the engine handle's
//! lifecycle. The inference engine itself (graph execution, memory
//! planning, device backends) lives entirely inside the wrapper library;
//! this layer only forwards calls and guards sequencing.
//!
//! # Example
//!
//! ```ignore
//! use tnnlib::{device, Image, NativeLibrary, TnnSession};
//!
//! // Load the wrapper library; failure is reported here, not deferred
//! // to the first call.
//! let library = NativeLibrary::load()?;
//!
//! let mut session = TnnSession::new(library);
//! session.init("squeezenet.tnnproto", "squeezenet.tnnmodel", device::ARM)?;
//!
//! let image = Image::from_rgba8(224, 224, vec![0; 224 * 224 * 4])?;
//! let scores = session.forward(&image)?;
//! println!("Got {} output values", scores.len());
//!
//! session.deinit()?;
//! ```

pub mod binding;
pub mod cli;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use binding::{device, EngineBindings, Image, NativeHandle, NativeLibrary, SessionState,
    TnnSession, LIB_NAME};
pub use error::{Result, TnnError};
