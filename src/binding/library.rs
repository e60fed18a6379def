//! Dynamic loading of the TNN wrapper library.
//!
//! The original binding loads the library once at class initialization and
//! swallows any failure, deferring discovery to the first native call.
//! Here loading is an explicit operation returning a `Result`, and all
//! three entry points are resolved up front so a missing symbol fails at
//! load time instead of at first use.

use std::ffi::{CString, OsStr};
use std::os::raw::c_int;
use std::path::Path;
use std::ptr;
use std::slice;

use libloading::Library;
use tracing::debug;

use super::ffi;
use super::session::{EngineBindings, Image, NativeHandle};
use crate::error::{Result, TnnError};

/// Fixed name of the wrapper library, without platform prefix or suffix.
pub const LIB_NAME: &str = "tnn_wrapper";

/// The wrapper library with its three entry points resolved.
///
/// Function pointers are copied out of the loaded library; the `Library`
/// itself is kept alive alongside them so the symbols stay mapped.
#[derive(Debug)]
pub struct NativeLibrary {
    init: ffi::InitFn,
    forward: ffi::ForwardFn,
    deinit: ffi::DeinitFn,
    _lib: Library,
}

impl NativeLibrary {
    /// Load the wrapper library by its fixed name from the platform's
    /// library search path.
    ///
    /// # Errors
    ///
    /// Returns an error if the library is absent or any entry point does
    /// not resolve. Never panics.
    pub fn load() -> Result<Self> {
        Self::load_from(libloading::library_filename(LIB_NAME))
    }

    /// Load the wrapper library from an explicit path or name.
    pub fn load_from(path: impl AsRef<OsStr>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.to_string_lossy().into_owned();

        // SAFETY: loading runs the library's initializers. The wrapper
        // library is expected to have no unsound ones.
        let lib = unsafe { Library::new(path) }.map_err(|source| TnnError::LibraryLoad {
            name: name.clone(),
            source,
        })?;

        let init = resolve::<ffi::InitFn>(&lib, "tnn_wrapper_init", ffi::INIT_SYMBOL)?;
        let forward = resolve::<ffi::ForwardFn>(&lib, "tnn_wrapper_forward", ffi::FORWARD_SYMBOL)?;
        let deinit = resolve::<ffi::DeinitFn>(&lib, "tnn_wrapper_deinit", ffi::DEINIT_SYMBOL)?;

        debug!(library = %name, "native library loaded, symbols resolved");
        Ok(Self {
            init,
            forward,
            deinit,
            _lib: lib,
        })
    }
}

/// Resolve a symbol and copy its function pointer out of the library.
fn resolve<T: Copy>(lib: &Library, name: &'static str, symbol: &[u8]) -> Result<T> {
    // SAFETY: the caller-supplied type is one of the `ffi` signatures,
    // which the wrapper library's ABI defines for these symbols.
    unsafe { lib.get::<T>(symbol) }
        .map(|sym| *sym)
        .map_err(|source| TnnError::MissingSymbol {
            symbol: name,
            source,
        })
}

fn path_cstring(path: &Path, what: &'static str) -> Result<CString> {
    CString::new(path.to_string_lossy().as_ref())
        .map_err(|_| TnnError::config(format!("Invalid {} path encoding", what)))
}

impl EngineBindings for NativeLibrary {
    fn init(
        &self,
        proto_path: &Path,
        model_path: &Path,
        device_type: &str,
    ) -> Result<NativeHandle> {
        let proto = path_cstring(proto_path, "proto")?;
        let model = path_cstring(model_path, "model")?;
        let device = CString::new(device_type)
            .map_err(|_| TnnError::config("Invalid device string encoding"))?;

        let mut handle: ffi::RawHandle = 0;
        let status =
            unsafe { (self.init)(proto.as_ptr(), model.as_ptr(), device.as_ptr(), &mut handle) };

        if status != ffi::STATUS_OK {
            return Err(TnnError::EngineStatus {
                call: "init",
                status,
            });
        }
        Ok(NativeHandle::new(handle))
    }

    fn forward(&self, handle: NativeHandle, image: &Image) -> Result<Vec<f32>> {
        // Ensure pixel data is contiguous before handing out a pointer.
        let pixels = image.pixels().as_standard_layout();

        let mut out_data: *const f32 = ptr::null();
        let mut out_len: usize = 0;

        let status = unsafe {
            (self.forward)(
                handle.raw(),
                pixels.as_ptr(),
                image.width() as c_int,
                image.height() as c_int,
                &mut out_data,
                &mut out_len,
            )
        };

        if status != ffi::STATUS_OK {
            return Err(TnnError::EngineStatus {
                call: "forward",
                status,
            });
        }

        // The buffer is engine-owned and only valid until the next call on
        // this handle; copy it out now.
        if out_len == 0 || out_data.is_null() {
            return Ok(Vec::new());
        }
        let output = unsafe { slice::from_raw_parts(out_data, out_len) }.to_vec();
        Ok(output)
    }

    fn deinit(&self, handle: NativeHandle) -> Result<()> {
        let status = unsafe { (self.deinit)(handle.raw()) };
        if status != ffi::STATUS_OK {
            return Err(TnnError::EngineStatus {
                call: "deinit",
                status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_an_error_not_a_panic() {
        let result = NativeLibrary::load_from("/nonexistent/libtnn_wrapper_missing.so");
        match result {
            Err(TnnError::LibraryLoad { name, .. }) => {
                assert_eq!(name, "/nonexistent/libtnn_wrapper_missing.so");
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("load of a nonexistent library succeeded"),
        }
    }

    #[test]
    fn default_load_never_panics() {
        // The wrapper library is usually absent on development machines;
        // either outcome is fine as long as load returns.
        match NativeLibrary::load() {
            Ok(_) => {}
            Err(TnnError::LibraryLoad { name, .. }) => {
                assert!(name.contains(LIB_NAME));
            }
            Err(TnnError::MissingSymbol { .. }) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
}
