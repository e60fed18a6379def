//! FFI signatures for the TNN wrapper library.
//!
//! These are the three entry points the wrapper library exports. The
//! symbols are resolved at load time by `NativeLibrary`; use the safe
//! wrappers in the `session` module instead of calling these directly.

use std::os::raw::{c_char, c_int, c_uchar};

/// Raw engine handle owned by the native side.
pub type RawHandle = u64;

/// Status code returned by every entry point.
///
/// Zero is success; the meaning of any other value is defined by the
/// library and is not interpreted here.
pub type StatusCode = c_int;

/// The library's OK status.
pub const STATUS_OK: StatusCode = 0;

/// Nul-terminated symbol names, in export order.
pub const INIT_SYMBOL: &[u8] = b"tnn_wrapper_init\0";
pub const FORWARD_SYMBOL: &[u8] = b"tnn_wrapper_forward\0";
pub const DEINIT_SYMBOL: &[u8] = b"tnn_wrapper_deinit\0";

/// `tnn_wrapper_init(proto_path, model_path, device_type, handle_out)`
///
/// Creates an engine instance from a model description file and a weights
/// file. On success writes the instance handle to `handle_out`.
pub type InitFn = unsafe extern "C" fn(
    proto_path: *const c_char,
    model_path: *const c_char,
    device_type: *const c_char,
    handle_out: *mut RawHandle,
) -> StatusCode;

/// `tnn_wrapper_forward(handle, pixels, width, height, out_data, out_len)`
///
/// Runs inference on an RGBA8 pixel buffer. On success `*out_data` points
/// to `*out_len` floats owned by the engine, valid until the next
/// `forward` or `deinit` on the same handle.
pub type ForwardFn = unsafe extern "C" fn(
    handle: RawHandle,
    pixels: *const c_uchar,
    width: c_int,
    height: c_int,
    out_data: *mut *const f32,
    out_len: *mut usize,
) -> StatusCode;

/// `tnn_wrapper_deinit(handle)`
///
/// Releases the engine instance behind the handle.
pub type DeinitFn = unsafe extern "C" fn(handle: RawHandle) -> StatusCode;
