//! Engine session with an explicit lifecycle guard.
//!
//! The original wrapper leaves call sequencing entirely to the caller: a
//! `forward` before `init`, or any call after `deinit`, walks straight into
//! the native side with a stale or zero handle. Here the session tracks
//! which calls are valid and rejects the rest with a lifecycle error.

use std::fmt;
use std::path::Path;

use ndarray::Array3;
use tracing::{debug, info, warn};

use crate::error::{Result, TnnError};

/// Device strings the TNN demo wrapper understands.
///
/// Passed through to the engine unmodified; the engine defines what they
/// mean, and any other string is forwarded just the same.
pub mod device {
    pub const ARM: &str = "ARM";
    pub const OPENCL: &str = "OPENCL";
    pub const METAL: &str = "METAL";
    pub const NPU: &str = "NPU";
}

/// Opaque handle identifying an engine instance.
///
/// The native side owns the instance and its lifetime; this type only
/// stores the identifier and never dereferences it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NativeHandle(u64);

impl NativeHandle {
    /// Wrap a raw handle value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value back, unmodified.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// RGBA8 input image, the Rust counterpart of the wrapper's bitmap
/// argument. Stored as an `(height, width, 4)` array in row-major order.
#[derive(Debug, Clone)]
pub struct Image {
    pixels: Array3<u8>,
}

impl Image {
    /// Channels per pixel (RGBA8).
    pub const CHANNELS: usize = 4;

    /// Build an image from a flat RGBA8 buffer in row-major order.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length does not match
    /// `width * height * 4`.
    pub fn from_rgba8(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * Self::CHANNELS;
        if data.len() != expected {
            return Err(TnnError::image(format!(
                "Expected {} bytes for {}x{} RGBA8, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        let pixels = Array3::from_shape_vec((height, width, Self::CHANNELS), data)
            .map_err(|e| TnnError::image(format!("Pixel shape error: {}", e)))?;
        Ok(Self { pixels })
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.pixels.shape()[1]
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.pixels.shape()[0]
    }

    /// The pixel array, `(height, width, 4)`.
    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }
}

/// Call surface of the wrapper library.
///
/// `NativeLibrary` implements this over the loaded symbols. The trait is
/// the seam between the lifecycle guard and the FFI, so alternative
/// implementations (test stubs, recording shims) can drive a session
/// without the native library installed.
pub trait EngineBindings {
    /// Create an engine instance from model files, returning its handle.
    ///
    /// Paths and the device string are passed through unmodified; their
    /// contract belongs to the library.
    fn init(&self, proto_path: &Path, model_path: &Path, device_type: &str)
        -> Result<NativeHandle>;

    /// Run inference, returning the engine's flat float output.
    ///
    /// No shape or ordering contract; the sequence is whatever the engine
    /// defines.
    fn forward(&self, handle: NativeHandle, image: &Image) -> Result<Vec<f32>>;

    /// Release the engine instance behind the handle.
    fn deinit(&self, handle: NativeHandle) -> Result<()>;
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No engine instance yet; only `init` is valid.
    Uninitialized,
    /// Engine instance exists; `forward` and `deinit` are valid.
    Active,
    /// Engine instance released; every engine call is rejected.
    Released,
}

/// An engine instance driven through the wrapper library.
///
/// Holds the opaque handle and a state guard enforcing the
/// `Uninitialized → Active → Released` lifecycle. Dropping an active
/// session releases the instance best-effort.
///
/// # Example
///
/// ```ignore
/// use tnnlib::{device, Image, NativeLibrary, TnnSession};
///
/// let library = NativeLibrary::load()?;
/// let mut session = TnnSession::new(library);
/// session.init("model.tnnproto", "model.tnnmodel", device::ARM)?;
///
/// let image = Image::from_rgba8(224, 224, vec![0; 224 * 224 * 4])?;
/// let scores = session.forward(&image)?;
/// println!("{} output values", scores.len());
///
/// session.deinit()?;
/// ```
pub struct TnnSession<B: EngineBindings> {
    bindings: B,
    handle: NativeHandle,
    state: SessionState,
}

impl<B: EngineBindings> TnnSession<B> {
    /// Create a session over a set of bindings. No native call is made
    /// until `init`.
    pub fn new(bindings: B) -> Self {
        Self {
            bindings,
            handle: NativeHandle::default(),
            state: SessionState::Uninitialized,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The stored handle, exactly as last written.
    pub fn native_ptr(&self) -> NativeHandle {
        self.handle
    }

    /// Overwrite the stored handle without touching the native side.
    ///
    /// The native side owns the referenced instance; storing a handle here
    /// transfers nothing and does not change the lifecycle state.
    pub fn set_native_ptr(&mut self, handle: NativeHandle) {
        self.handle = handle;
    }

    /// Initialize an engine instance from a model description file, a
    /// weights file, and a device string.
    ///
    /// # Errors
    ///
    /// Returns a lifecycle error if the session already holds an instance
    /// or was released, and the library's error otherwise.
    pub fn init(
        &mut self,
        proto_path: impl AsRef<Path>,
        model_path: impl AsRef<Path>,
        device_type: &str,
    ) -> Result<()> {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Active => {
                return Err(TnnError::lifecycle("init called on an active session"))
            }
            SessionState::Released => {
                return Err(TnnError::lifecycle("init called on a released session"))
            }
        }

        let handle = self
            .bindings
            .init(proto_path.as_ref(), model_path.as_ref(), device_type)?;
        self.handle = handle;
        self.state = SessionState::Active;
        info!(handle = %handle, device = device_type, "engine initialized");
        Ok(())
    }

    /// Run inference on an image, returning the engine's flat float
    /// output.
    pub fn forward(&mut self, image: &Image) -> Result<Vec<f32>> {
        self.ensure_active("forward")?;
        let output = self.bindings.forward(self.handle, image)?;
        debug!(len = output.len(), "forward complete");
        Ok(output)
    }

    /// Release the engine instance.
    ///
    /// The handle is not reusable after a deinit attempt, successful or
    /// not, so the session transitions to `Released` either way.
    pub fn deinit(&mut self) -> Result<()> {
        self.ensure_active("deinit")?;
        self.state = SessionState::Released;
        self.bindings.deinit(self.handle)
    }

    fn ensure_active(&self, call: &str) -> Result<()> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Uninitialized => {
                Err(TnnError::lifecycle(format!("{} called before init", call)))
            }
            SessionState::Released => {
                Err(TnnError::lifecycle(format!("{} called after deinit", call)))
            }
        }
    }
}

impl<B: EngineBindings> Drop for TnnSession<B> {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            self.state = SessionState::Released;
            if let Err(e) = self.bindings.deinit(self.handle) {
                warn!(handle = %self.handle, "deinit on drop failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Stub bindings recording every call, with scriptable outcomes.
    struct StubBindings {
        handle: u64,
        init_status: Option<i32>,
        deinit_status: Option<i32>,
        output: Vec<f32>,
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl StubBindings {
        fn new() -> Self {
            Self {
                handle: 0xDEAD_BEEF,
                init_status: None,
                deinit_status: None,
                output: vec![0.1, 0.7, 0.2],
                calls: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl EngineBindings for StubBindings {
        fn init(&self, _proto: &Path, _model: &Path, _device: &str) -> Result<NativeHandle> {
            self.calls.borrow_mut().push("init");
            match self.init_status {
                Some(status) => Err(TnnError::EngineStatus {
                    call: "init",
                    status,
                }),
                None => Ok(NativeHandle::new(self.handle)),
            }
        }

        fn forward(&self, _handle: NativeHandle, _image: &Image) -> Result<Vec<f32>> {
            self.calls.borrow_mut().push("forward");
            Ok(self.output.clone())
        }

        fn deinit(&self, _handle: NativeHandle) -> Result<()> {
            self.calls.borrow_mut().push("deinit");
            match self.deinit_status {
                Some(status) => Err(TnnError::EngineStatus {
                    call: "deinit",
                    status,
                }),
                None => Ok(()),
            }
        }
    }

    fn test_image() -> Image {
        Image::from_rgba8(2, 2, vec![0; 16]).unwrap()
    }

    #[test]
    fn full_lifecycle() {
        let mut session = TnnSession::new(StubBindings::new());
        assert_eq!(session.state(), SessionState::Uninitialized);

        session.init("model.tnnproto", "model.tnnmodel", device::ARM).unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.native_ptr().raw(), 0xDEAD_BEEF);

        let output = session.forward(&test_image()).unwrap();
        assert_eq!(output.len(), 3);
        assert_abs_diff_eq!(output[1], 0.7, epsilon = 1e-6);

        session.deinit().unwrap();
        assert_eq!(session.state(), SessionState::Released);
    }

    #[test]
    fn forward_before_init_is_rejected() {
        let mut session = TnnSession::new(StubBindings::new());
        let err = session.forward(&test_image()).unwrap_err();
        assert!(matches!(err, TnnError::Lifecycle(_)), "got {:?}", err);
    }

    #[test]
    fn calls_after_deinit_are_rejected() {
        let mut session = TnnSession::new(StubBindings::new());
        session.init("p", "m", device::ARM).unwrap();
        session.deinit().unwrap();

        assert!(matches!(
            session.forward(&test_image()),
            Err(TnnError::Lifecycle(_))
        ));
        assert!(matches!(session.deinit(), Err(TnnError::Lifecycle(_))));
        assert!(matches!(
            session.init("p", "m", device::ARM),
            Err(TnnError::Lifecycle(_))
        ));
    }

    #[test]
    fn double_init_is_rejected() {
        let mut session = TnnSession::new(StubBindings::new());
        session.init("p", "m", device::ARM).unwrap();
        assert!(matches!(
            session.init("p", "m", device::ARM),
            Err(TnnError::Lifecycle(_))
        ));
        // The first instance is untouched.
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn failed_init_stays_uninitialized() {
        let mut stub = StubBindings::new();
        stub.init_status = Some(0x1000);
        let mut session = TnnSession::new(stub);

        let err = session.init("p", "m", device::OPENCL).unwrap_err();
        assert!(matches!(
            err,
            TnnError::EngineStatus {
                call: "init",
                status: 0x1000
            }
        ));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(session.native_ptr(), NativeHandle::default());
    }

    #[test]
    fn failed_deinit_still_releases() {
        let mut stub = StubBindings::new();
        stub.deinit_status = Some(7);
        let mut session = TnnSession::new(stub);

        session.init("p", "m", device::ARM).unwrap();
        assert!(session.deinit().is_err());
        assert_eq!(session.state(), SessionState::Released);
    }

    #[test]
    fn drop_releases_active_session() {
        let stub = StubBindings::new();
        let calls = Rc::clone(&stub.calls);

        let mut session = TnnSession::new(stub);
        session.init("p", "m", device::ARM).unwrap();
        drop(session);

        assert_eq!(*calls.borrow(), vec!["init", "deinit"]);
    }

    #[test]
    fn drop_skips_uninitialized_session() {
        let stub = StubBindings::new();
        let calls = Rc::clone(&stub.calls);

        drop(TnnSession::new(stub));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn handle_accessor_roundtrip() {
        let mut session = TnnSession::new(StubBindings::new());
        for raw in [0u64, 1, 0xDEAD_BEEF, u64::MAX] {
            session.set_native_ptr(NativeHandle::new(raw));
            assert_eq!(session.native_ptr().raw(), raw);
        }
        // Storing a handle is not a lifecycle transition.
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn image_dimensions() {
        let image = Image::from_rgba8(3, 2, vec![0; 24]).unwrap();
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.pixels().shape(), &[2, 3, 4]);
    }

    #[test]
    fn image_rejects_short_buffer() {
        let err = Image::from_rgba8(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(err, TnnError::Image(_)));
        assert_eq!(
            format!("{}", err),
            "Invalid image: Expected 64 bytes for 4x4 RGBA8, got 10"
        );
    }
}
