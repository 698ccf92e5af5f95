//! Seams between the call state core and the host platform: media tracks,
//! media devices, signaling transport, task spawning and logging.
//!
//! The browser bindings implement the traits declared here; tests use the
//! [`mockall`] generated mocks (enabled with the `mockable` feature).

mod error;
mod media_devices;
mod media_track;
mod transport;

use std::rc::Rc;

use futures::task::LocalSpawn;

#[doc(inline)]
pub use self::{
    error::Error,
    media_devices::{AcquisitionError, AcquisitionResult, MediaDevices},
    media_track::MediaStreamTrack,
    transport::{SignalingEvent, Transport},
};

#[cfg(any(test, feature = "mockable"))]
#[doc(inline)]
pub use self::{
    media_devices::MockMediaDevices, media_track::MockMediaStreamTrack,
    transport::MockTransport,
};

/// Executor spawning `!Send` futures on the current thread.
pub type Spawner = Rc<dyn LocalSpawn>;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        mod wasm;

        pub use self::wasm::{init_logger, spawner};
    } else {
        /// Initializes logging on the current platform.
        ///
        /// No-op outside of a browser: native hosts install their own [`log`]
        /// implementation.
        #[inline]
        pub fn init_logger() {}
    }
}
