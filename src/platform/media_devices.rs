//! [MediaDevices][1] seam.
//!
//! [1]: https://w3.org/TR/mediacapture-streams#mediadevices

use derive_more::Display;
use futures::future::LocalBoxFuture;
use tracerr::Traced;

use crate::{media::MediaStreamHandle, utils::Caused};

/// Result of a local media acquisition.
pub type AcquisitionResult =
    Result<MediaStreamHandle, Traced<AcquisitionError>>;

/// Errors of a local media acquisition.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum AcquisitionError {
    /// User or User Agent denied the permission to use the media device.
    #[display(fmt = "Permission to use the media device was denied")]
    PermissionDenied,

    /// Requested kind of capture is not supported by the User Agent.
    #[display(fmt = "Requested media capture is not supported")]
    Unsupported,
}

impl Caused for AcquisitionError {
    fn name(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "PermissionDenied",
            Self::Unsupported => "Unsupported",
        }
    }
}

/// Acquisition of local media streams.
#[cfg_attr(any(test, feature = "mockable"), mockall::automock)]
pub trait MediaDevices {
    /// Acquires camera and microphone media.
    ///
    /// Adapter for a [MediaDevices.getUserMedia()][1] function.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams#dom-mediadevices-getusermedia
    fn get_user_media(&self) -> LocalBoxFuture<'static, AcquisitionResult>;

    /// Acquires desktop capture media.
    ///
    /// Adapter for a [MediaDevices.getDisplayMedia()][1] function.
    ///
    /// [1]: https://w3.org/TR/screen-capture#dom-mediadevices-getdisplaymedia
    fn get_display_media(&self) -> LocalBoxFuture<'static, AcquisitionResult>;
}
