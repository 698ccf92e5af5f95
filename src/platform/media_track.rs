//! [MediaStreamTrack][1] seam.
//!
//! [1]: https://w3.org/TR/mediacapture-streams#mediastreamtrack

use super::Error;

/// Single device-backed track of a media stream.
#[cfg_attr(any(test, feature = "mockable"), mockall::automock)]
pub trait MediaStreamTrack {
    /// Returns [`id`][1] of this track.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams#dom-mediastreamtrack-id
    fn id(&self) -> String;

    /// [Stops][1] this track, releasing the device it is sourced from.
    ///
    /// # Errors
    ///
    /// If the platform fails to stop the track.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams#dom-mediastreamtrack-stop
    fn stop(&self) -> Result<(), Error>;
}
