//! Media streams of a call and their registry.

mod registry;
mod stream;

use derive_more::{Display, From};

#[doc(inline)]
pub use self::{
    registry::{StreamEntry, StreamRegistry},
    stream::{MediaStreamHandle, ReleaseError, StreamId, TrackStopFailure},
};
#[doc(inline)]
pub use crate::platform::AcquisitionError;

/// ID of a remote call participant.
#[derive(
    Clone, Debug, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd,
)]
#[from(forward)]
pub struct PeerId(String);

/// Type of a media stream.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum StreamType {
    /// Stream sourced from a camera and a microphone.
    #[display(fmt = "camera")]
    Camera,

    /// Stream captured from a desktop screen.
    #[display(fmt = "desktop")]
    Desktop,
}

/// Owner of a media stream.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
pub enum StreamOwner {
    /// Stream is acquired locally.
    #[display(fmt = "local")]
    Local,

    /// Stream is received from the remote peer.
    #[display(fmt = "{}", _0)]
    Remote(PeerId),
}

/// Composite key identifying a media stream of a call: at most one stream of
/// each [`StreamType`] exists per [`StreamOwner`].
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display(fmt = "{}_{}", owner, kind)]
pub struct StreamKey {
    /// Owner of the stream.
    pub owner: StreamOwner,

    /// Type of the stream.
    pub kind: StreamType,
}

impl StreamKey {
    /// Returns [`StreamKey`] of the local stream of the provided `kind`.
    #[inline]
    pub fn local(kind: StreamType) -> Self {
        Self {
            owner: StreamOwner::Local,
            kind,
        }
    }

    /// Returns [`StreamKey`] of the `kind` stream of the remote `peer_id`.
    #[inline]
    pub fn remote(peer_id: PeerId, kind: StreamType) -> Self {
        Self {
            owner: StreamOwner::Remote(peer_id),
            kind,
        }
    }

    /// Returns ID of the remote peer owning the stream, if any.
    #[inline]
    pub fn peer_id(&self) -> Option<&PeerId> {
        match &self.owner {
            StreamOwner::Local => None,
            StreamOwner::Remote(peer_id) => Some(peer_id),
        }
    }
}
