//! Signaling transport seam.

use futures::stream::LocalBoxStream;

use crate::{
    media::{MediaStreamHandle, PeerId, StreamType},
    session::DialState,
};

/// Events emitted by a signaling [`Transport`].
#[derive(Clone, Debug)]
pub enum SignalingEvent {
    /// Remote peer joined the call.
    PeerJoined {
        /// ID of the joined peer.
        peer_id: PeerId,
    },

    /// Media stream of a remote peer has been received.
    PeerStream {
        /// ID of the peer owning the stream.
        peer_id: PeerId,

        /// Type of the received stream.
        kind: StreamType,

        /// Received stream itself.
        stream: MediaStreamHandle,
    },

    /// Remote peer left the call or its connection was lost.
    PeerLeft {
        /// ID of the gone peer.
        peer_id: PeerId,
    },

    /// Display name of some participant has changed.
    ///
    /// Local participant is addressed with the [`ME`] peer ID.
    ///
    /// [`ME`]: crate::nicknames::ME
    Nickname {
        /// ID of the renamed participant.
        peer_id: PeerId,

        /// New display name.
        nickname: String,
    },

    /// Dialing progress of the call changed.
    DialState(DialState),
}

/// Transport managing peer connections of the call.
#[cfg_attr(any(test, feature = "mockable"), mockall::automock)]
pub trait Transport {
    /// Returns [`LocalBoxStream`] of all [`SignalingEvent`]s produced by this
    /// [`Transport`].
    fn on_event(&self) -> LocalBoxStream<'static, SignalingEvent>;

    /// Tears down every peer connection of the call.
    fn hang_up(&self);
}
