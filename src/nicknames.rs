//! Display names of the call participants.

use std::{cell::RefCell, collections::HashMap};

use futures::{stream::LocalBoxStream, StreamExt as _};
use medea_reactive::collections::ObservableHashMap;

use crate::media::PeerId;

/// Reserved peer ID addressing the local participant.
pub const ME: &str = "_me_";

/// Display names of the call participants, including the local one stored
/// under the [`ME`] key.
///
/// Updated only by signaling events; read-only for everybody else.
#[derive(Debug, Default)]
pub struct Nicknames(RefCell<ObservableHashMap<PeerId, String>>);

impl Nicknames {
    /// Creates a new empty [`Nicknames`] registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns display name of the provided `peer_id`, if known.
    #[inline]
    pub fn get(&self, peer_id: &PeerId) -> Option<String> {
        self.0.borrow().get(peer_id).cloned()
    }

    /// Returns display name of the local participant, if known.
    #[inline]
    pub fn own(&self) -> Option<String> {
        self.get(&PeerId::from(ME))
    }

    /// Returns snapshot of all the known display names.
    pub fn all(&self) -> HashMap<PeerId, String> {
        self.0
            .borrow()
            .iter()
            .map(|(peer_id, nickname)| (peer_id.clone(), nickname.clone()))
            .collect()
    }

    /// Returns [`LocalBoxStream`] of the set display names along with the
    /// [`PeerId`]s they belong to.
    pub fn on_update(&self) -> LocalBoxStream<'static, (PeerId, String)> {
        self.0.borrow().on_insert().boxed_local()
    }

    /// Sets display name of the provided `peer_id`.
    pub(crate) fn set(&self, peer_id: PeerId, nickname: String) {
        self.0.borrow_mut().insert(peer_id, nickname);
    }
}
