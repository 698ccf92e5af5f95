//! Registry of the local and remote media streams of a call.

use std::{cell::RefCell, hash::Hash};

use futures::{
    stream::{self, LocalBoxStream},
    StreamExt as _,
};
use medea_reactive::collections::ObservableHashMap;
use tracerr::Traced;

use super::{
    MediaStreamHandle, PeerId, ReleaseError, StreamKey, StreamOwner,
    StreamType,
};

/// Media stream registered in a [`StreamRegistry`].
#[derive(Clone, Debug)]
pub struct StreamEntry {
    /// Owner of the stream.
    pub owner: StreamOwner,

    /// Type of the stream.
    pub kind: StreamType,

    /// Stream itself.
    pub stream: MediaStreamHandle,
}

impl StreamEntry {
    /// Returns [`StreamKey`] of this [`StreamEntry`].
    #[inline]
    pub fn key(&self) -> StreamKey {
        StreamKey {
            owner: self.owner.clone(),
            kind: self.kind,
        }
    }
}

/// Registry of the media streams of a call.
///
/// Sole owner of the registered [`MediaStreamHandle`]s: it releases every
/// stream it removes or replaces. Holds at most one local stream per
/// [`StreamType`] and at most one remote stream per [`PeerId`] and
/// [`StreamType`] pair.
#[derive(Default)]
pub struct StreamRegistry {
    /// Locally acquired streams.
    local: RefCell<ObservableHashMap<StreamType, MediaStreamHandle>>,

    /// Streams received from the remote peers.
    remote: RefCell<ObservableHashMap<(PeerId, StreamType), MediaStreamHandle>>,
}

impl StreamRegistry {
    /// Creates a new empty [`StreamRegistry`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the local `stream` of the provided `kind`.
    ///
    /// A different stream previously registered for this `kind` is released
    /// and replaced. Registering the very same stream again is a no-op.
    ///
    /// # Errors
    ///
    /// With [`ReleaseError`] if the replaced stream failed to release. The
    /// new stream is registered anyway.
    #[inline]
    pub fn add_local_stream(
        &self,
        kind: StreamType,
        stream: MediaStreamHandle,
    ) -> Result<(), Traced<ReleaseError>> {
        register(&self.local, kind, StreamKey::local(kind), stream)
    }

    /// Registers the `stream` of the provided `kind` received from the remote
    /// `peer_id`.
    ///
    /// A different stream previously registered for this peer and `kind` is
    /// released and replaced.
    ///
    /// # Errors
    ///
    /// With [`ReleaseError`] if the replaced stream failed to release. The
    /// new stream is registered anyway.
    pub fn add_remote_stream(
        &self,
        peer_id: PeerId,
        kind: StreamType,
        stream: MediaStreamHandle,
    ) -> Result<(), Traced<ReleaseError>> {
        let key = StreamKey::remote(peer_id.clone(), kind);
        register(&self.remote, (peer_id, kind), key, stream)
    }

    /// Releases the provided local `stream` and unregisters it if it's still
    /// the one registered for the `kind`.
    ///
    /// A `stream` that is not registered anymore (a stale one) leaves the
    /// registry untouched. A `stream` registered with another type as well
    /// stays registered there and is not released. Returns whether the
    /// `stream` was unregistered for the `kind`.
    ///
    /// # Errors
    ///
    /// With [`ReleaseError`] if the `stream` failed to release. It's
    /// unregistered anyway.
    pub fn remove_local_stream(
        &self,
        stream: &MediaStreamHandle,
        kind: StreamType,
    ) -> Result<bool, Traced<ReleaseError>> {
        let (removed, registered_elsewhere) = {
            let mut local = self.local.borrow_mut();
            let is_current =
                local.get(&kind).map_or(false, |s| s.ptr_eq(stream));
            let removed = if is_current {
                local.remove(&kind).is_some()
            } else {
                false
            };
            (removed, local.values().any(|s| s.ptr_eq(stream)))
        };
        if removed {
            log::debug!("Local {} stream [id = {}] removed", kind, stream.id());
        } else {
            log::debug!(
                "Stale local {} stream [id = {}] is not registered",
                kind,
                stream.id(),
            );
        }
        if registered_elsewhere {
            log::warn!(
                "Local stream [id = {}] is registered with another type than \
                 {}, so it is kept alive",
                stream.id(),
                kind,
            );
            return Ok(removed);
        }
        stream.release().map_err(|e| tracerr::new!(e))?;
        Ok(removed)
    }

    /// Unregisters and releases every stream of the remote `peer_id`.
    ///
    /// Returns [`StreamKey`]s of the removed streams.
    ///
    /// # Errors
    ///
    /// With [`ReleaseError`] joining release failures of all the removed
    /// streams. Every stream is removed anyway.
    pub fn remove_peer(
        &self,
        peer_id: &PeerId,
    ) -> Result<Vec<StreamKey>, Traced<ReleaseError>> {
        self.remove_remote(|peer| peer == peer_id)
    }

    /// Unregisters and releases every remote stream.
    ///
    /// Returns [`StreamKey`]s of the removed streams.
    ///
    /// # Errors
    ///
    /// With [`ReleaseError`] joining release failures of all the removed
    /// streams. Every stream is removed anyway.
    #[inline]
    pub fn clear_remote(
        &self,
    ) -> Result<Vec<StreamKey>, Traced<ReleaseError>> {
        self.remove_remote(|_| true)
    }

    /// Releases the provided `stream` that is refused to be registered.
    ///
    /// A `stream` registered already is kept alive.
    ///
    /// # Errors
    ///
    /// With [`ReleaseError`] if the `stream` failed to release.
    pub fn discard(
        &self,
        stream: &MediaStreamHandle,
    ) -> Result<(), Traced<ReleaseError>> {
        let registered = self.local.borrow().values().any(|s| s.ptr_eq(stream))
            || self.remote.borrow().values().any(|s| s.ptr_eq(stream));
        if registered {
            log::warn!(
                "Discarded stream [id = {}] is registered, so it is kept alive",
                stream.id(),
            );
            return Ok(());
        }
        log::debug!("Stream [id = {}] discarded", stream.id());
        stream.release().map_err(|e| tracerr::new!(e))
    }

    /// Returns the local stream of the provided `kind`, if any.
    #[inline]
    pub fn local_stream(&self, kind: StreamType) -> Option<MediaStreamHandle> {
        self.local.borrow().get(&kind).cloned()
    }

    /// Returns a snapshot of all the local streams.
    pub fn local_streams(&self) -> Vec<StreamEntry> {
        self.local
            .borrow()
            .iter()
            .map(|(kind, stream)| StreamEntry {
                owner: StreamOwner::Local,
                kind: *kind,
                stream: stream.clone(),
            })
            .collect()
    }

    /// Returns a snapshot of all the remote streams.
    pub fn remote_streams(&self) -> Vec<StreamEntry> {
        self.remote
            .borrow()
            .iter()
            .map(|((peer_id, kind), stream)| StreamEntry {
                owner: StreamOwner::Remote(peer_id.clone()),
                kind: *kind,
                stream: stream.clone(),
            })
            .collect()
    }

    /// Returns a snapshot of the streams received from the remote `peer_id`.
    pub fn remote_streams_of(&self, peer_id: &PeerId) -> Vec<StreamEntry> {
        self.remote_streams()
            .into_iter()
            .filter(|entry| entry.owner == StreamOwner::Remote(peer_id.clone()))
            .collect()
    }

    /// Returns count of the registered local streams.
    #[inline]
    pub fn local_count(&self) -> usize {
        self.local.borrow().iter().count()
    }

    /// Returns [`LocalBoxStream`] of the [`StreamKey`]s of the registered
    /// and replaced streams.
    pub fn on_add(&self) -> LocalBoxStream<'static, StreamKey> {
        let local = self
            .local
            .borrow()
            .on_insert()
            .map(|(kind, _)| StreamKey::local(kind));
        let remote = self
            .remote
            .borrow()
            .on_insert()
            .map(|((peer_id, kind), _)| StreamKey::remote(peer_id, kind));
        Box::pin(stream::select(local, remote))
    }

    /// Returns [`LocalBoxStream`] of the [`StreamKey`]s of the unregistered
    /// streams.
    pub fn on_remove(&self) -> LocalBoxStream<'static, StreamKey> {
        let local = self
            .local
            .borrow()
            .on_remove()
            .map(|(kind, _)| StreamKey::local(kind));
        let remote = self
            .remote
            .borrow()
            .on_remove()
            .map(|((peer_id, kind), _)| StreamKey::remote(peer_id, kind));
        Box::pin(stream::select(local, remote))
    }

    /// Unregisters and releases every remote stream whose peer satisfies the
    /// `predicate`.
    fn remove_remote<F>(
        &self,
        predicate: F,
    ) -> Result<Vec<StreamKey>, Traced<ReleaseError>>
    where
        F: Fn(&PeerId) -> bool,
    {
        let removed: Vec<_> = {
            let mut remote = self.remote.borrow_mut();
            let keys: Vec<_> = remote
                .iter()
                .map(|(key, _)| key.clone())
                .filter(|(peer_id, _)| predicate(peer_id))
                .collect();
            keys.into_iter()
                .filter_map(|key| remote.remove(&key).map(|s| (key, s)))
                .collect()
        };

        let mut errors = Vec::new();
        let mut keys = Vec::with_capacity(removed.len());
        for ((peer_id, kind), stream) in removed {
            let key = StreamKey::remote(peer_id, kind);
            log::debug!("Stream {} [id = {}] removed", key, stream.id());
            if let Err(e) = stream.release() {
                errors.push(e);
            }
            keys.push(key);
        }
        match ReleaseError::merge(errors) {
            Some(e) => Err(tracerr::new!(e)),
            None => Ok(keys),
        }
    }
}

/// Inserts the `stream` into the provided `map` and releases the replaced
/// one, unless it's the same stream.
fn register<K>(
    map: &RefCell<ObservableHashMap<K, MediaStreamHandle>>,
    map_key: K,
    key: StreamKey,
    stream: MediaStreamHandle,
) -> Result<(), Traced<ReleaseError>>
where
    K: Clone + Eq + Hash + 'static,
{
    let replaced = {
        let mut map = map.borrow_mut();
        if map.get(&map_key).map_or(false, |s| s.ptr_eq(&stream)) {
            return Ok(());
        }
        log::debug!("Stream {} [id = {}] added", key, stream.id());
        map.insert(map_key, stream)
    };
    replaced.map_or(Ok(()), |old| old.release().map_err(|e| tracerr::new!(e)))
}
