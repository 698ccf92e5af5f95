//! Handle to an acquired media stream.

use std::{
    cell::Cell,
    fmt::{self, Display},
    rc::Rc,
};

use derive_more::{Display, From};

use crate::{
    platform::{self, MediaStreamTrack},
    utils::Caused,
};

/// ID of a media stream.
#[derive(Clone, Debug, Display, Eq, From, Hash, PartialEq)]
#[from(forward)]
pub struct StreamId(String);

/// Shared handle to an acquired media stream and its device tracks.
///
/// The underlying tracks are stopped at most once: either when the owning
/// [`StreamRegistry`] releases this stream, or when the last handle to a
/// never released stream is dropped.
///
/// [`StreamRegistry`]: super::StreamRegistry
#[derive(Clone)]
pub struct MediaStreamHandle(Rc<InnerStream>);

impl MediaStreamHandle {
    /// Wraps the provided device `tracks` into a new [`MediaStreamHandle`].
    pub fn new<I: Into<StreamId>>(
        id: I,
        tracks: Vec<Box<dyn MediaStreamTrack>>,
    ) -> Self {
        Self(Rc::new(InnerStream {
            id: id.into(),
            tracks,
            released: Cell::new(false),
        }))
    }

    /// Returns ID of this stream.
    #[inline]
    pub fn id(&self) -> &StreamId {
        &self.0.id
    }

    /// Returns IDs of all the tracks of this stream.
    pub fn track_ids(&self) -> Vec<String> {
        self.0.tracks.iter().map(|track| track.id()).collect()
    }

    /// Indicates whether tracks of this stream have been stopped already.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.0.released.get()
    }

    /// Indicates whether this [`MediaStreamHandle`] points to the same stream
    /// as the `other` one. Compares pointers, not values.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Stops every track of this stream.
    ///
    /// No-op if this stream has been released already. A track failing to
    /// stop doesn't prevent the remaining ones from being stopped.
    ///
    /// # Errors
    ///
    /// With [`ReleaseError`] listing every track that failed to stop.
    pub(crate) fn release(&self) -> Result<(), ReleaseError> {
        self.0.release()
    }
}

impl fmt::Debug for MediaStreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStreamHandle")
            .field("id", &self.0.id)
            .field("tracks", &self.0.tracks.len())
            .field("released", &self.0.released.get())
            .finish()
    }
}

/// Actual data of a [`MediaStreamHandle`].
struct InnerStream {
    /// ID of this stream.
    id: StreamId,

    /// Device tracks of this stream.
    tracks: Vec<Box<dyn MediaStreamTrack>>,

    /// Indicator whether the [`InnerStream::tracks`] have been stopped.
    released: Cell<bool>,
}

impl InnerStream {
    /// Stops all the [`InnerStream::tracks`] unless they were stopped before.
    fn release(&self) -> Result<(), ReleaseError> {
        if self.released.replace(true) {
            return Ok(());
        }
        let failures: Vec<_> = self
            .tracks
            .iter()
            .filter_map(|track| {
                track.stop().err().map(|cause| TrackStopFailure {
                    stream_id: self.id.clone(),
                    track_id: track.id(),
                    cause,
                })
            })
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ReleaseError(failures))
        }
    }
}

impl Drop for InnerStream {
    /// Stops the tracks of a stream that nobody has released.
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::error!("Failed to release dropped stream: {}", e);
        }
    }
}

/// Track that failed to stop.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrackStopFailure {
    /// ID of the stream the track belongs to.
    pub stream_id: StreamId,

    /// ID of the track.
    pub track_id: String,

    /// Platform error the track failed with.
    pub cause: platform::Error,
}

/// Error of stopping the tracks of one or more media streams.
///
/// Every track not listed here has been stopped successfully.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReleaseError(Vec<TrackStopFailure>);

impl ReleaseError {
    /// Joins the provided errors into a single [`ReleaseError`].
    ///
    /// Returns [`None`] if there is nothing to join.
    pub fn merge<I>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let failures: Vec<_> =
            errors.into_iter().flat_map(|e| e.0.into_iter()).collect();
        if failures.is_empty() {
            None
        } else {
            Some(Self(failures))
        }
    }

    /// Returns every track that failed to stop.
    #[inline]
    pub fn failures(&self) -> &[TrackStopFailure] {
        &self.0
    }
}

impl Display for ReleaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to stop media tracks:")?;
        for failure in &self.0 {
            write!(
                f,
                " [{}/{}: {}]",
                failure.stream_id, failure.track_id, failure.cause,
            )?;
        }
        Ok(())
    }
}

impl Caused for ReleaseError {
    fn name(&self) -> &'static str {
        "ReleaseFailed"
    }
}
