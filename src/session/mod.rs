//! Call session controller composing all the registries of a call.

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    rc::{Rc, Weak},
};

use derive_more::{Display, From};
use futures::{
    stream::LocalBoxStream,
    task::{LocalSpawnExt as _, SpawnError},
    StreamExt as _,
};
use medea_reactive::{collections::ObservableHashSet, ObservableCell};
use tracerr::Traced;

use crate::{
    media::{
        MediaStreamHandle, PeerId, StreamKey, StreamRegistry, StreamType,
    },
    nicknames::Nicknames,
    notification::{Notification, NotificationId, Notifications},
    platform::{
        AcquisitionResult, MediaDevices, SignalingEvent, Spawner, Transport,
    },
    settings::{Settings, SettingsStore},
    utils::{CallError, Caused},
    window_state::WindowStates,
};

/// Dialing progress of a call.
///
/// Variants are ordered by the progress: a call never moves back to an
/// earlier state.
#[derive(Clone, Copy, Debug, Display, Eq, Ord, PartialEq, PartialOrd)]
pub enum DialState {
    /// Session is not initialized yet.
    Idle,

    /// Remote participants are being dialed.
    Dialing,

    /// Call is established.
    InCall,

    /// Call is ended.
    ///
    /// Final state: once entered, never left.
    HungUp,
}

/// Errors of a [`CallSession`].
#[derive(Debug, Display, From)]
pub enum SessionError {
    /// Executor refused to spawn a session task.
    #[display(fmt = "Failed to spawn session task: {}", _0)]
    Spawn(SpawnError),
}

impl Caused for SessionError {
    fn name(&self) -> &'static str {
        match self {
            Self::Spawn(_) => "SpawnFailed",
        }
    }
}

/// Client-side state of a single call.
///
/// Routes user actions and signaling events into its registries and
/// guarantees that hanging up releases every acquired media stream exactly
/// once.
///
/// Actually, represents a handle to [`InnerSession`], so cloning it is
/// cheap.
#[derive(Clone)]
pub struct CallSession(Rc<InnerSession>);

impl CallSession {
    /// Creates a new [`CallSession`] over the provided platform seams.
    pub fn new(
        transport: Rc<dyn Transport>,
        media_devices: Rc<dyn MediaDevices>,
        spawner: Spawner,
        settings: Settings,
    ) -> Self {
        Self(Rc::new(InnerSession {
            transport,
            media_devices,
            spawner,
            streams: StreamRegistry::new(),
            window_states: WindowStates::new(),
            notifications: Notifications::new(),
            nicknames: Nicknames::new(),
            settings: SettingsStore::new(settings),
            peers: RefCell::new(ObservableHashSet::new()),
            sidebar_visible: ObservableCell::new(false),
            dial_state: ObservableCell::new(DialState::Idle),
            initialized: Cell::new(false),
            in_flight: RefCell::default(),
        }))
    }

    /// Starts handling [`SignalingEvent`]s of the [`Transport`] and moves
    /// this [`CallSession`] into the [`DialState::Dialing`].
    ///
    /// # Errors
    ///
    /// With [`SessionError::Spawn`] if the events handling task cannot be
    /// spawned.
    ///
    /// # Panics
    ///
    /// If called again after a successful initialization.
    pub fn initialize_session(&self) -> Result<(), Traced<SessionError>> {
        assert!(
            !self.0.initialized.get(),
            "CallSession is initialized already",
        );

        let mut events = self.0.transport.on_event();
        let weak_inner = Rc::downgrade(&self.0);
        self.0
            .spawner
            .spawn_local(async move {
                while let Some(event) = events.next().await {
                    match weak_inner.upgrade() {
                        Some(inner) => inner.handle_signaling_event(event),
                        None => break,
                    }
                }
                log::debug!("Signaling events handling finished");
            })
            .map_err(|e| tracerr::new!(SessionError::Spawn(e)))?;
        self.0.initialized.set(true);

        if self.0.dial_state.get() == DialState::Idle {
            self.0.dial_state.set(DialState::Dialing);
        }
        Ok(())
    }

    /// Toggles visibility of the chat sidebar.
    #[inline]
    pub fn toggle_sidebar(&self) {
        let visible = self.0.sidebar_visible.get();
        self.0.sidebar_visible.set(!visible);
    }

    /// Shows the chat sidebar.
    #[inline]
    pub fn show_sidebar(&self) {
        self.0.sidebar_visible.set(true);
    }

    /// Hides the chat sidebar.
    #[inline]
    pub fn hide_sidebar(&self) {
        self.0.sidebar_visible.set(false);
    }

    /// Indicates whether the chat sidebar is visible.
    #[inline]
    pub fn is_sidebar_visible(&self) -> bool {
        self.0.sidebar_visible.get()
    }

    /// Returns [`LocalBoxStream`] of the current chat sidebar visibility
    /// followed by all its further changes.
    #[inline]
    pub fn on_sidebar_change(&self) -> LocalBoxStream<'static, bool> {
        self.0.sidebar_visible.subscribe()
    }

    /// Starts acquiring a desktop capture, registering it as the local
    /// [`StreamType::Desktop`] stream once acquired.
    ///
    /// # Errors
    ///
    /// See [`CallSession::request_local_stream`].
    #[inline]
    pub fn request_desktop_share(&self) -> Result<(), Traced<SessionError>> {
        self.request_local_stream(StreamType::Desktop)
    }

    /// Starts acquiring a local stream of the provided `kind`, registering it
    /// once acquired.
    ///
    /// Acquisition failure is reported as an error [`Notification`]. Request
    /// for a `kind` being acquired already is ignored, as well as any request
    /// after hang-up. A stream acquired after hang-up is released.
    ///
    /// # Errors
    ///
    /// With [`SessionError::Spawn`] if the acquisition task cannot be
    /// spawned.
    pub fn request_local_stream(
        &self,
        kind: StreamType,
    ) -> Result<(), Traced<SessionError>> {
        if self.0.is_hung_up() {
            log::debug!("Ignoring {} stream request after hang-up", kind);
            return Ok(());
        }
        if !self.0.in_flight.borrow_mut().insert(kind) {
            log::debug!("Ignoring redundant {} stream request", kind);
            return Ok(());
        }

        let acquisition = match kind {
            StreamType::Camera => self.0.media_devices.get_user_media(),
            StreamType::Desktop => self.0.media_devices.get_display_media(),
        };
        let weak_inner = Rc::downgrade(&self.0);
        let spawned = self.0.spawner.spawn_local(async move {
            let result = acquisition.await;
            on_acquired(&weak_inner, kind, result);
        });
        spawned.map_err(|e| {
            self.0.in_flight.borrow_mut().remove(&kind);
            tracerr::new!(SessionError::Spawn(e))
        })
    }

    /// Stops sharing the local stream of the provided `kind`, releasing it.
    ///
    /// Returns whether there was such stream.
    pub fn stop_local_stream(&self, kind: StreamType) -> bool {
        match self.0.streams.local_stream(kind) {
            Some(stream) => self.0.remove_local_stream(&stream, kind),
            None => false,
        }
    }

    /// Registers the externally acquired local `stream` of the provided
    /// `kind`.
    ///
    /// After hang-up the `stream` is released instead.
    #[inline]
    pub fn add_local_stream(
        &self,
        kind: StreamType,
        stream: MediaStreamHandle,
    ) {
        self.0.add_local_stream(kind, stream);
    }

    /// Ends the call.
    ///
    /// Releases every local stream, tears down the [`Transport`], releases
    /// every remote stream and moves this [`CallSession`] into the
    /// [`DialState::HungUp`]. Release failures are reported as error
    /// [`Notification`]s and don't stop the teardown.
    ///
    /// No-op if the call is hung up already.
    #[inline]
    pub fn hang_up(&self) {
        self.0.hang_up(true);
    }

    /// Maximizes window of the stream with the provided `key`.
    #[inline]
    pub fn maximize(&self, key: StreamKey) {
        self.0.window_states.maximize(key);
    }

    /// Toggles minimization of the window of the stream with the provided
    /// `key`.
    #[inline]
    pub fn minimize_toggle(&self, key: StreamKey) {
        self.0.window_states.minimize_toggle(key);
    }

    /// Dismisses the [`Notification`] with the provided `id`.
    #[inline]
    pub fn dismiss(&self, id: NotificationId) -> Option<Notification> {
        self.0.notifications.dismiss(id)
    }

    /// Returns [`StreamRegistry`] of this call.
    #[inline]
    pub fn streams(&self) -> &StreamRegistry {
        &self.0.streams
    }

    /// Returns [`WindowStates`] of this call's streams.
    #[inline]
    pub fn window_states(&self) -> &WindowStates {
        &self.0.window_states
    }

    /// Returns [`Notifications`] of this call.
    #[inline]
    pub fn notifications(&self) -> &Notifications {
        &self.0.notifications
    }

    /// Returns [`Nicknames`] of this call's participants.
    #[inline]
    pub fn nicknames(&self) -> &Nicknames {
        &self.0.nicknames
    }

    /// Returns [`SettingsStore`] of this call.
    #[inline]
    pub fn settings(&self) -> &SettingsStore {
        &self.0.settings
    }

    /// Returns IDs of the remote peers taking part in this call, sorted.
    pub fn peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<_> = self.0.peers.borrow().iter().cloned().collect();
        peers.sort();
        peers
    }

    /// Returns [`LocalBoxStream`] of the [`PeerId`]s joining this call.
    pub fn on_peer_joined(&self) -> LocalBoxStream<'static, PeerId> {
        self.0.peers.borrow().on_insert().boxed_local()
    }

    /// Returns [`LocalBoxStream`] of the [`PeerId`]s leaving this call.
    pub fn on_peer_left(&self) -> LocalBoxStream<'static, PeerId> {
        self.0.peers.borrow().on_remove().boxed_local()
    }

    /// Returns current [`DialState`] of this call.
    #[inline]
    pub fn dial_state(&self) -> DialState {
        self.0.dial_state.get()
    }

    /// Returns [`LocalBoxStream`] of the current [`DialState`] followed by all
    /// its further changes.
    #[inline]
    pub fn on_dial_state_change(&self) -> LocalBoxStream<'static, DialState> {
        self.0.dial_state.subscribe()
    }

    /// Indicates whether the live call view should be shown.
    #[inline]
    pub fn is_call_view_visible(&self) -> bool {
        !self.0.is_hung_up()
    }
}

/// Actual data of a [`CallSession`].
struct InnerSession {
    /// Signaling transport of the call.
    transport: Rc<dyn Transport>,

    /// Acquisition of the local media.
    media_devices: Rc<dyn MediaDevices>,

    /// Executor of the session tasks.
    spawner: Spawner,

    /// Local and remote media streams of the call.
    streams: StreamRegistry,

    /// Presentation states of the stream windows.
    window_states: WindowStates,

    /// Not dismissed user-facing notifications.
    notifications: Notifications,

    /// Display names of the participants.
    nicknames: Nicknames,

    /// Presentation settings.
    settings: SettingsStore,

    /// Remote peers taking part in the call.
    peers: RefCell<ObservableHashSet<PeerId>>,

    /// Visibility of the chat sidebar.
    sidebar_visible: ObservableCell<bool>,

    /// Dialing progress of the call.
    dial_state: ObservableCell<DialState>,

    /// Indicator whether [`CallSession::initialize_session`] was called.
    initialized: Cell<bool>,

    /// Types of the local streams being acquired right now.
    in_flight: RefCell<HashSet<StreamType>>,
}

impl InnerSession {
    /// Indicates whether the call is hung up.
    #[inline]
    fn is_hung_up(&self) -> bool {
        self.dial_state.get() == DialState::HungUp
    }

    /// Logs the provided error and raises an error [`Notification`] about it.
    fn report<E: Into<CallError>>(&self, err: E) {
        let err = err.into();
        err.print();
        self.notifications.report(&err);
    }

    /// Registers the local `stream`, or releases it if the call is hung up.
    fn add_local_stream(&self, kind: StreamType, stream: MediaStreamHandle) {
        if self.is_hung_up() {
            log::info!(
                "Local {} stream [id = {}] arrived after hang-up, releasing it",
                kind,
                stream.id(),
            );
            if let Err(e) = self.streams.discard(&stream) {
                self.report(e);
            }
            return;
        }
        if let Err(e) = self.streams.add_local_stream(kind, stream) {
            self.report(e);
        }
    }

    /// Releases and unregisters the local `stream`, reporting any failures.
    fn remove_local_stream(
        &self,
        stream: &MediaStreamHandle,
        kind: StreamType,
    ) -> bool {
        self.streams
            .remove_local_stream(stream, kind)
            .unwrap_or_else(|e| {
                self.report(e);
                true
            })
    }

    /// Adds the remote `peer_id` to the call, unless it's there already.
    fn add_peer(&self, peer_id: PeerId) {
        let mut peers = self.peers.borrow_mut();
        if !peers.contains(&peer_id) {
            peers.insert(peer_id);
        }
    }

    /// Ends the call, tearing down the [`Transport`] if `with_transport` is
    /// `true`.
    fn hang_up(&self, with_transport: bool) {
        if self.is_hung_up() {
            log::debug!("Call is hung up already");
            return;
        }
        log::info!("Hanging up the call");

        for entry in self.streams.local_streams() {
            self.remove_local_stream(&entry.stream, entry.kind);
        }
        if with_transport {
            self.transport.hang_up();
        }
        self.dial_state.set(DialState::HungUp);

        if let Err(e) = self.streams.clear_remote() {
            self.report(e);
        }
        let mut peers = self.peers.borrow_mut();
        let left: Vec<_> = peers.iter().cloned().collect();
        for peer_id in left {
            peers.remove(&peer_id);
        }
    }

    /// Applies the provided [`SignalingEvent`] to this session.
    fn handle_signaling_event(&self, event: SignalingEvent) {
        match event {
            SignalingEvent::PeerJoined { peer_id } => {
                if self.is_hung_up() {
                    return;
                }
                log::debug!("Peer {} joined", peer_id);
                self.add_peer(peer_id);
            }
            SignalingEvent::PeerStream {
                peer_id,
                kind,
                stream,
            } => {
                if self.is_hung_up() {
                    log::info!(
                        "Stream {} of peer {} arrived after hang-up, \
                         releasing it",
                        kind,
                        peer_id,
                    );
                    if let Err(e) = self.streams.discard(&stream) {
                        self.report(e);
                    }
                    return;
                }
                self.add_peer(peer_id.clone());
                if let Err(e) =
                    self.streams.add_remote_stream(peer_id, kind, stream)
                {
                    self.report(e);
                }
            }
            SignalingEvent::PeerLeft { peer_id } => {
                log::debug!("Peer {} left", peer_id);
                self.peers.borrow_mut().remove(&peer_id);
                if let Err(e) = self.streams.remove_peer(&peer_id) {
                    self.report(e);
                }
                self.window_states
                    .retain(|key| key.peer_id() != Some(&peer_id));
            }
            SignalingEvent::Nickname { peer_id, nickname } => {
                self.nicknames.set(peer_id, nickname);
            }
            SignalingEvent::DialState(state) => {
                if self.is_hung_up() {
                    log::debug!("Ignoring {} dial state after hang-up", state);
                } else if state == DialState::HungUp {
                    self.hang_up(false);
                } else if state <= self.dial_state.get() {
                    log::debug!(
                        "Ignoring {} dial state, as the call is {} already",
                        state,
                        self.dial_state.get(),
                    );
                } else {
                    self.dial_state.set(state);
                }
            }
        }
    }
}

impl Drop for InnerSession {
    fn drop(&mut self) {
        log::debug!("CallSession dropped");
    }
}

/// Commits the `result` of a local stream acquisition into the session
/// behind the `weak_inner`.
///
/// A stream acquired for an already dropped session is released on drop.
fn on_acquired(
    weak_inner: &Weak<InnerSession>,
    kind: StreamType,
    result: AcquisitionResult,
) {
    let inner = match weak_inner.upgrade() {
        Some(inner) => inner,
        None => {
            log::debug!("CallSession is gone, dropping {} stream", kind);
            return;
        }
    };
    inner.in_flight.borrow_mut().remove(&kind);
    match result {
        Ok(stream) => inner.add_local_stream(kind, stream),
        Err(e) => inner.report(e),
    }
}
