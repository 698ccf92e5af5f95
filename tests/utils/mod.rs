//! Hand-written platform doubles driving a [`CallSession`] in tests.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use futures::{
    channel::{mpsc, oneshot},
    executor::LocalPool,
    future::LocalBoxFuture,
    stream::LocalBoxStream,
    FutureExt as _,
};
use medea_call::{
    media::AcquisitionError,
    platform::{
        self, AcquisitionResult, MediaDevices, MediaStreamTrack,
        SignalingEvent, Transport,
    },
    CallSession, MediaStreamHandle, Settings,
};

/// [`MediaStreamTrack`] counting how many times it was stopped.
pub struct FakeTrack {
    id: String,
    stops: Rc<Cell<usize>>,
    fail: bool,
}

impl MediaStreamTrack for FakeTrack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn stop(&self) -> Result<(), platform::Error> {
        self.stops.set(self.stops.get() + 1);
        if self.fail {
            Err(platform::Error::new("InvalidStateError", "device is stuck"))
        } else {
            Ok(())
        }
    }
}

/// Creates a new single track [`MediaStreamHandle`] and a counter of its
/// track stops.
pub fn stream(id: &str) -> (MediaStreamHandle, Rc<Cell<usize>>) {
    new_stream(id, false)
}

/// Creates a new single track [`MediaStreamHandle`], whose track fails to
/// stop, and a counter of its track stops.
pub fn stuck_stream(id: &str) -> (MediaStreamHandle, Rc<Cell<usize>>) {
    new_stream(id, true)
}

fn new_stream(id: &str, fail: bool) -> (MediaStreamHandle, Rc<Cell<usize>>) {
    let stops = Rc::new(Cell::new(0));
    let track: Box<dyn MediaStreamTrack> = Box::new(FakeTrack {
        id: format!("{}-track", id),
        stops: Rc::clone(&stops),
        fail,
    });
    (MediaStreamHandle::new(id, vec![track]), stops)
}

/// [`Transport`] fed with [`SignalingEvent`]s by the test.
pub struct FakeTransport {
    events: RefCell<Option<mpsc::UnboundedReceiver<SignalingEvent>>>,
    hang_ups: Rc<Cell<usize>>,
}

impl Transport for FakeTransport {
    fn on_event(&self) -> LocalBoxStream<'static, SignalingEvent> {
        match self.events.borrow_mut().take() {
            Some(rx) => Box::pin(rx),
            None => Box::pin(futures::stream::empty()),
        }
    }

    fn hang_up(&self) {
        self.hang_ups.set(self.hang_ups.get() + 1);
    }
}

/// [`MediaDevices`] resolving acquisitions in the order they are requested
/// with the results pushed by the test.
#[derive(Default)]
pub struct FakeMediaDevices {
    pending: RefCell<VecDeque<oneshot::Sender<AcquisitionResult>>>,
    requests: Cell<usize>,
}

impl FakeMediaDevices {
    /// Resolves the oldest pending acquisition with the provided `result`.
    pub fn resolve(&self, result: AcquisitionResult) {
        let tx = self.pending.borrow_mut().pop_front().unwrap();
        let _ = tx.send(result);
    }

    fn acquire(&self) -> LocalBoxFuture<'static, AcquisitionResult> {
        self.requests.set(self.requests.get() + 1);
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push_back(tx);
        rx.map(|res| {
            res.unwrap_or_else(|_| {
                Err(tracerr::new!(AcquisitionError::Unsupported))
            })
        })
        .boxed_local()
    }
}

impl MediaDevices for FakeMediaDevices {
    fn get_user_media(&self) -> LocalBoxFuture<'static, AcquisitionResult> {
        self.acquire()
    }

    fn get_display_media(&self) -> LocalBoxFuture<'static, AcquisitionResult> {
        self.acquire()
    }
}

/// [`CallSession`] wired to the fake platform.
pub struct Call {
    pub session: CallSession,
    pub pool: LocalPool,
    pub events: mpsc::UnboundedSender<SignalingEvent>,
    pub hang_ups: Rc<Cell<usize>>,
    pub devices: Rc<FakeMediaDevices>,
}

impl Call {
    /// Creates a new initialized [`CallSession`] over the fake platform.
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let (events, rx) = mpsc::unbounded();
        let hang_ups = Rc::new(Cell::new(0));
        let devices = Rc::new(FakeMediaDevices::default());
        let transport = Rc::new(FakeTransport {
            events: RefCell::new(Some(rx)),
            hang_ups: Rc::clone(&hang_ups),
        });
        let session = CallSession::new(
            transport,
            Rc::clone(&devices) as Rc<dyn MediaDevices>,
            Rc::new(pool.spawner()),
            Settings::default(),
        );
        session.initialize_session().unwrap();
        Self {
            session,
            pool,
            events,
            hang_ups,
            devices,
        }
    }

    /// Delivers the provided [`SignalingEvent`] and runs all the ready tasks.
    pub fn signal(&mut self, event: SignalingEvent) {
        self.events.unbounded_send(event).unwrap();
        self.pool.run_until_stalled();
    }

    /// Resolves the oldest pending acquisition with the provided `result` and
    /// runs all the ready tasks.
    pub fn acquired(&mut self, result: AcquisitionResult) {
        self.devices.resolve(result);
        self.pool.run_until_stalled();
    }

    /// Returns count of the acquisitions requested so far.
    pub fn requests(&self) -> usize {
        self.devices.requests.get()
    }

    /// Runs all the ready tasks.
    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }
}
