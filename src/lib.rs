//! Client-side state core of a Medea call.
//!
//! Tracks local and remote media streams of a call, their window
//! presentation states and user-facing notifications, and tears all of them
//! down on hang-up, releasing every acquired media device exactly once.
//!
//! Everything here is single-threaded (`Rc`/`RefCell` based) and meant to be
//! driven by a cooperative event loop, like the one of a browser tab.

// TODO: Remove `clippy::must_use_candidate` once the issue below is resolved:
//       https://github.com/rust-lang/rust-clippy/issues/4779
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]
#![cfg_attr(not(feature = "mockable"), warn(missing_docs))]
#![cfg_attr(feature = "mockable", allow(missing_docs))]

pub mod media;
pub mod nicknames;
pub mod notification;
pub mod platform;
pub mod session;
pub mod settings;
pub mod utils;
pub mod window_state;

#[doc(inline)]
pub use self::{
    media::{
        MediaStreamHandle, PeerId, StreamKey, StreamOwner, StreamRegistry,
        StreamType,
    },
    nicknames::Nicknames,
    notification::{Notification, NotificationId, NotificationLevel},
    session::{CallSession, DialState},
    settings::{Settings, SettingsStore},
    utils::CallError,
    window_state::{WindowState, WindowStates},
};
