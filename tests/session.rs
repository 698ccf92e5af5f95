mod utils;

use futures::{executor::block_on, StreamExt as _};
use medea_call::{
    media::AcquisitionError,
    nicknames::ME,
    notification::NotificationLevel,
    platform::SignalingEvent,
    DialState, PeerId, StreamKey, StreamType,
};

use self::utils::{stream, stuck_stream, Call};

#[test]
fn hang_up_releases_camera_and_desktop_exactly_once() {
    let mut call = Call::new();
    let (cam, cam_stops) = stream("cam");
    let (desktop, desktop_stops) = stream("desktop");
    call.session.add_local_stream(StreamType::Camera, cam);
    call.session.request_desktop_share().unwrap();
    call.run();
    call.acquired(Ok(desktop));
    assert_eq!(call.session.streams().local_count(), 2);

    call.session.hang_up();
    call.session.hang_up();
    call.run();

    assert_eq!(cam_stops.get(), 1);
    assert_eq!(desktop_stops.get(), 1);
    assert_eq!(call.session.streams().local_count(), 0);
    assert_eq!(call.hang_ups.get(), 1);
    assert_eq!(call.session.dial_state(), DialState::HungUp);
    assert!(!call.session.is_call_view_visible());
}

#[test]
fn desktop_share_resolved_after_hang_up_is_released() {
    let mut call = Call::new();
    let (desktop, stops) = stream("desktop");
    call.session.request_desktop_share().unwrap();
    call.run();

    call.session.hang_up();
    call.acquired(Ok(desktop));

    assert_eq!(stops.get(), 1);
    assert!(call
        .session
        .streams()
        .local_stream(StreamType::Desktop)
        .is_none());
}

#[test]
fn desktop_share_resolved_after_session_drop_is_released() {
    let mut call = Call::new();
    let (desktop, stops) = stream("desktop");
    call.session.request_desktop_share().unwrap();
    call.run();

    let utils::Call {
        session,
        mut pool,
        devices,
        ..
    } = call;
    drop(session);
    devices.resolve(Ok(desktop));
    pool.run_until_stalled();

    assert_eq!(stops.get(), 1);
}

#[test]
fn redundant_share_requests_are_dropped() {
    let mut call = Call::new();
    let (desktop, _) = stream("desktop");

    call.session.request_desktop_share().unwrap();
    call.session.request_desktop_share().unwrap();
    call.run();
    assert_eq!(call.requests(), 1);
    call.acquired(Ok(desktop));
    call.session.request_desktop_share().unwrap();
    call.run();

    assert_eq!(call.requests(), 2);
}

#[test]
fn failed_acquisition_is_notified_and_dismissible() {
    let mut call = Call::new();
    call.session
        .request_local_stream(StreamType::Camera)
        .unwrap();
    call.run();

    call.acquired(Err(tracerr::new!(AcquisitionError::PermissionDenied)));

    assert_eq!(call.session.streams().local_count(), 0);
    let notifications = call.session.notifications().all();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Error);
    assert!(call.session.dismiss(notifications[0].id).is_some());
    assert!(call.session.notifications().is_empty());
}

#[test]
fn stuck_track_does_not_stop_teardown() {
    let mut call = Call::new();
    let (stuck, stuck_stops) = stuck_stream("stuck");
    let (cam, cam_stops) = stream("cam");
    call.session.add_local_stream(StreamType::Desktop, stuck);
    call.session.add_local_stream(StreamType::Camera, cam);

    call.session.hang_up();
    call.run();

    assert_eq!(stuck_stops.get(), 1);
    assert_eq!(cam_stops.get(), 1);
    assert_eq!(call.hang_ups.get(), 1);
    assert_eq!(call.session.notifications().len(), 1);
}

#[test]
fn replacing_local_stream_releases_previous_one() {
    let call = Call::new();
    let (first, first_stops) = stream("first");
    let (second, second_stops) = stream("second");
    let mut additions = call.session.streams().on_add();
    let mut removals = call.session.streams().on_remove();

    call.session.add_local_stream(StreamType::Camera, first);
    call.session.add_local_stream(StreamType::Camera, second.clone());
    call.session.add_local_stream(StreamType::Camera, second);
    assert!(call.session.stop_local_stream(StreamType::Camera));

    assert_eq!(first_stops.get(), 1);
    assert_eq!(second_stops.get(), 1);
    let key = StreamKey::local(StreamType::Camera);
    let added: Vec<_> = block_on(additions.by_ref().take(2).collect());
    assert_eq!(added, vec![key.clone(), key.clone()]);
    assert_eq!(block_on(removals.next()), Some(key));
}

#[test]
fn remote_peers_follow_signaling() {
    let mut call = Call::new();
    let alice = PeerId::from("alice");
    let (cam, cam_stops) = stream("alice-cam");
    let (desktop, desktop_stops) = stream("alice-desktop");

    call.signal(SignalingEvent::Nickname {
        peer_id: ME.into(),
        nickname: "Me".to_owned(),
    });
    call.signal(SignalingEvent::PeerJoined {
        peer_id: alice.clone(),
    });
    call.signal(SignalingEvent::PeerStream {
        peer_id: alice.clone(),
        kind: StreamType::Camera,
        stream: cam,
    });
    call.signal(SignalingEvent::PeerStream {
        peer_id: alice.clone(),
        kind: StreamType::Desktop,
        stream: desktop,
    });
    call.signal(SignalingEvent::DialState(DialState::InCall));

    assert_eq!(call.session.nicknames().own().as_deref(), Some("Me"));
    assert_eq!(call.session.peers(), vec![alice.clone()]);
    assert_eq!(call.session.streams().remote_streams_of(&alice).len(), 2);
    assert_eq!(call.session.dial_state(), DialState::InCall);

    call.session
        .minimize_toggle(StreamKey::remote(alice.clone(), StreamType::Camera));
    call.signal(SignalingEvent::PeerLeft {
        peer_id: alice.clone(),
    });

    assert_eq!(cam_stops.get(), 1);
    assert_eq!(desktop_stops.get(), 1);
    assert!(call.session.streams().remote_streams().is_empty());
    assert!(call.session.window_states().all().is_empty());
}

#[test]
fn hang_up_releases_remote_streams() {
    let mut call = Call::new();
    let (cam, stops) = stream("bob-cam");
    call.signal(SignalingEvent::PeerStream {
        peer_id: "bob".into(),
        kind: StreamType::Camera,
        stream: cam,
    });

    call.session.hang_up();
    call.signal(SignalingEvent::DialState(DialState::InCall));

    assert_eq!(stops.get(), 1);
    assert!(call.session.streams().remote_streams().is_empty());
    assert_eq!(call.session.dial_state(), DialState::HungUp);
}

#[test]
fn window_states_and_settings_are_independent_of_streams() {
    let call = Call::new();
    let key = StreamKey::local(StreamType::Desktop);

    call.session.maximize(key.clone());
    call.session.minimize_toggle(key.clone());
    call.session.settings().use_flex_layout_toggle();

    let state = call.session.window_states().get(&key);
    assert!(state.minimized());
    assert!(!state.maximized());
    assert!(call.session.settings().get().use_flex_layout);
    assert!(call.session.settings().get().show_minimized_toolbar);
}
