//! Two participants sharing one disc over a loopback room.

use disc_core::transport::{LoopbackInbox, LoopbackTransport};
use disc_core::{
    CatchOutcome, DiscConfig, FrameEvent, InputAction, LoopbackHub, NetworkMessage, Ownership,
    PHYSICS_DT, Quat, Session, Vec3, Viewpoint,
};

fn join(hub: &LoopbackHub, user: &str) -> (Session<LoopbackTransport>, LoopbackInbox) {
    let (transport, inbox) = hub.join();
    (Session::new(user, DiscConfig::default(), transport), inbox)
}

fn messages(inbox: &LoopbackInbox) -> Vec<FrameEvent> {
    inbox.drain().into_iter().map(FrameEvent::Message).collect()
}

#[test]
fn thrown_disc_is_caught_clean_by_the_other_peer() {
    let hub = LoopbackHub::new();
    let (mut a, a_inbox) = join(&hub, "alice17");
    let (mut b, b_inbox) = join(&hub, "bob4");

    // A picks the disc up at the spawn and throws it from (8, 1, 8) along +z.
    let a_view = Viewpoint::new(Vec3::new(8.0, 1.0, 7.0), Quat::IDENTITY);
    a.frame(PHYSICS_DT, &a_view, [FrameEvent::Input(InputAction::Grab)]);
    a.frame(
        PHYSICS_DT,
        &a_view,
        [FrameEvent::Input(InputAction::Throw {
            direction: Vec3::FORWARD,
        })],
    );
    a_inbox.drain();

    // B sees the pick (A's streak is 1), then the throw.
    let sent = b_inbox.drain();
    assert_eq!(sent.len(), 2);
    let Some(NetworkMessage::Throw(throw)) = NetworkMessage::decode(&sent[1]).unwrap() else {
        panic!("expected a throw");
    };
    assert_eq!(throw.pos, Vec3::new(8.0, 1.0, 8.0));
    assert_eq!(throw.dir, Vec3::FORWARD);

    // B's viewpoint is irrelevant until it tries to catch.
    let mut b_view = Viewpoint::new(Vec3::new(8.0, 1.0, 30.0), Quat::IDENTITY);
    let report = b.frame(
        PHYSICS_DT,
        &b_view,
        sent.into_iter().map(FrameEvent::Message),
    );
    assert_eq!(report.ownership, Ownership::InFlight);
    assert!(!b.disc().touched_ground());
    let v = b.world().disc_velocity();
    assert!(v.z > 30.0 && v.x.abs() < 1e-3);

    // Step B until the disc has dropped to half a metre.
    let mut frames = 0;
    while b.disc().pose().position.y > 0.5 {
        b.frame(PHYSICS_DT, &b_view, Vec::new());
        frames += 1;
        assert!(frames < 120, "disc never came down");
    }
    assert!(!b.disc().touched_ground());
    assert_eq!(b.disc().ownership(), Ownership::InFlight);

    // B stands next to the disc and catches it.
    let at = b.disc().pose().position;
    b_view.position = Vec3::new(at.x, (at.y + 0.5).max(1.0), at.z + 1.0);
    let report = b.frame(PHYSICS_DT, &b_view, [FrameEvent::Input(InputAction::PickUp)]);
    assert_eq!(report.ownership, Ownership::HeldLocal);
    assert_eq!(report.feedback.len(), 1);
    assert_eq!(report.feedback[0].outcome, CatchOutcome::Good);
    assert_eq!(report.feedback[0].outcome.as_str(), "good");
    assert_eq!(report.streak, 2);

    // A follows: held by B, streak taken from B's message.
    let report = a.frame(PHYSICS_DT, &a_view, messages(&a_inbox));
    assert_eq!(report.ownership, Ownership::HeldRemote);
    assert_eq!(report.streak, 2);
    assert!(!report.visible);
}

#[test]
fn fresh_peer_catching_a_throw_starts_its_streak_at_one() {
    let hub = LoopbackHub::new();
    let (mut b, _b_inbox) = join(&hub, "bob4");

    let throw = NetworkMessage::Throw(disc_core::protocol::ThrowData {
        user: "alice17".into(),
        pos: Vec3::new(8.0, 1.0, 8.0),
        rot: Quat::IDENTITY,
        dir: Vec3::FORWARD,
        timestamp: 0,
    });
    let view = Viewpoint::new(Vec3::new(8.0, 1.0, 9.0), Quat::IDENTITY);
    b.frame(PHYSICS_DT, &view, [FrameEvent::Message(throw.encode().unwrap())]);

    let report = b.frame(PHYSICS_DT, &view, [FrameEvent::Input(InputAction::PickUp)]);
    assert_eq!(report.feedback[0].outcome, CatchOutcome::Good);
    assert_eq!(report.streak, 1);
}

#[test]
fn peers_replaying_the_same_throw_agree() {
    let hub = LoopbackHub::new();
    let (mut a, _a_inbox) = join(&hub, "alice17");
    let (mut b, _b_inbox) = join(&hub, "bob4");

    let text = NetworkMessage::Throw(disc_core::protocol::ThrowData {
        user: "carol9".into(),
        pos: Vec3::new(8.0, 1.0, 8.0),
        rot: Quat::IDENTITY,
        dir: Vec3::new(0.6, 0.0, 0.8),
        timestamp: 0,
    })
    .encode()
    .unwrap();

    let view = Viewpoint::default();
    a.frame(PHYSICS_DT, &view, [FrameEvent::Message(text.clone())]);
    b.frame(PHYSICS_DT, &view, [FrameEvent::Message(text)]);
    for _ in 0..90 {
        a.frame(PHYSICS_DT, &view, Vec::new());
        b.frame(PHYSICS_DT, &view, Vec::new());
    }
    assert_eq!(a.world().compute_hash(), b.world().compute_hash());
    assert_eq!(a.disc().pose(), b.disc().pose());
}
