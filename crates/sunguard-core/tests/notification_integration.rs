//! Integration tests for the notification decision engine driven by a full day of events.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sunguard_core::notify::{
    replay, reapply_key, LeaveHomeState, NotificationStatus, ReapplyState, RecordingSink,
};
use sunguard_core::{
    ActivityLevel, Config, DecisionConfig, EngineEvent, ForecastWindow, NotificationCommand,
    NotificationDecisionEngine, NotificationKind, ProtectionTracker, Quantity,
    SharedDecisionEngine, SunscreenApplication, SuppressionReason, UvSample,
};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 1, hour, minute, 0).unwrap()
}

fn uv(time: DateTime<Utc>, index: f64) -> EngineEvent {
    EngineEvent::UvUpdated {
        sample: UvSample::new(time, index, 0.0),
    }
}

fn engine() -> NotificationDecisionEngine {
    NotificationDecisionEngine::new(DecisionConfig::default(), ProtectionTracker::default(), true)
}

#[test]
fn beach_day() {
    let mut e = engine();
    let sink = RecordingSink::new();

    e.handle(&EngineEvent::ForecastUpdated {
        window: ForecastWindow {
            start: Some(at(9, 0)),
            end: Some(at(17, 0)),
        },
    })
    .dispatch(&sink);
    e.handle(&uv(at(9, 0), 4.0)).dispatch(&sink);

    // Leave at 09:30: one alert.
    let d = e.handle(&EngineEvent::GeofenceExited { at: at(9, 30) });
    assert_eq!(d.delivered().count(), 1);
    d.dispatch(&sink);

    // Apply sunscreen while out; reminder lands two hours later.
    let first = SunscreenApplication::new(50.0, Quantity::Normal, ActivityLevel::Normal, at(9, 35));
    let d = e.handle(&EngineEvent::SunscreenApplied {
        application: first.clone(),
    });
    let scheduled: Vec<_> = d.scheduled().collect();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].trigger_at, at(11, 35));
    assert!(scheduled[0].body.contains("until 17:00"));
    d.dispatch(&sink);

    // Swim at 10:30 and reapply as active: old reminder cancelled, new one at 11:30.
    let second = SunscreenApplication::new(50.0, Quantity::Heavy, ActivityLevel::Active, at(10, 30));
    let d = e.handle(&EngineEvent::SunscreenApplied {
        application: second.clone(),
    });
    assert_eq!(d.cancelled().collect::<Vec<_>>(), vec![reapply_key(first.id).as_str()]);
    assert_eq!(d.scheduled().next().unwrap().trigger_at, at(11, 30));
    d.dispatch(&sink);

    // The superseded timer fires anyway; nothing is shown.
    let d = e.handle(&EngineEvent::ReminderDue {
        dedupe_key: reapply_key(first.id),
        at: at(11, 35),
    });
    assert!(d.commands.is_empty());
    assert_eq!(d.suppressed[0].reason, SuppressionReason::NotCurrent);

    // The current one fires under high UV.
    e.handle(&uv(at(11, 0), 8.0)).dispatch(&sink);
    let d = e.handle(&EngineEvent::ReminderDue {
        dedupe_key: reapply_key(second.id),
        at: at(11, 30),
    });
    assert_eq!(d.delivered().count(), 1);
    d.dispatch(&sink);

    e.handle(&EngineEvent::NotificationDelivered {
        dedupe_key: reapply_key(second.id),
        at: at(11, 31),
    });
    assert_eq!(
        e.ledger().get(&reapply_key(second.id)).unwrap().status,
        NotificationStatus::Delivered
    );

    let delivered = sink
        .commands()
        .iter()
        .filter(|c| matches!(c, NotificationCommand::Deliver { .. }))
        .count();
    assert_eq!(delivered, 2);
    assert_eq!(e.ledger().live(NotificationKind::Reapply).count(), 0);
}

#[test]
fn reminder_suppressed_when_clouds_roll_in() {
    let mut e = engine();
    let app = SunscreenApplication::new(30.0, Quantity::Normal, ActivityLevel::Normal, at(14, 0));
    e.handle(&EngineEvent::SunscreenApplied {
        application: app.clone(),
    });
    e.handle(&uv(at(15, 50), 2.0));

    let d = e.handle(&EngineEvent::ReminderDue {
        dedupe_key: reapply_key(app.id),
        at: at(16, 0),
    });
    assert!(d.commands.is_empty());
    assert!(matches!(
        e.reapply_state(),
        ReapplyState::Suppressed {
            reason: SuppressionReason::UvBelowThreshold,
            ..
        }
    ));
    assert_eq!(
        e.ledger().get(&reapply_key(app.id)).unwrap().status,
        NotificationStatus::Suppressed
    );
}

#[test]
fn removing_the_current_application_cancels_its_reminder() {
    let mut e = engine();
    let app = SunscreenApplication::new(30.0, Quantity::Light, ActivityLevel::Sedentary, at(10, 0));
    e.handle(&EngineEvent::SunscreenApplied {
        application: app.clone(),
    });
    let d = e.handle(&EngineEvent::SunscreenRemoved {
        application_id: app.id,
        at: at(10, 5),
    });
    assert_eq!(d.cancelled().count(), 1);
    assert_eq!(e.reapply_state(), &ReapplyState::Idle);
    assert!(e.pending_reminder_key().is_none());
}

fn live_reminders(e: &NotificationDecisionEngine) -> usize {
    e.ledger().live(NotificationKind::Reapply).count()
}

#[test]
fn redelivered_application_event_changes_nothing() {
    let mut e = engine();
    let app = SunscreenApplication::new(30.0, Quantity::Normal, ActivityLevel::Normal, at(9, 0));
    let event = EngineEvent::SunscreenApplied { application: app.clone() };
    assert_eq!(e.handle(&event).scheduled().count(), 1);
    assert!(e.handle(&event).is_empty());
    assert_eq!(live_reminders(&e), 1);

    e.handle(&uv(at(10, 30), 6.0));
    let d = e.handle(&EngineEvent::ReminderDue {
        dedupe_key: reapply_key(app.id),
        at: at(11, 0),
    });
    assert_eq!(d.delivered().count(), 1);
    assert!(live_reminders(&e) <= 1);
}

#[test]
fn reminder_withheld_by_revoked_permission_leaves_no_live_record() {
    let mut e = engine();
    let first = SunscreenApplication::new(30.0, Quantity::Normal, ActivityLevel::Normal, at(9, 0));
    e.handle(&EngineEvent::SunscreenApplied { application: first.clone() });
    e.handle(&uv(at(10, 0), 8.0));
    e.handle(&EngineEvent::PermissionChanged { granted: false, at: at(10, 30) });
    e.handle(&EngineEvent::ReminderDue {
        dedupe_key: reapply_key(first.id),
        at: at(11, 0),
    });
    assert_eq!(live_reminders(&e), 0);

    e.handle(&EngineEvent::PermissionChanged { granted: true, at: at(11, 5) });
    let second = SunscreenApplication::new(30.0, Quantity::Normal, ActivityLevel::Normal, at(11, 10));
    e.handle(&EngineEvent::SunscreenApplied { application: second.clone() });
    assert_eq!(live_reminders(&e), 1);
    assert_eq!(e.pending_reminder_key(), Some(reapply_key(second.id)));
}

#[test]
fn reminder_withheld_by_disabled_kind_leaves_no_live_record() {
    let mut e = engine();
    let first = SunscreenApplication::new(30.0, Quantity::Normal, ActivityLevel::Normal, at(9, 0));
    e.handle(&EngineEvent::SunscreenApplied { application: first.clone() });
    e.reconfigure(
        DecisionConfig {
            reapply_enabled: false,
            ..DecisionConfig::default()
        },
        ProtectionTracker::default(),
    );
    e.handle(&uv(at(10, 0), 8.0));
    let d = e.handle(&EngineEvent::ReminderDue {
        dedupe_key: reapply_key(first.id),
        at: at(11, 0),
    });
    assert_eq!(d.suppressed[0].reason, SuppressionReason::KindDisabled);
    assert_eq!(live_reminders(&e), 0);
}

#[test]
fn reapplying_after_an_unconfirmed_reminder_cancels_it() {
    let mut e = engine();
    let first = SunscreenApplication::new(30.0, Quantity::Normal, ActivityLevel::Normal, at(9, 0));
    e.handle(&EngineEvent::SunscreenApplied { application: first.clone() });
    e.handle(&uv(at(10, 0), 8.0));
    e.handle(&EngineEvent::ReminderDue {
        dedupe_key: reapply_key(first.id),
        at: at(11, 0),
    });
    assert!(matches!(e.reapply_state(), ReapplyState::Notified { .. }));

    let second = first.quick_reapply(at(11, 5));
    let d = e.handle(&EngineEvent::SunscreenApplied { application: second });
    assert_eq!(d.cancelled().collect::<Vec<_>>(), vec![reapply_key(first.id).as_str()]);
    assert_eq!(live_reminders(&e), 1);
    assert_eq!(
        e.ledger().get(&reapply_key(first.id)).unwrap().status,
        NotificationStatus::Cancelled
    );
}

#[test]
fn replay_matches_live_engine() {
    let app = SunscreenApplication::new(30.0, Quantity::Normal, ActivityLevel::Normal, at(9, 0));
    let log = vec![
        uv(at(8, 0), 2.0),
        EngineEvent::GeofenceExited { at: at(8, 30) },
        uv(at(9, 0), 5.0),
        EngineEvent::SunscreenApplied { application: app },
        EngineEvent::GeofenceEntered { at: at(12, 0) },
    ];

    let mut live = engine();
    for event in &log {
        live.handle(event);
    }
    let replayed = replay(DecisionConfig::default(), ProtectionTracker::default(), true, &log);

    assert_eq!(replayed.leave_home_state(), live.leave_home_state());
    assert_eq!(replayed.reapply_state(), live.reapply_state());
    assert_eq!(replayed.ledger().records(), live.ledger().records());
    assert_eq!(replayed.leave_home_state(), &LeaveHomeState::Idle);
}

#[test]
fn engine_built_from_config_respects_preferences() {
    let mut config = Config::default();
    config.apply("notifications.reapply", "false").unwrap();
    let mut e = NotificationDecisionEngine::new(config.decision_config(), config.tracker(), true);

    let app = SunscreenApplication::new(30.0, Quantity::Normal, ActivityLevel::Normal, at(9, 0));
    let d = e.handle(&EngineEvent::SunscreenApplied { application: app });
    assert!(d.commands.is_empty());
    assert_eq!(d.suppressed[0].reason, SuppressionReason::KindDisabled);
}

#[test]
fn shared_engine_serializes_racing_callbacks() {
    let shared = SharedDecisionEngine::new(engine());
    shared.handle(&uv(at(9, 0), 7.0));
    let sink = RecordingSink::new();

    std::thread::scope(|s| {
        for i in 0..4 {
            let shared = shared.clone();
            let sink = &sink;
            s.spawn(move || {
                shared.handle_and_dispatch(&EngineEvent::GeofenceExited { at: at(9, i) }, sink);
            });
        }
    });

    assert_eq!(sink.commands().len(), 1);
    assert!(matches!(
        shared.snapshot().leave_home_state(),
        LeaveHomeState::Notified { episode: 1, .. }
    ));
}
