use chrono::TimeZone;

use super::*;
use crate::clock::ManualClock;
use crate::conversation::AUTO_REPLY_LINES;
use crate::error::ValidationError;

fn start() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn session_with(reply_probability: f64) -> (Session, ManualClock) {
    let clock = ManualClock::new(start());
    let config = ChatConfig { reply_probability, rng_seed: Some(42), ..ChatConfig::default() };
    let session = Session::new(Fixture::seeded(), config, Arc::new(clock.clone())).unwrap();
    (session, clock)
}

fn selected_id(session: &Session) -> Option<String> {
    session.conversation().selection().map(|s| s.target().id().to_string())
}

// =============================================================
// Boot / navigation
// =============================================================

#[test]
fn boots_into_first_member_channel_and_marks_read() {
    let (session, _) = session_with(0.0);
    assert_eq!(selected_id(&session).as_deref(), Some("general"));
    assert_eq!(session.channels().channel("general").unwrap().unread_count, 0);
    assert_eq!(session.channels().channel("dev-team").unwrap().unread_count, 7);

    let Some(Selection::Channel(selected)) = session.snapshot().selection else {
        panic!("expected channel selection");
    };
    assert_eq!(selected.unread_count, 0);
}

#[test]
fn selection_matches_directory_after_mark_read() {
    let (mut session, _) = session_with(0.0);
    session.select_channel("dev-team").unwrap();
    let view = session.snapshot();
    let Some(Selection::Channel(selected)) = &view.selection else {
        panic!("expected channel selection");
    };
    let listed = view.public_channels.iter().find(|c| c.id == "dev-team").unwrap();
    assert_eq!(selected, listed);
    assert_eq!(selected.unread_count, 0);

    session.select_dm("dm-1-2").unwrap();
    let Some(Selection::Dm(dm)) = session.snapshot().selection else {
        panic!("expected dm selection");
    };
    assert_eq!(dm.unread_count, 0);
    assert_eq!(session.channels().dm("dm-1-2").unwrap().unread_count, 0);
}

#[test]
fn private_channel_requires_membership() {
    let (mut session, _) = session_with(0.0);
    assert!(session.select_channel("leadership").is_ok());

    let clock = ManualClock::new(start());
    let mut fixture = Fixture::seeded();
    fixture.current_user_id = "5".into();
    let mut outsider = Session::new(fixture, ChatConfig::default(), Arc::new(clock)).unwrap();
    let err = outsider.select_channel("leadership").unwrap_err();
    assert!(matches!(err, ChatError::NotFound { kind: EntityKind::Channel, .. }));
}

#[test]
fn unknown_targets_are_not_found() {
    let (mut session, _) = session_with(0.0);
    assert!(session.select_channel("nope").is_err());
    assert!(session.select_dm("dm-9-9").is_err());
    assert!(session.open_dm_with("5").is_err());
    assert_eq!(selected_id(&session).as_deref(), Some("general"));
}

#[test]
fn open_dm_with_resolves_either_order() {
    let (mut session, _) = session_with(0.0);
    session.open_dm_with("3").unwrap();
    assert_eq!(selected_id(&session).as_deref(), Some("dm-1-3"));
}

#[test]
fn activate_routes_each_hit_kind() {
    let (mut session, _) = session_with(0.0);

    session.activate(&SearchHit::Channel { id: "random".into() }).unwrap();
    assert_eq!(selected_id(&session).as_deref(), Some("random"));

    session.activate(&SearchHit::User { id: "2".into() }).unwrap();
    assert_eq!(selected_id(&session).as_deref(), Some("dm-1-2"));

    session
        .activate(&SearchHit::Message { id: "msg-3".into(), target: MessageTarget::Channel("design".into()) })
        .unwrap();
    assert_eq!(selected_id(&session).as_deref(), Some("design"));
    assert!(session.search_state().query().is_empty());
}

// =============================================================
// Messages / effects
// =============================================================

#[test]
fn send_then_fire_delivers_and_clears_loading() {
    let (mut session, _) = session_with(0.0);
    let before = session.conversation().messages().len();

    let effects = session.send("hello").unwrap();
    assert_eq!(effects.len(), 1);
    assert!(session.snapshot().loading);

    let follow_ups = session.fire(effects.into_iter().next().unwrap());
    assert!(follow_ups.is_empty());

    let view = session.snapshot();
    assert!(!view.loading);
    assert_eq!(view.messages.len(), before + 1);
    let last = view.messages.last().unwrap();
    assert_eq!(last.content, "hello");
    assert_eq!(last.author_id, "1");
}

#[test]
fn dm_reply_comes_from_the_partner() {
    let (mut session, clock) = session_with(1.0);
    session.select_dm("dm-1-4").unwrap();

    let deliver = session.send("ping").unwrap().remove(0);
    let mut follow_ups = session.fire(deliver);
    let reply = follow_ups.remove(0);
    let Effect::AutoReply { reply: ref auto, after } = reply else {
        panic!("expected auto-reply");
    };
    assert_eq!(auto.author_id, "4");
    assert!(AUTO_REPLY_LINES.contains(&auto.content.as_str()));
    assert!(after >= session.config.reply_min_delay && after < session.config.reply_max_delay);

    clock.advance(chrono::Duration::seconds(2));
    session.fire(reply);
    let last = session.conversation().messages().last().unwrap();
    assert_eq!(last.author_id, "4");
    assert!(last.id.ends_with("-response"));
    assert_eq!(last.timestamp, start() + chrono::Duration::seconds(2));
}

#[test]
fn channel_repliers_exclude_current_user() {
    let (session, _) = session_with(0.0);
    let repliers = session.repliers(&MessageTarget::Channel("dev-team".into()));
    assert_eq!(repliers, vec!["3".to_string(), "4".to_string()]);
}

#[test]
fn blank_send_schedules_nothing() {
    let (mut session, _) = session_with(0.0);
    let err = session.send("   ").unwrap_err();
    assert_eq!(err, ChatError::Validation(ValidationError::EmptyMessage));
    assert!(!session.snapshot().loading);
}

// =============================================================
// Channels
// =============================================================

#[test]
fn created_channel_appears_in_sidebar() {
    let (mut session, clock) = session_with(0.0);
    let channel = session.create_channel("Project X", "Skunkworks", true).unwrap();
    assert_eq!(channel.name, "project-x");
    assert_eq!(channel.created_at, clock.now());

    let view = session.snapshot();
    assert!(view.private_channels.iter().any(|c| c.id == channel.id));
    assert!(view.public_channels.iter().all(|c| c.id != channel.id));
}

#[test]
fn join_refreshes_selected_channel() {
    let (mut session, _) = session_with(0.0);
    session.select_channel("design").unwrap();
    assert!(session.join_channel("design").unwrap());

    let Some(Selection::Channel(selected)) = session.conversation().selection() else {
        panic!("expected channel selection");
    };
    assert!(selected.has_member("1"));
}

// =============================================================
// Search
// =============================================================

#[test]
fn stale_search_effect_is_ignored() {
    let (mut session, _) = session_with(0.0);
    let first = session.search("des").remove(0);
    let second = session.search("design").remove(0);

    session.fire(first);
    assert!(session.search_state().results().is_empty());
    assert!(session.search_state().is_pending());

    session.fire(second);
    assert_eq!(session.search_state().results(), session.search_now("design").as_slice());
    assert!(!session.search_state().is_pending());
}

#[test]
fn search_sees_delivered_messages() {
    let (mut session, _) = session_with(0.0);
    let deliver = session.send("zebra crossing").unwrap().remove(0);
    session.fire(deliver);
    let results = session.search_now("zebra");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].subtitle, "From John Doe in #general");
}

#[test]
fn snapshot_serializes_to_json() {
    let (session, _) = session_with(0.0);
    let json = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(json["current_user_id"], "1");
    assert_eq!(json["selection"]["kind"], "channel");
    assert_eq!(json["public_channels"].as_array().unwrap().len(), 3);
    assert_eq!(json["private_channels"].as_array().unwrap().len(), 1);
}

#[test]
fn leaving_selected_private_channel_drops_selection() {
    let (mut session, _) = session_with(0.0);
    session.select_channel("leadership").unwrap();
    assert!(session.leave_channel("leadership").unwrap());

    assert!(session.conversation().selection().is_none());
    assert!(session.conversation().messages().is_empty());
    let err = session.send("still here?").unwrap_err();
    assert_eq!(err, ChatError::Validation(ValidationError::NoSelection));
    assert!(session.select_channel("leadership").is_err());
}

#[test]
fn leaving_selected_public_channel_keeps_it_open() {
    let (mut session, _) = session_with(0.0);
    session.select_channel("random").unwrap();
    assert!(session.leave_channel("random").unwrap());

    let Some(Selection::Channel(selected)) = session.conversation().selection() else {
        panic!("expected channel selection");
    };
    assert!(!selected.has_member("1"));
    assert!(session.send("lurking").is_ok());
}
