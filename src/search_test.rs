use super::*;
use crate::fixture::Fixture;

struct World {
    users: UserDirectory,
    channels: ChannelDirectory,
    messages: Vec<Message>,
}

impl World {
    fn seeded() -> Self {
        let fixture = Fixture::seeded();
        Self {
            users: UserDirectory::new(fixture.users, fixture.current_user_id).unwrap(),
            channels: ChannelDirectory::new(fixture.channels, fixture.direct_messages).unwrap(),
            messages: fixture.messages,
        }
    }

    fn as_user(user_id: &str) -> Self {
        let fixture = Fixture::seeded();
        Self {
            users: UserDirectory::new(fixture.users, user_id).unwrap(),
            channels: ChannelDirectory::new(fixture.channels, fixture.direct_messages).unwrap(),
            messages: fixture.messages,
        }
    }

    fn corpus(&self) -> SearchCorpus<'_> {
        SearchCorpus { users: &self.users, channels: &self.channels, messages: &self.messages }
    }

    fn run(&self, query: &str) -> Vec<SearchResult> {
        search(query, self.corpus(), 20)
    }
}

fn titles(results: &[SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.title.as_str()).collect()
}

// =============================================================
// search
// =============================================================

#[test]
fn empty_query_is_empty() {
    let world = World::seeded();
    assert!(world.run("").is_empty());
    assert!(world.run("   ").is_empty());
}

#[test]
fn channels_come_first_in_title_order() {
    let world = World::seeded();
    let results = world.run("team");
    let kinds: Vec<SearchKind> = results.iter().map(SearchResult::kind).collect();
    assert_eq!(kinds, vec![SearchKind::Channel, SearchKind::Channel, SearchKind::Message]);
    assert_eq!(&titles(&results)[..2], &["dev-team", "leadership"]);
}

#[test]
fn only_member_channels_are_searched() {
    let world = World::seeded();
    let results = world.run("design");
    assert!(results.iter().all(|r| r.kind() != SearchKind::Channel));
    assert_eq!(results[0].hit, SearchHit::User { id: "3".into() });
    assert_eq!(results[0].subtitle, "UX Designer");
}

#[test]
fn current_user_is_not_a_result() {
    let world = World::seeded();
    let results = world.run("john");
    assert!(!results.contains(&SearchResult {
        hit: SearchHit::User { id: "1".into() },
        title: "John Doe".into(),
        subtitle: "Senior Developer".into(),
        timestamp: None,
    }));
    assert!(results.iter().any(|r| r.hit == SearchHit::User { id: "3".into() }));
}

#[test]
fn match_is_case_insensitive() {
    let world = World::seeded();
    let results = world.run("SARAH");
    assert_eq!(results[0].hit, SearchHit::User { id: "2".into() });
    assert!(results.iter().any(|r| matches!(&r.hit, SearchHit::Message { id, .. } if id == "msg-8")));
}

#[test]
fn messages_are_newest_first() {
    let world = World::seeded();
    let results = world.run("thanks");
    let ids: Vec<&str> = results
        .iter()
        .filter_map(|r| match &r.hit {
            SearchHit::Message { id, .. } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["msg-10", "msg-2"]);
}

#[test]
fn message_subtitles_name_author_and_place() {
    let world = World::seeded();
    let mockups = world.run("mockups");
    assert_eq!(mockups[0].subtitle, "From Mike Johnson in #design");

    let feedback = world.run("user feedback");
    assert_eq!(feedback[0].subtitle, "From John Doe in Direct Message");
}

#[test]
fn messages_outside_reach_are_hidden() {
    let outsider = World::as_user("5");
    assert!(outsider.run("user feedback").is_empty());
    assert!(!outsider.run("mockups").is_empty());

    let participant = World::as_user("2");
    assert_eq!(participant.run("user feedback").len(), 1);
}

#[test]
fn long_message_titles_are_truncated() {
    let world = World::seeded();
    let results = world.run("welcome everyone");
    let title = &results[0].title;
    assert!(title.ends_with("..."));
    assert_eq!(title.chars().count(), 63);
}

#[test]
fn results_respect_limit_and_ranking() {
    let world = World::seeded();
    let all = search("e", world.corpus(), 100);
    assert!(all.len() > 5);

    let capped = search("e", world.corpus(), 5);
    assert_eq!(capped.len(), 5);
    assert_eq!(capped.as_slice(), &all[..5]);

    let first_non_channel = all
        .iter()
        .position(|r| r.kind() != SearchKind::Channel)
        .unwrap_or(all.len());
    assert!(all[first_non_channel..].iter().all(|r| r.kind() != SearchKind::Channel));
}

#[test]
fn default_cap_is_twenty() {
    let mut world = World::seeded();
    let base = world.messages[0].clone();
    for i in 0..40 {
        let mut m = base.clone();
        m.id = format!("bulk-{i}");
        world.messages.push(m);
    }
    assert_eq!(world.run("welcome").len(), 20);
}

// =============================================================
// SearchDebouncer
// =============================================================

#[test]
fn latest_submission_wins() {
    let mut debouncer = SearchDebouncer::default();
    let Some(Effect::RunSearch { ticket: first, .. }) = debouncer.submit("des", Duration::from_millis(300)) else {
        panic!("expected scheduled search");
    };
    let Some(Effect::RunSearch { ticket: second, .. }) = debouncer.submit("design", Duration::from_millis(300))
    else {
        panic!("expected scheduled search");
    };

    assert!(!debouncer.is_current(&first));
    assert!(debouncer.is_current(&second));

    let world = World::seeded();
    assert!(debouncer.apply(&second, world.run(&second.query)));
    assert!(!debouncer.apply(&first, world.run(&first.query)));
    assert_eq!(debouncer.results(), world.run("design").as_slice());
    assert!(!debouncer.is_pending());
}

#[test]
fn blank_submission_clears_and_supersedes() {
    let mut debouncer = SearchDebouncer::default();
    let Some(Effect::RunSearch { ticket, .. }) = debouncer.submit("team", Duration::ZERO) else {
        panic!("expected scheduled search");
    };
    assert!(debouncer.is_pending());

    assert!(debouncer.submit("  ", Duration::ZERO).is_none());
    assert!(!debouncer.is_pending());
    assert!(!debouncer.apply(&ticket, World::seeded().run("team")));
    assert!(debouncer.results().is_empty());
}

#[test]
fn clear_drops_query_and_results() {
    let mut debouncer = SearchDebouncer::default();
    let Some(Effect::RunSearch { ticket, .. }) = debouncer.submit("team", Duration::ZERO) else {
        panic!("expected scheduled search");
    };
    debouncer.apply(&ticket, World::seeded().run("team"));
    debouncer.clear();
    assert_eq!(debouncer.query(), "");
    assert!(debouncer.results().is_empty());
}
