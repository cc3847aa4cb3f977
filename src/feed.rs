//! Presentation helpers for the message feed and the quick switcher.
//!
//! Pure functions over model values. All calendar math is done in UTC so
//! output does not depend on the host timezone.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::model::Message;

/// Consecutive messages from one author closer than this share an avatar.
pub const AVATAR_GAP_SECS: i64 = 5 * 60;

/// Emoji offered by the reaction picker.
pub const QUICK_REACTIONS: [&str; 8] = ["👍", "❤️", "😂", "😮", "😢", "😡", "👏", "🎉"];

/// Messages that fall on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub messages: Vec<Message>,
}

/// Bucket messages by UTC day, keeping groups in first-seen order and
/// messages in input order within each group.
#[must_use]
pub fn group_by_day(messages: &[Message]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for message in messages {
        let day = message.timestamp.date_naive();
        match groups.iter_mut().find(|g| g.day == day) {
            Some(group) => group.messages.push(message.clone()),
            None => groups.push(DayGroup { day, messages: vec![message.clone()] }),
        }
    }
    groups
}

/// Whether `current` starts a new visual block (avatar and name shown).
#[must_use]
pub fn shows_avatar(previous: Option<&Message>, current: &Message) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    let gap = current.timestamp - previous.timestamp;
    previous.author_id != current.author_id || gap.num_seconds() > AVATAR_GAP_SECS
}

/// Divider label for a day group: "Today", "Yesterday" or the long date.
#[must_use]
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        return "Today".into();
    }
    if today.checked_sub_days(Days::new(1)) == Some(day) {
        return "Yesterday".into();
    }
    day.format("%A, %B %-d, %Y").to_string()
}

/// Short time of day, e.g. "9:05 AM".
#[must_use]
pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%-I:%M %p").to_string()
}

/// Compact timestamp for a search result, bucketed by whole elapsed days.
#[must_use]
pub fn search_timestamp_label(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match (now - ts).num_days() {
        ..=0 => format_time(ts),
        1 => "Yesterday".into(),
        2..=6 => ts.format("%A").to_string(),
        _ => ts.format("%b %-d").to_string(),
    }
}

#[must_use]
pub fn format_member_count(count: usize) -> String {
    if count == 1 { "1 member".into() } else { format!("{count} members") }
}

/// Attachment size in megabytes with one decimal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
