//! Seeded workspace data.
//!
//! The directories and the message log are populated once from this
//! fixture at startup. Tests build on it too, so changes here ripple.

use chrono::{DateTime, TimeZone, Utc};

use crate::model::{
    Attachment, AttachmentKind, Channel, DirectMessage, Message, MessageTarget, Reaction, User, UserStatus,
    Workspace,
};

/// The acting user for every local mutation.
pub const CURRENT_USER_ID: &str = "1";

const AVATAR_BASE: &str = "https://avatars.teamchat.local";

/// Everything the session needs to boot.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub workspace: Workspace,
    pub users: Vec<User>,
    pub current_user_id: String,
    pub channels: Vec<Channel>,
    pub direct_messages: Vec<DirectMessage>,
    pub messages: Vec<Message>,
}

impl Fixture {
    /// The default "Awesome Company" workspace.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            workspace: workspace(),
            users: users(),
            current_user_id: CURRENT_USER_ID.to_string(),
            channels: channels(),
            direct_messages: direct_messages(),
            messages: messages(),
        }
    }
}

fn user(id: &str, name: &str, email: &str, status: UserStatus, title: &str, timezone: &str) -> User {
    User {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        avatar: format!("{AVATAR_BASE}/{id}.png"),
        status,
        title: Some(title.into()),
        timezone: Some(timezone.into()),
    }
}

fn users() -> Vec<User> {
    vec![
        user("1", "John Doe", "john.doe@company.com", UserStatus::Online, "Senior Developer", "PST"),
        user("2", "Sarah Smith", "sarah.smith@company.com", UserStatus::Away, "Product Manager", "EST"),
        user("3", "Mike Johnson", "mike.johnson@company.com", UserStatus::Online, "UX Designer", "PST"),
        user("4", "Emma Wilson", "emma.wilson@company.com", UserStatus::Busy, "DevOps Engineer", "EST"),
        user("5", "Alex Chen", "alex.chen@company.com", UserStatus::Offline, "QA Lead", "PST"),
    ]
}

fn workspace() -> Workspace {
    Workspace {
        id: "ws-1".into(),
        name: "Awesome Company".into(),
        domain: "awesome-company".into(),
        avatar: Some(format!("{AVATAR_BASE}/ws-1.png")),
        members: ids(&["1", "2", "3", "4", "5"]),
    }
}

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| (*s).to_string()).collect()
}

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single().unwrap_or_default()
}

fn march_15(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, hour, minute, 0).single().unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn channel(
    id: &str,
    description: &str,
    topic: &str,
    is_private: bool,
    members: &[&str],
    created_by: &str,
    created_at: DateTime<Utc>,
    unread_count: u32,
) -> Channel {
    Channel {
        id: id.into(),
        name: id.into(),
        description: Some(description.into()),
        topic: Some(topic.into()),
        is_private,
        members: ids(members),
        created_by: created_by.into(),
        created_at,
        unread_count,
    }
}

fn channels() -> Vec<Channel> {
    vec![
        channel(
            "general",
            "Company-wide announcements and general discussion",
            "Welcome to the team! 🎉",
            false,
            &["1", "2", "3", "4", "5"],
            "1",
            day(2024, 1, 1),
            3,
        ),
        channel(
            "dev-team",
            "Development team coordination and updates",
            "Sprint planning and daily standups",
            false,
            &["1", "3", "4"],
            "1",
            day(2024, 1, 15),
            7,
        ),
        channel(
            "random",
            "Non-work banter and random stuff",
            "Coffee chat and memes ☕",
            false,
            &["1", "2", "3", "4", "5"],
            "2",
            day(2024, 1, 10),
            0,
        ),
        channel(
            "design",
            "Design reviews and creative discussions",
            "UI/UX feedback and inspiration",
            false,
            &["2", "3"],
            "3",
            day(2024, 2, 1),
            2,
        ),
        channel(
            "leadership",
            "Leadership team private discussions",
            "Strategic planning",
            true,
            &["1", "2"],
            "1",
            day(2024, 1, 20),
            1,
        ),
    ]
}

fn direct_messages() -> Vec<DirectMessage> {
    [("dm-1-2", "2", 2), ("dm-1-3", "3", 0), ("dm-1-4", "4", 1)]
        .into_iter()
        .map(|(id, partner, unread_count)| DirectMessage {
            id: id.into(),
            participants: [CURRENT_USER_ID.into(), partner.into()],
            unread_count,
        })
        .collect()
}

fn in_channel(id: &str, content: &str, author: &str, channel: &str, ts: DateTime<Utc>) -> Message {
    Message::new(id, content, author, MessageTarget::Channel(channel.into()), ts)
}

fn in_dm(id: &str, content: &str, author: &str, dm: &str, ts: DateTime<Utc>) -> Message {
    Message::new(id, content, author, MessageTarget::Dm(dm.into()), ts)
}

fn messages() -> Vec<Message> {
    vec![
        in_channel(
            "msg-1",
            "Welcome everyone to our new Slack workspace! 🎉 Looking forward to great collaboration.",
            "1",
            "general",
            march_15(9, 0),
        )
        .with_reactions(vec![Reaction::new("👋", ["2", "3", "4"]), Reaction::new("🎉", ["2", "5"])]),
        in_channel(
            "msg-2",
            "Thanks John! Excited to be here. Can't wait to start working together.",
            "2",
            "general",
            march_15(9, 5),
        )
        .with_reactions(vec![Reaction::new("🙌", ["1", "3"])]),
        in_channel(
            "msg-3",
            "Hey team, I've uploaded the new design mockups to the shared drive. Let me know your thoughts!",
            "3",
            "design",
            march_15(10, 30),
        )
        .with_attachments(vec![Attachment {
            id: "att-1".into(),
            name: "dashboard-mockup.fig".into(),
            kind: AttachmentKind::File,
            url: "#".into(),
            size: 2_048_000,
            thumbnail: None,
        }]),
        in_channel("msg-4", "Good morning! How is everyone doing today? ☀️", "4", "random", march_15(8, 30))
            .with_reactions(vec![Reaction::new("☀️", ["1", "2", "3"]), Reaction::new("👋", ["1", "5"])]),
        in_channel(
            "msg-5",
            "Sprint planning meeting scheduled for 2 PM today. Please review the backlog items.",
            "1",
            "dev-team",
            march_15(11, 0),
        )
        .with_reactions(vec![Reaction::new("✅", ["3", "4"])]),
        in_channel("msg-6", "I'll be late to the meeting, stuck in traffic 🚗", "3", "dev-team", march_15(13, 45)),
        in_channel(
            "msg-7",
            "No worries Mike, we'll start with the other items.",
            "1",
            "dev-team",
            march_15(13, 47),
        )
        .with_reactions(vec![Reaction::new("👍", ["3"])]),
        in_dm(
            "msg-8",
            "Hey Sarah, do you have a minute to discuss the user feedback from last week?",
            "1",
            "dm-1-2",
            march_15(14, 20),
        ),
        in_dm(
            "msg-9",
            "Sure! I have the report ready. Let me share it with you.",
            "2",
            "dm-1-2",
            march_15(14, 22),
        ),
        in_dm(
            "msg-10",
            "Perfect! The insights look really valuable. Thanks for putting this together.",
            "1",
            "dm-1-2",
            march_15(14, 35),
        )
        .with_reactions(vec![Reaction::new("🙏", ["2"])]),
    ]
}
