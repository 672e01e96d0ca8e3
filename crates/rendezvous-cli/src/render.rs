//! Plain-text rendering of command output.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use rendezvous_core::models::{Meeting, Notification, Profile, PublicProfile};
use rendezvous_core::utils::{format_meeting_time, format_relative, truncate};

/// Maximum width of a notification message in list output
const MESSAGE_WIDTH: usize = 72;

pub fn render_profile(profile: &Profile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Username:  {}", profile.username);
    let _ = writeln!(out, "Role:      {}", profile.role_display());
    let _ = writeln!(out, "Interests: {}", profile.interests_display());
    if !profile.blocked_users.is_empty() {
        let blocked: Vec<&str> = profile
            .blocked_users
            .iter()
            .map(|p| p.username.as_str())
            .collect();
        let _ = writeln!(out, "Blocked:   {}", blocked.join(", "));
    }
    out
}

pub fn render_meetings(meetings: &[Meeting], me: &str, now: DateTime<Utc>) -> String {
    if meetings.is_empty() {
        return "You have no scheduled meetings.\n".to_string();
    }

    let mut out = String::new();
    for meeting in meetings {
        let with = match meeting.other_attendee(me) {
            Some(other) => other.display_name(),
            None => format!(
                "{} and {}",
                meeting.attendee1.display_name(),
                meeting.attendee2.display_name()
            ),
        };
        let _ = write!(
            out,
            "#{:<5} {} ({})  with {}",
            meeting.id,
            format_meeting_time(meeting.meeting_time),
            format_relative(meeting.meeting_time, now),
            with
        );
        if let Some(ref room) = meeting.room {
            let _ = write!(out, "  [{}]", room);
        }
        if meeting.calendar_url.is_some() {
            out.push_str("  (calendar)");
        }
        out.push('\n');
    }
    out
}

pub fn render_directory(attendees: &[PublicProfile], me: &Profile) -> String {
    let others: Vec<&PublicProfile> = attendees
        .iter()
        .filter(|p| p.username != me.username)
        .collect();
    if others.is_empty() {
        return "Nobody else has checked in yet.\n".to_string();
    }

    let mut out = String::new();
    for attendee in others {
        let _ = write!(
            out,
            "{} ({}) - Interests: {}",
            attendee.username,
            attendee.role_display(),
            attendee.interests_display()
        );
        let shared = attendee.shared_interests(me);
        if !shared.is_empty() {
            let _ = write!(out, "  * shared: {}", shared.join(", "));
        }
        out.push('\n');
    }
    out
}

pub fn render_notifications(notifications: &[Notification]) -> String {
    if notifications.is_empty() {
        return "No notifications.\n".to_string();
    }

    let mut out = String::new();
    for note in notifications {
        let marker = if note.is_read { ' ' } else { '*' };
        let _ = writeln!(
            out,
            "{} #{:<5} {:<18} {}",
            marker,
            note.id,
            note.kind().to_string(),
            truncate(&note.message, MESSAGE_WIDTH)
        );
    }
    out
}

pub fn render_status(
    profile: &Profile,
    meetings: &[Meeting],
    notifications: &[Notification],
    now: DateTime<Utc>,
) -> String {
    let upcoming = meetings.iter().filter(|m| m.is_upcoming(now)).count();
    let unread = notifications.iter().filter(|n| !n.is_read).count();

    let mut out = String::new();
    let _ = writeln!(out, "Logged in as {} ({})", profile.username, profile.role_display());
    let _ = writeln!(out, "Upcoming meetings:    {}", upcoming);
    let _ = writeln!(out, "Unread notifications: {}", unread);
    if let Some(next) = meetings.iter().find(|m| m.is_upcoming(now)) {
        let _ = writeln!(
            out,
            "Next meeting:         {} with {}",
            format_relative(next.meeting_time, now),
            next.other_attendee(&profile.username)
                .map(|a| a.display_name())
                .unwrap_or_else(|| next.attendee2.display_name())
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn me() -> Profile {
        serde_json::from_value(json!({
            "username": "alice", "role": "Mentor",
            "interests": [{"name": "Rust"}, {"name": "Go"}]
        }))
        .unwrap()
    }

    fn meeting(id: i64, other: &str, time: &str) -> Meeting {
        serde_json::from_value(json!({
            "id": id, "attendee1": "alice", "attendee2": other, "meeting_time": time
        }))
        .unwrap()
    }

    #[test]
    fn test_render_profile() {
        let out = render_profile(&me());
        assert!(out.contains("Username:  alice"));
        assert!(out.contains("Role:      Mentor"));
        assert!(out.contains("Interests: Rust, Go"));
        assert!(!out.contains("Blocked"));
    }

    #[test]
    fn test_render_meetings_names_other_attendee() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let out = render_meetings(&[meeting(1, "bob", "2025-06-01T14:00:00Z")], "alice", now);
        assert!(out.starts_with("#1 "));
        assert!(out.contains("(in 2h)"));
        assert!(out.contains("with bob"));
        assert!(!out.contains("alice"));
    }

    #[test]
    fn test_render_meetings_empty() {
        assert_eq!(
            render_meetings(&[], "alice", Utc::now()),
            "You have no scheduled meetings.\n"
        );
    }

    #[test]
    fn test_render_directory_skips_self_and_marks_shared() {
        let attendees: Vec<PublicProfile> = serde_json::from_value(json!([
            {"username": "alice", "role": "Mentor", "interests": []},
            {"username": "bob", "role": "", "interests": [{"name": "rust"}]}
        ]))
        .unwrap();
        let out = render_directory(&attendees, &me());
        assert_eq!(out, "bob (Attendee) - Interests: rust  * shared: rust\n");
    }

    #[test]
    fn test_render_notifications_marks_unread() {
        let notes: Vec<Notification> = serde_json::from_value(json!([
            {"id": 1, "event_type": "MTG_CNL", "message": "Cancelled", "is_read": false},
            {"id": 2, "event_type": "PRP_ACC", "message": "Accepted", "is_read": true}
        ]))
        .unwrap();
        let out = render_notifications(&notes);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("* #1"));
        assert!(lines[0].contains("Meeting Cancelled"));
        assert!(lines[1].starts_with("  #2"));
    }

    #[test]
    fn test_render_status_counts() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let meetings = vec![
            meeting(1, "bob", "2025-06-01T10:00:00Z"),
            meeting(2, "carol", "2025-06-01T13:00:00Z"),
        ];
        let notes: Vec<Notification> = serde_json::from_value(json!([
            {"id": 1, "event_type": "PRP_RCV", "message": "New proposal", "is_read": false}
        ]))
        .unwrap();
        let out = render_status(&me(), &meetings, &notes, now);
        assert!(out.contains("Upcoming meetings:    1"));
        assert!(out.contains("Unread notifications: 1"));
        assert!(out.contains("in 1h with carol"));
    }
}
