//! Data models for event platform entities.
//!
//! - `Profile`, `PublicProfile`, `Interest`: attendee identity and interests
//! - `Meeting`, `Attendee`: scheduled one-to-one meetings
//! - `Notification`: per-user activity notices
//! - `Page`: list responses, bare or paginated

pub mod meeting;
pub mod notification;
pub mod page;
pub mod profile;

pub use meeting::{Attendee, Meeting, MeetingUser};
pub use notification::{HealthStatus, Notification, NotificationKind};
pub use page::Page;
pub use profile::{Interest, InterestUpdate, Profile, PublicProfile};
