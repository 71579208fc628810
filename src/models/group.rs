use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Role of a member inside a group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Admin,
    Moderator,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Admin => "admin",
            GroupRole::Moderator => "moderator",
            GroupRole::Member => "member",
        }
    }

    /// Admins and moderators may edit the group
    pub fn can_edit(&self) -> bool {
        matches!(self, GroupRole::Admin | GroupRole::Moderator)
    }
}

impl Display for GroupRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(GroupRole::Admin),
            "moderator" => Ok(GroupRole::Moderator),
            "member" => Ok(GroupRole::Member),
            other => Err(format!("unknown group role '{}'", other)),
        }
    }
}

/// A themed group as stored
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub theme: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Group listed to a user, with counts and the user's own role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub theme: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub creator_pseudo: String,
    pub member_count: i64,
    pub film_count: i64,
    pub user_role: Option<GroupRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMember {
    pub user_id: i64,
    pub pseudo: String,
    pub photo_url: Option<String>,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Film shared in a group and who shared it
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct GroupFilm {
    pub film_id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

/// Group page: the group, its members (admins first) and its films (newest first)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDetails {
    pub group: Group,
    pub creator_pseudo: String,
    pub user_role: Option<GroupRole>,
    pub members: Vec<GroupMember>,
    pub films: Vec<GroupFilm>,
}

fn default_public() -> bool {
    true
}

/// Request body for creating a group; groups are public unless stated otherwise
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub title: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub theme: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

/// Validated group ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub title: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub theme: Option<String>,
    pub is_public: bool,
}

/// Partial update of a group
///
/// Absent fields are left untouched; a blank text field clears it (except the
/// title, which cannot be blank).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateGroupRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub theme: Option<String>,
    pub is_public: Option<bool>,
}

impl UpdateGroupRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.cover_image.is_none()
            && self.theme.is_none()
            && self.is_public.is_none()
    }
}

/// Lifecycle of a group invitation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
        }
    }
}

impl Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "rejected" => Ok(InvitationStatus::Rejected),
            other => Err(format!("unknown invitation status '{}'", other)),
        }
    }
}

/// One invitation row; there is at most one per (group, invitee)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invitation {
    pub id: i64,
    pub group_id: i64,
    pub inviter_id: i64,
    pub invitee_id: i64,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

/// Pending invitation as listed to its invitee
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvitationView {
    pub id: i64,
    pub group_id: i64,
    pub group_title: String,
    pub inviter_id: i64,
    pub inviter_pseudo: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

/// Event pushed to a connected user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    GroupInvitation {
        invitation_id: i64,
        group_id: i64,
        group_title: String,
        inviter_pseudo: String,
    },
}

impl Notification {
    /// Event name used on the SSE stream
    pub fn event_name(&self) -> &'static str {
        match self {
            Notification::GroupInvitation { .. } => "group_invitation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            InvitationStatus::Pending,
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<InvitationStatus>(), Ok(status));
        }
        assert!("en_attente".parse::<InvitationStatus>().is_err());
    }

    #[test]
    fn test_group_roles() {
        assert_eq!("moderator".parse::<GroupRole>(), Ok(GroupRole::Moderator));
        assert!("moderateur".parse::<GroupRole>().is_err());
        assert!(GroupRole::Admin.can_edit());
        assert!(GroupRole::Moderator.can_edit());
        assert!(!GroupRole::Member.can_edit());
    }

    #[test]
    fn test_group_request_defaults() {
        let request: CreateGroupRequest =
            serde_json::from_value(serde_json::json!({ "title": "Polars" })).unwrap();
        assert!(request.is_public);

        assert!(UpdateGroupRequest::default().is_empty());
        let update: UpdateGroupRequest =
            serde_json::from_value(serde_json::json!({ "is_public": false })).unwrap();
        assert!(!update.is_empty());
    }

    #[test]
    fn test_notification_serialization() {
        let notification = Notification::GroupInvitation {
            invitation_id: 4,
            group_id: 2,
            group_title: "Nouvelle Vague".to_string(),
            inviter_pseudo: "agnes".to_string(),
        };

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "group_invitation");
        assert_eq!(json["group_title"], "Nouvelle Vague");
        assert_eq!(notification.event_name(), "group_invitation");
    }
}
