use crate::{
    error::AppResult,
    models::{
        FeedEntry, FilmRecord, Group, GroupFilm, GroupMember, GroupRole, GroupSummary,
        Invitation, InvitationView, LocalFilm, NewFilm, NewGroup, ReviewView,
        UpdateGroupRequest, UserReview,
    },
};

/// Read side of the local film catalog used by feeds and search
///
/// Rating aggregates are computed from the reviews table on every call; only ratings
/// between 1 and 5 count.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogReader: Send + Sync {
    /// Films with at least two ratings, best average first
    async fn top_rated_local(&self, limit: i64) -> AppResult<Vec<LocalFilm>>;

    /// Films with a known release date, newest first
    async fn recent_local(&self, limit: i64) -> AppResult<Vec<LocalFilm>>;

    /// Case-insensitive substring match on title or original title, newest first
    async fn search_local(&self, term: &str, limit: i64) -> AppResult<Vec<LocalFilm>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FilmStore: Send + Sync {
    async fn find_film(&self, id: i64) -> AppResult<Option<FilmRecord>>;

    async fn find_film_by_external_id(&self, external_id: i64) -> AppResult<Option<FilmRecord>>;

    /// Id of a film without provider counterpart whose title matches, ignoring case
    async fn find_manual_film_by_title(&self, title: &str) -> AppResult<Option<i64>>;

    /// Inserts a film; inserting an external id that is already stored returns the stored row
    async fn insert_film(&self, film: &NewFilm) -> AppResult<FilmRecord>;

    async fn latest_films(&self, limit: i64) -> AppResult<Vec<LocalFilm>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ReviewStore: Send + Sync {
    /// Most recent reviews carrying a non-empty comment
    async fn recent_comments(&self, limit: i64) -> AppResult<Vec<FeedEntry>>;

    /// Same as [`ReviewStore::recent_comments`], restricted to the friends of `user_id`
    async fn friend_comments(&self, user_id: i64, limit: i64) -> AppResult<Vec<FeedEntry>>;

    async fn film_reviews(&self, film_id: i64) -> AppResult<Vec<ReviewView>>;

    /// Creates or replaces the review of `user_id` on `film_id`, returning its id
    async fn upsert_review(
        &self,
        user_id: i64,
        film_id: i64,
        rating: Option<i16>,
        comment: Option<String>,
    ) -> AppResult<i64>;

    async fn user_reviews(&self, user_id: i64) -> AppResult<Vec<UserReview>>;
}

/// Groups, memberships, shared films, friendships and invitations
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GroupStore: Send + Sync {
    /// Public groups plus the private ones `user_id` belongs to, newest first
    async fn list_groups(&self, user_id: i64) -> AppResult<Vec<GroupSummary>>;

    async fn find_group(&self, group_id: i64) -> AppResult<Option<Group>>;

    /// Admins first, then moderators, then members by join date
    async fn group_members(&self, group_id: i64) -> AppResult<Vec<GroupMember>>;

    async fn group_films(&self, group_id: i64) -> AppResult<Vec<GroupFilm>>;

    /// Stores the group and makes its creator an admin, atomically
    async fn create_group(&self, creator_id: i64, group: &NewGroup) -> AppResult<Group>;

    async fn update_group(&self, group_id: i64, changes: &UpdateGroupRequest) -> AppResult<Group>;

    /// Deletes the group with its memberships, films and invitations
    async fn delete_group(&self, group_id: i64) -> AppResult<()>;

    /// Adds a membership; `false` when the user already belongs to the group
    async fn add_member(&self, group_id: i64, user_id: i64, role: GroupRole) -> AppResult<bool>;

    async fn remove_member(&self, group_id: i64, user_id: i64) -> AppResult<()>;

    /// Shares a film in the group; `false` when it is already there
    async fn add_group_film(&self, group_id: i64, film_id: i64, added_by: i64) -> AppResult<bool>;

    /// Role of `user_id` in the group, `None` when not a member
    async fn member_role(&self, group_id: i64, user_id: i64) -> AppResult<Option<GroupRole>>;

    async fn group_title(&self, group_id: i64) -> AppResult<Option<String>>;

    /// Pseudo of a user, `None` when the user does not exist
    async fn user_pseudo(&self, user_id: i64) -> AppResult<Option<String>>;

    async fn are_friends(&self, user_id: i64, other_id: i64) -> AppResult<bool>;

    async fn find_invitation(&self, group_id: i64, invitee_id: i64) -> AppResult<Option<Invitation>>;

    async fn create_invitation(
        &self,
        group_id: i64,
        inviter_id: i64,
        invitee_id: i64,
    ) -> AppResult<Invitation>;

    /// Moves an answered invitation back to pending on behalf of a new inviter
    async fn reopen_invitation(&self, invitation_id: i64, inviter_id: i64) -> AppResult<Invitation>;

    /// Invitation `invitation_id` if it was sent to `invitee_id`
    async fn invitation_for(&self, invitation_id: i64, invitee_id: i64) -> AppResult<Option<Invitation>>;

    /// Marks the invitation accepted and adds the membership if missing, atomically
    async fn accept_invitation(&self, invitation: &Invitation) -> AppResult<()>;

    async fn reject_invitation(&self, invitation_id: i64) -> AppResult<()>;

    async fn pending_invitations(&self, user_id: i64, limit: i64) -> AppResult<Vec<InvitationView>>;
}
