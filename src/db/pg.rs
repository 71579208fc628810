use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    db::{CatalogReader, FilmStore, GroupStore, ReviewStore},
    error::{AppError, AppResult},
    models::{
        FeedEntry, FilmRecord, Group, GroupFilm, GroupMember, GroupRole, GroupSummary, Invitation,
        InvitationStatus, InvitationView, LocalFilm, NewFilm, NewGroup, ReviewView,
        UpdateGroupRequest, UserReview,
    },
};

/// PostgreSQL implementation of every store trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes `LIKE` wildcards so user input only ever matches literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const FILM_RECORD_QUERY: &str = r#"
    SELECT f.id, f.external_id, f.title, f.original_title, f.synopsis, f.release_date,
           f.runtime_minutes, f.poster_url, f.genres, f.director, f.cast_members,
           COALESCE(ROUND(AVG(r.rating)::numeric, 1)::float8, 0) AS average_rating,
           COUNT(r.rating) AS vote_count
    FROM films f
    LEFT JOIN reviews r ON r.film_id = f.id AND r.rating BETWEEN 1 AND 5
"#;

const FEED_ENTRY_COLUMNS: &str = r#"
    SELECT r.id AS review_id, r.rating, r.comment, r.created_at,
           u.id AS user_id, u.pseudo, u.photo_url AS user_photo, u.bio AS user_bio,
           f.id AS film_id, f.title AS film_title, f.poster_url AS film_poster,
           f.release_date AS film_release_date
    FROM reviews r
    JOIN users u ON u.id = r.user_id
    JOIN films f ON f.id = r.film_id
    WHERE r.comment IS NOT NULL AND BTRIM(r.comment) <> ''
"#;

#[async_trait::async_trait]
impl CatalogReader for PgStore {
    async fn top_rated_local(&self, limit: i64) -> AppResult<Vec<LocalFilm>> {
        let films = sqlx::query_as::<_, LocalFilm>(
            r#"
            SELECT f.id, f.external_id, f.title, f.original_title, f.synopsis,
                   f.release_date, f.poster_url,
                   ROUND(AVG(r.rating)::numeric, 1)::float8 AS average_rating,
                   COUNT(r.rating) AS vote_count
            FROM films f
            JOIN reviews r ON r.film_id = f.id AND r.rating BETWEEN 1 AND 5
            GROUP BY f.id
            HAVING COUNT(r.rating) >= 2
            ORDER BY average_rating DESC, vote_count DESC, f.release_date DESC NULLS LAST
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = films.len(), "Loaded local top rated films");

        Ok(films)
    }

    async fn recent_local(&self, limit: i64) -> AppResult<Vec<LocalFilm>> {
        let films = sqlx::query_as::<_, LocalFilm>(
            r#"
            SELECT f.id, f.external_id, f.title, f.original_title, f.synopsis,
                   f.release_date, f.poster_url,
                   ROUND(AVG(r.rating)::numeric, 1)::float8 AS average_rating,
                   COUNT(r.rating) AS vote_count
            FROM films f
            LEFT JOIN reviews r ON r.film_id = f.id AND r.rating BETWEEN 1 AND 5
            WHERE f.release_date IS NOT NULL
            GROUP BY f.id
            ORDER BY f.release_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = films.len(), "Loaded local recent films");

        Ok(films)
    }

    async fn search_local(&self, term: &str, limit: i64) -> AppResult<Vec<LocalFilm>> {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));

        let films = sqlx::query_as::<_, LocalFilm>(
            r#"
            SELECT f.id, f.external_id, f.title, f.original_title, f.synopsis,
                   f.release_date, f.poster_url,
                   ROUND(AVG(r.rating)::numeric, 1)::float8 AS average_rating,
                   COUNT(r.rating) AS vote_count
            FROM films f
            LEFT JOIN reviews r ON r.film_id = f.id AND r.rating BETWEEN 1 AND 5
            WHERE LOWER(f.title) LIKE $1 OR LOWER(COALESCE(f.original_title, '')) LIKE $1
            GROUP BY f.id
            ORDER BY f.release_date DESC NULLS LAST
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(term = %term, count = films.len(), "Searched local catalog");

        Ok(films)
    }
}

#[async_trait::async_trait]
impl FilmStore for PgStore {
    async fn find_film(&self, id: i64) -> AppResult<Option<FilmRecord>> {
        let query = format!("{} WHERE f.id = $1 GROUP BY f.id", FILM_RECORD_QUERY);
        let film = sqlx::query_as::<_, FilmRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(film)
    }

    async fn find_film_by_external_id(&self, external_id: i64) -> AppResult<Option<FilmRecord>> {
        let query = format!("{} WHERE f.external_id = $1 GROUP BY f.id", FILM_RECORD_QUERY);
        let film = sqlx::query_as::<_, FilmRecord>(&query)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(film)
    }

    async fn find_manual_film_by_title(&self, title: &str) -> AppResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM films WHERE external_id IS NULL AND LOWER(title) = LOWER($1) LIMIT 1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn insert_film(&self, film: &NewFilm) -> AppResult<FilmRecord> {
        // A concurrent promotion of the same external id lands on the existing row
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO films (external_id, title, original_title, synopsis, release_date,
                               runtime_minutes, poster_url, genres, director, cast_members)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (external_id) DO UPDATE SET external_id = EXCLUDED.external_id
            RETURNING id
            "#,
        )
        .bind(film.external_id)
        .bind(&film.title)
        .bind(&film.original_title)
        .bind(&film.synopsis)
        .bind(film.release_date)
        .bind(film.runtime_minutes)
        .bind(&film.poster_url)
        .bind(&film.genres)
        .bind(&film.director)
        .bind(&film.cast_members)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // Manual titles are unique regardless of case
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("A film titled '{}' already exists", film.title))
            }
            other => AppError::from(other),
        })?;

        tracing::info!(film_id = id, external_id = ?film.external_id, "Film stored");

        self.find_film(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Film {} vanished after insert", id)))
    }

    async fn latest_films(&self, limit: i64) -> AppResult<Vec<LocalFilm>> {
        let films = sqlx::query_as::<_, LocalFilm>(
            r#"
            SELECT f.id, f.external_id, f.title, f.original_title, f.synopsis,
                   f.release_date, f.poster_url,
                   ROUND(AVG(r.rating)::numeric, 1)::float8 AS average_rating,
                   COUNT(r.rating) AS vote_count
            FROM films f
            LEFT JOIN reviews r ON r.film_id = f.id AND r.rating BETWEEN 1 AND 5
            GROUP BY f.id
            ORDER BY f.release_date DESC NULLS LAST, f.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(films)
    }
}

#[async_trait::async_trait]
impl ReviewStore for PgStore {
    async fn recent_comments(&self, limit: i64) -> AppResult<Vec<FeedEntry>> {
        let query = format!("{} ORDER BY r.created_at DESC LIMIT $1", FEED_ENTRY_COLUMNS);
        let entries = sqlx::query_as::<_, FeedEntry>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn friend_comments(&self, user_id: i64, limit: i64) -> AppResult<Vec<FeedEntry>> {
        let query = format!(
            r#"{}
              AND r.user_id <> $1
              AND EXISTS (
                  SELECT 1 FROM friends fr
                  WHERE (fr.user1_id = $1 AND fr.user2_id = r.user_id)
                     OR (fr.user2_id = $1 AND fr.user1_id = r.user_id)
              )
            ORDER BY r.created_at DESC
            LIMIT $2"#,
            FEED_ENTRY_COLUMNS
        );
        let entries = sqlx::query_as::<_, FeedEntry>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn film_reviews(&self, film_id: i64) -> AppResult<Vec<ReviewView>> {
        let reviews = sqlx::query_as::<_, ReviewView>(
            r#"
            SELECT r.id, r.rating, r.comment, r.created_at,
                   u.id AS user_id, u.pseudo, u.photo_url
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.film_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(film_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn upsert_review(
        &self,
        user_id: i64,
        film_id: i64,
        rating: Option<i16>,
        comment: Option<String>,
    ) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reviews (user_id, film_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, film_id)
            DO UPDATE SET rating = EXCLUDED.rating,
                          comment = EXCLUDED.comment,
                          updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(film_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn user_reviews(&self, user_id: i64) -> AppResult<Vec<UserReview>> {
        let reviews = sqlx::query_as::<_, UserReview>(
            r#"
            SELECT r.id, r.rating, r.comment, r.created_at,
                   f.id AS film_id, f.title AS film_title, f.poster_url AS film_poster,
                   f.release_date AS film_release_date
            FROM reviews r
            JOIN films f ON f.id = r.film_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}

/// Invitation row as stored; the status column is plain text
#[derive(sqlx::FromRow)]
struct InvitationRow {
    id: i64,
    group_id: i64,
    inviter_id: i64,
    invitee_id: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = AppError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        Ok(Invitation {
            id: row.id,
            group_id: row.group_id,
            inviter_id: row.inviter_id,
            invitee_id: row.invitee_id,
            status: row.status.parse().map_err(AppError::Internal)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InvitationViewRow {
    id: i64,
    group_id: i64,
    group_title: String,
    inviter_id: i64,
    inviter_pseudo: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvitationViewRow> for InvitationView {
    type Error = AppError;

    fn try_from(row: InvitationViewRow) -> Result<Self, Self::Error> {
        Ok(InvitationView {
            id: row.id,
            group_id: row.group_id,
            group_title: row.group_title,
            inviter_id: row.inviter_id,
            inviter_pseudo: row.inviter_pseudo,
            status: row.status.parse().map_err(AppError::Internal)?,
            created_at: row.created_at,
        })
    }
}

const INVITATION_COLUMNS: &str = "id, group_id, inviter_id, invitee_id, status, created_at";

const GROUP_COLUMNS: &str =
    "id, creator_id, title, description, cover_image, theme, is_public, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct GroupSummaryRow {
    id: i64,
    title: String,
    description: Option<String>,
    cover_image: Option<String>,
    theme: Option<String>,
    is_public: bool,
    created_at: DateTime<Utc>,
    creator_pseudo: String,
    member_count: i64,
    film_count: i64,
    user_role: Option<String>,
}

impl TryFrom<GroupSummaryRow> for GroupSummary {
    type Error = AppError;

    fn try_from(row: GroupSummaryRow) -> Result<Self, Self::Error> {
        Ok(GroupSummary {
            id: row.id,
            title: row.title,
            description: row.description,
            cover_image: row.cover_image,
            theme: row.theme,
            is_public: row.is_public,
            created_at: row.created_at,
            creator_pseudo: row.creator_pseudo,
            member_count: row.member_count,
            film_count: row.film_count,
            user_role: row
                .user_role
                .map(|role| role.parse())
                .transpose()
                .map_err(AppError::Internal)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct GroupMemberRow {
    user_id: i64,
    pseudo: String,
    photo_url: Option<String>,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<GroupMemberRow> for GroupMember {
    type Error = AppError;

    fn try_from(row: GroupMemberRow) -> Result<Self, Self::Error> {
        Ok(GroupMember {
            user_id: row.user_id,
            pseudo: row.pseudo,
            photo_url: row.photo_url,
            role: row.role.parse().map_err(AppError::Internal)?,
            joined_at: row.joined_at,
        })
    }
}

#[async_trait::async_trait]
impl GroupStore for PgStore {
    async fn list_groups(&self, user_id: i64) -> AppResult<Vec<GroupSummary>> {
        let rows = sqlx::query_as::<_, GroupSummaryRow>(
            r#"
            SELECT g.id, g.title, g.description, g.cover_image, g.theme, g.is_public,
                   g.created_at, u.pseudo AS creator_pseudo,
                   (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id = g.id) AS member_count,
                   (SELECT COUNT(*) FROM group_films gf WHERE gf.group_id = g.id) AS film_count,
                   me.role AS user_role
            FROM movie_groups g
            JOIN users u ON u.id = g.creator_id
            LEFT JOIN group_members me ON me.group_id = g.id AND me.user_id = $1
            WHERE g.is_public OR me.user_id IS NOT NULL
            ORDER BY g.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GroupSummary::try_from).collect()
    }

    async fn find_group(&self, group_id: i64) -> AppResult<Option<Group>> {
        let query = format!("SELECT {} FROM movie_groups WHERE id = $1", GROUP_COLUMNS);
        let group = sqlx::query_as::<_, Group>(&query)
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(group)
    }

    async fn group_members(&self, group_id: i64) -> AppResult<Vec<GroupMember>> {
        let rows = sqlx::query_as::<_, GroupMemberRow>(
            r#"
            SELECT u.id AS user_id, u.pseudo, u.photo_url, gm.role, gm.joined_at
            FROM group_members gm
            JOIN users u ON u.id = gm.user_id
            WHERE gm.group_id = $1
            ORDER BY CASE gm.role WHEN 'admin' THEN 1 WHEN 'moderator' THEN 2 ELSE 3 END,
                     gm.joined_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GroupMember::try_from).collect()
    }

    async fn group_films(&self, group_id: i64) -> AppResult<Vec<GroupFilm>> {
        let films = sqlx::query_as::<_, GroupFilm>(
            r#"
            SELECT f.id AS film_id, f.title, f.poster_url, f.release_date,
                   u.pseudo AS added_by, gf.created_at AS added_at
            FROM group_films gf
            JOIN films f ON f.id = gf.film_id
            JOIN users u ON u.id = gf.added_by
            WHERE gf.group_id = $1
            ORDER BY gf.created_at DESC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(films)
    }

    async fn create_group(&self, creator_id: i64, group: &NewGroup) -> AppResult<Group> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO movie_groups (creator_id, title, description, cover_image, theme, is_public)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            GROUP_COLUMNS
        );
        let created = sqlx::query_as::<_, Group>(&query)
            .bind(creator_id)
            .bind(&group.title)
            .bind(&group.description)
            .bind(&group.cover_image)
            .bind(&group.theme)
            .bind(group.is_public)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO group_members (group_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(created.id)
            .bind(creator_id)
            .bind(GroupRole::Admin.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_group(&self, group_id: i64, changes: &UpdateGroupRequest) -> AppResult<Group> {
        let query = format!(
            r#"
            UPDATE movie_groups SET
                title = COALESCE($2, title),
                description = CASE WHEN $3::text IS NULL THEN description ELSE NULLIF(BTRIM($3), '') END,
                cover_image = CASE WHEN $4::text IS NULL THEN cover_image ELSE NULLIF(BTRIM($4), '') END,
                theme = CASE WHEN $5::text IS NULL THEN theme ELSE NULLIF(BTRIM($5), '') END,
                is_public = COALESCE($6, is_public),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            GROUP_COLUMNS
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(group_id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.cover_image)
            .bind(&changes.theme)
            .bind(changes.is_public)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))
    }

    async fn delete_group(&self, group_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM movie_groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn add_member(&self, group_id: i64, user_id: i64, role: GroupRole) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_member(&self, group_id: i64, user_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn add_group_film(&self, group_id: i64, film_id: i64, added_by: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_films (group_id, film_id, added_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (group_id, film_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(film_id)
        .bind(added_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn member_role(&self, group_id: i64, user_id: i64) -> AppResult<Option<GroupRole>> {
        let role = sqlx::query_scalar::<_, String>(
            "SELECT role FROM group_members WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        role.map(|role| role.parse().map_err(AppError::Internal)).transpose()
    }

    async fn group_title(&self, group_id: i64) -> AppResult<Option<String>> {
        let title = sqlx::query_scalar::<_, String>("SELECT title FROM movie_groups WHERE id = $1")
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(title)
    }

    async fn user_pseudo(&self, user_id: i64) -> AppResult<Option<String>> {
        let pseudo = sqlx::query_scalar::<_, String>("SELECT pseudo FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(pseudo)
    }

    async fn are_friends(&self, user_id: i64, other_id: i64) -> AppResult<bool> {
        let friends = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM friends
                WHERE (user1_id = $1 AND user2_id = $2)
                   OR (user1_id = $2 AND user2_id = $1)
            )
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn find_invitation(&self, group_id: i64, invitee_id: i64) -> AppResult<Option<Invitation>> {
        let query = format!(
            "SELECT {} FROM group_invitations WHERE group_id = $1 AND invitee_id = $2",
            INVITATION_COLUMNS
        );
        sqlx::query_as::<_, InvitationRow>(&query)
            .bind(group_id)
            .bind(invitee_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Invitation::try_from)
            .transpose()
    }

    async fn create_invitation(
        &self,
        group_id: i64,
        inviter_id: i64,
        invitee_id: i64,
    ) -> AppResult<Invitation> {
        let query = format!(
            r#"
            INSERT INTO group_invitations (group_id, inviter_id, invitee_id, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        );
        let row = sqlx::query_as::<_, InvitationRow>(&query)
            .bind(group_id)
            .bind(inviter_id)
            .bind(invitee_id)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn reopen_invitation(&self, invitation_id: i64, inviter_id: i64) -> AppResult<Invitation> {
        let query = format!(
            r#"
            UPDATE group_invitations
            SET status = 'pending', inviter_id = $2, created_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        );
        let row = sqlx::query_as::<_, InvitationRow>(&query)
            .bind(invitation_id)
            .bind(inviter_id)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn invitation_for(&self, invitation_id: i64, invitee_id: i64) -> AppResult<Option<Invitation>> {
        let query = format!(
            "SELECT {} FROM group_invitations WHERE id = $1 AND invitee_id = $2",
            INVITATION_COLUMNS
        );
        sqlx::query_as::<_, InvitationRow>(&query)
            .bind(invitation_id)
            .bind(invitee_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Invitation::try_from)
            .transpose()
    }

    async fn accept_invitation(&self, invitation: &Invitation) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE group_invitations SET status = 'accepted' WHERE id = $1")
            .bind(invitation.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role)
            VALUES ($1, $2, 'member')
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(invitation.group_id)
        .bind(invitation.invitee_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn reject_invitation(&self, invitation_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE group_invitations SET status = 'rejected' WHERE id = $1")
            .bind(invitation_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn pending_invitations(&self, user_id: i64, limit: i64) -> AppResult<Vec<InvitationView>> {
        let rows = sqlx::query_as::<_, InvitationViewRow>(
            r#"
            SELECT gi.id, gi.group_id, g.title AS group_title,
                   gi.inviter_id, u.pseudo AS inviter_pseudo,
                   gi.status, gi.created_at
            FROM group_invitations gi
            JOIN movie_groups g ON g.id = gi.group_id
            JOIN users u ON u.id = gi.inviter_id
            WHERE gi.invitee_id = $1 AND gi.status = $2
            ORDER BY gi.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(InvitationStatus::Pending.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InvitationView::try_from).collect()
    }
}
