use crate::{
    db::{FilmStore, GroupStore},
    error::{AppError, AppResult},
    models::{
        CreateGroupRequest, Group, GroupDetails, GroupRole, GroupSummary, NewGroup,
        UpdateGroupRequest,
    },
    services::catalog::non_blank,
};

/// Groups visible to the caller: every public group and the private ones they belong to
pub async fn list_groups(groups: &dyn GroupStore, user_id: i64) -> AppResult<Vec<GroupSummary>> {
    let listed = groups.list_groups(user_id).await?;

    tracing::debug!(user_id, count = listed.len(), "Listed groups");

    Ok(listed)
}

/// Group page with members and shared films
///
/// Private groups are only shown to their members.
pub async fn group_details(
    groups: &dyn GroupStore,
    user_id: i64,
    group_id: i64,
) -> AppResult<GroupDetails> {
    let group = find_group(groups, group_id).await?;
    let user_role = groups.member_role(group_id, user_id).await?;

    if !group.is_public && user_role.is_none() {
        return Err(AppError::Forbidden("This group is private".to_string()));
    }

    let (members, films, creator_pseudo) = tokio::try_join!(
        groups.group_members(group_id),
        groups.group_films(group_id),
        groups.user_pseudo(group.creator_id),
    )?;

    Ok(GroupDetails {
        creator_pseudo: creator_pseudo.unwrap_or_default(),
        group,
        user_role,
        members,
        films,
    })
}

/// Creates a group whose creator becomes its admin
pub async fn create_group(
    groups: &dyn GroupStore,
    user_id: i64,
    request: CreateGroupRequest,
) -> AppResult<Group> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }

    let new_group = NewGroup {
        title: title.to_string(),
        description: non_blank(request.description),
        cover_image: non_blank(request.cover_image),
        theme: non_blank(request.theme),
        is_public: request.is_public,
    };

    let group = groups.create_group(user_id, &new_group).await?;

    tracing::info!(group_id = group.id, user_id, is_public = group.is_public, "Group created");

    Ok(group)
}

/// Edits a group; admins and moderators only
pub async fn update_group(
    groups: &dyn GroupStore,
    user_id: i64,
    group_id: i64,
    mut changes: UpdateGroupRequest,
) -> AppResult<Group> {
    let role = groups.member_role(group_id, user_id).await?;
    if !role.is_some_and(|role| role.can_edit()) {
        return Err(AppError::Forbidden(
            "Only admins and moderators can edit this group".to_string(),
        ));
    }

    if changes.is_empty() {
        return Err(AppError::InvalidInput("Nothing to update".to_string()));
    }

    if let Some(title) = changes.title.take() {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title cannot be blank".to_string()));
        }
        changes.title = Some(title.to_string());
    }

    let group = groups.update_group(group_id, &changes).await?;

    tracing::info!(group_id, user_id, "Group updated");

    Ok(group)
}

/// Deletes a group; its admin only
pub async fn delete_group(groups: &dyn GroupStore, user_id: i64, group_id: i64) -> AppResult<()> {
    if groups.member_role(group_id, user_id).await? != Some(GroupRole::Admin) {
        return Err(AppError::Forbidden(
            "Only the admin can delete this group".to_string(),
        ));
    }

    groups.delete_group(group_id).await?;

    tracing::info!(group_id, user_id, "Group deleted");

    Ok(())
}

/// Joins a public group as a plain member
pub async fn join_group(groups: &dyn GroupStore, user_id: i64, group_id: i64) -> AppResult<()> {
    let group = find_group(groups, group_id).await?;

    if !group.is_public {
        return Err(AppError::Forbidden(
            "This group is private, an invitation is required".to_string(),
        ));
    }

    if !groups.add_member(group_id, user_id, GroupRole::Member).await? {
        return Err(AppError::Conflict(
            "You are already a member of this group".to_string(),
        ));
    }

    tracing::info!(group_id, user_id, "Group joined");

    Ok(())
}

/// Leaves a group; the admin has to delete the group instead
pub async fn leave_group(groups: &dyn GroupStore, user_id: i64, group_id: i64) -> AppResult<()> {
    match groups.member_role(group_id, user_id).await? {
        None => Err(AppError::NotFound(
            "You are not a member of this group".to_string(),
        )),
        Some(GroupRole::Admin) => Err(AppError::Forbidden(
            "The admin cannot leave the group".to_string(),
        )),
        Some(_) => {
            groups.remove_member(group_id, user_id).await?;
            tracing::info!(group_id, user_id, "Group left");
            Ok(())
        }
    }
}

/// Shares a local film in a group the caller belongs to
pub async fn add_film(
    groups: &dyn GroupStore,
    films: &dyn FilmStore,
    user_id: i64,
    group_id: i64,
    film_id: i64,
) -> AppResult<()> {
    if groups.member_role(group_id, user_id).await?.is_none() {
        return Err(AppError::Forbidden(
            "Only group members can add films".to_string(),
        ));
    }

    if films.find_film(film_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Film {} not found", film_id)));
    }

    if !groups.add_group_film(group_id, film_id, user_id).await? {
        return Err(AppError::Conflict(
            "This film is already in the group".to_string(),
        ));
    }

    tracing::info!(group_id, film_id, user_id, "Film added to group");

    Ok(())
}

async fn find_group(groups: &dyn GroupStore, group_id: i64) -> AppResult<Group> {
    groups
        .find_group(group_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MockFilmStore, MockGroupStore},
        models::FilmRecord,
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    const GROUP: i64 = 3;
    const USER: i64 = 7;

    fn group(is_public: bool) -> Group {
        Group {
            id: GROUP,
            creator_id: 1,
            title: "Giallo".to_string(),
            description: None,
            cover_image: None,
            theme: Some("horreur".to_string()),
            is_public,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn with_role(role: Option<GroupRole>) -> MockGroupStore {
        let mut groups = MockGroupStore::new();
        groups
            .expect_member_role()
            .with(eq(GROUP), eq(USER))
            .returning(move |_, _| Ok(role));
        groups
    }

    #[tokio::test]
    async fn test_create_group_trims_and_stores() {
        let mut groups = MockGroupStore::new();
        groups
            .expect_create_group()
            .withf(|creator, new| {
                *creator == USER
                    && new.title == "Giallo"
                    && new.description.is_none()
                    && new.theme.as_deref() == Some("horreur")
                    && new.is_public
            })
            .times(1)
            .returning(|_, _| Ok(group(true)));

        let request = CreateGroupRequest {
            title: "  Giallo ".to_string(),
            description: Some(" ".to_string()),
            cover_image: None,
            theme: Some("horreur".to_string()),
            is_public: true,
        };

        let created = create_group(&groups, USER, request).await.unwrap();
        assert_eq!(created.id, GROUP);
    }

    #[tokio::test]
    async fn test_create_group_requires_title() {
        let groups = MockGroupStore::new();
        let request = CreateGroupRequest {
            title: "   ".to_string(),
            description: None,
            cover_image: None,
            theme: None,
            is_public: true,
        };

        assert!(matches!(
            create_group(&groups, USER, request).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_private_group_hidden_from_outsiders() {
        let mut groups = with_role(None);
        groups
            .expect_find_group()
            .returning(|_| Ok(Some(group(false))));

        assert!(matches!(
            group_details(&groups, USER, GROUP).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_details_of_unknown_group() {
        let mut groups = MockGroupStore::new();
        groups.expect_find_group().returning(|_| Ok(None));

        assert!(matches!(
            group_details(&groups, USER, GROUP).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_details_for_member() {
        let mut groups = with_role(Some(GroupRole::Member));
        groups
            .expect_find_group()
            .returning(|_| Ok(Some(group(false))));
        groups.expect_group_members().returning(|_| Ok(Vec::new()));
        groups.expect_group_films().returning(|_| Ok(Vec::new()));
        groups
            .expect_user_pseudo()
            .with(eq(1))
            .returning(|_| Ok(Some("dario".to_string())));

        let details = group_details(&groups, USER, GROUP).await.unwrap();

        assert_eq!(details.creator_pseudo, "dario");
        assert_eq!(details.user_role, Some(GroupRole::Member));
    }

    #[tokio::test]
    async fn test_update_requires_editor_role() {
        let groups = with_role(Some(GroupRole::Member));
        let changes = UpdateGroupRequest {
            is_public: Some(false),
            ..UpdateGroupRequest::default()
        };

        assert!(matches!(
            update_group(&groups, USER, GROUP, changes).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_update_validation() {
        let groups = with_role(Some(GroupRole::Moderator));

        assert!(matches!(
            update_group(&groups, USER, GROUP, UpdateGroupRequest::default()).await,
            Err(AppError::InvalidInput(_))
        ));

        let blank_title = UpdateGroupRequest {
            title: Some("  ".to_string()),
            ..UpdateGroupRequest::default()
        };
        assert!(matches!(
            update_group(&groups, USER, GROUP, blank_title).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_moderator_updates_group() {
        let mut groups = with_role(Some(GroupRole::Moderator));
        groups
            .expect_update_group()
            .withf(|id, changes| *id == GROUP && changes.title.as_deref() == Some("Poliziottesco"))
            .times(1)
            .returning(|_, _| Ok(group(true)));

        let changes = UpdateGroupRequest {
            title: Some(" Poliziottesco ".to_string()),
            ..UpdateGroupRequest::default()
        };

        update_group(&groups, USER, GROUP, changes).await.unwrap();
    }

    #[tokio::test]
    async fn test_only_admin_deletes() {
        let groups = with_role(Some(GroupRole::Moderator));
        assert!(matches!(
            delete_group(&groups, USER, GROUP).await,
            Err(AppError::Forbidden(_))
        ));

        let mut groups = with_role(Some(GroupRole::Admin));
        groups
            .expect_delete_group()
            .with(eq(GROUP))
            .times(1)
            .returning(|_| Ok(()));
        delete_group(&groups, USER, GROUP).await.unwrap();
    }

    #[tokio::test]
    async fn test_join_rules() {
        let mut groups = MockGroupStore::new();
        groups
            .expect_find_group()
            .returning(|_| Ok(Some(group(false))));
        assert!(matches!(
            join_group(&groups, USER, GROUP).await,
            Err(AppError::Forbidden(_))
        ));

        let mut groups = MockGroupStore::new();
        groups
            .expect_find_group()
            .returning(|_| Ok(Some(group(true))));
        groups
            .expect_add_member()
            .with(eq(GROUP), eq(USER), eq(GroupRole::Member))
            .returning(|_, _, _| Ok(false));
        assert!(matches!(
            join_group(&groups, USER, GROUP).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_leave_rules() {
        let groups = with_role(None);
        assert!(matches!(
            leave_group(&groups, USER, GROUP).await,
            Err(AppError::NotFound(_))
        ));

        let groups = with_role(Some(GroupRole::Admin));
        assert!(matches!(
            leave_group(&groups, USER, GROUP).await,
            Err(AppError::Forbidden(_))
        ));

        let mut groups = with_role(Some(GroupRole::Member));
        groups
            .expect_remove_member()
            .with(eq(GROUP), eq(USER))
            .times(1)
            .returning(|_, _| Ok(()));
        leave_group(&groups, USER, GROUP).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_film_rules() {
        let mut films = MockFilmStore::new();
        films.expect_find_film().with(eq(404)).returning(|_| Ok(None));
        films.expect_find_film().with(eq(1)).returning(|id| {
            Ok(Some(FilmRecord {
                id,
                external_id: None,
                title: "Suspiria".to_string(),
                original_title: None,
                synopsis: None,
                release_date: None,
                runtime_minutes: None,
                poster_url: None,
                genres: Vec::new(),
                director: None,
                cast_members: Vec::new(),
                average_rating: 0.0,
                vote_count: 0,
            }))
        });

        let outsider = with_role(None);
        assert!(matches!(
            add_film(&outsider, &films, USER, GROUP, 1).await,
            Err(AppError::Forbidden(_))
        ));

        let mut member = with_role(Some(GroupRole::Member));
        member
            .expect_add_group_film()
            .with(eq(GROUP), eq(1), eq(USER))
            .returning(|_, _, _| Ok(false));
        assert!(matches!(
            add_film(&member, &films, USER, GROUP, 404).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            add_film(&member, &films, USER, GROUP, 1).await,
            Err(AppError::Conflict(_))
        ));
    }
}
