use crate::{
    db::GroupStore,
    error::{AppError, AppResult},
    models::{Invitation, InvitationStatus, InvitationView, Notification},
    notifications::NotificationHub,
};

/// Number of pending invitations listed to a user
pub const PENDING_INVITATIONS_LIMIT: i64 = 50;

/// Invites a friend into a group the caller belongs to
///
/// An invitation that was already answered is reopened rather than duplicated.
/// The invitee is notified live when connected.
pub async fn invite(
    groups: &dyn GroupStore,
    hub: &NotificationHub,
    inviter_id: i64,
    group_id: i64,
    invitee_id: i64,
) -> AppResult<Invitation> {
    if groups.member_role(group_id, inviter_id).await?.is_none() {
        return Err(AppError::Forbidden(
            "Only group members can send invitations".to_string(),
        ));
    }

    if groups.user_pseudo(invitee_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", invitee_id)));
    }

    if !groups.are_friends(inviter_id, invitee_id).await? {
        return Err(AppError::Forbidden(
            "You can only invite your friends".to_string(),
        ));
    }

    if groups.member_role(group_id, invitee_id).await?.is_some() {
        return Err(AppError::Conflict(
            "User is already a member of this group".to_string(),
        ));
    }

    let invitation = match groups.find_invitation(group_id, invitee_id).await? {
        Some(existing) if existing.status == InvitationStatus::Pending => {
            return Err(AppError::Conflict(
                "An invitation is already pending for this user".to_string(),
            ));
        }
        Some(existing) => groups.reopen_invitation(existing.id, inviter_id).await?,
        None => groups.create_invitation(group_id, inviter_id, invitee_id).await?,
    };

    let group_title = groups.group_title(group_id).await?.unwrap_or_default();
    let inviter_pseudo = groups.user_pseudo(inviter_id).await?.unwrap_or_default();

    let delivered = hub
        .publish(
            invitee_id,
            Notification::GroupInvitation {
                invitation_id: invitation.id,
                group_id,
                group_title,
                inviter_pseudo,
            },
        )
        .await;

    tracing::info!(
        invitation_id = invitation.id,
        group_id,
        inviter_id,
        invitee_id,
        delivered,
        "Group invitation sent"
    );

    Ok(invitation)
}

/// Pending invitations addressed to the caller, newest first
pub async fn pending_invitations(
    groups: &dyn GroupStore,
    user_id: i64,
) -> AppResult<Vec<InvitationView>> {
    groups
        .pending_invitations(user_id, PENDING_INVITATIONS_LIMIT)
        .await
}

/// Accepts an invitation and joins the group
pub async fn accept(groups: &dyn GroupStore, user_id: i64, invitation_id: i64) -> AppResult<()> {
    let invitation = pending_for(groups, user_id, invitation_id).await?;

    groups.accept_invitation(&invitation).await?;

    tracing::info!(invitation_id, group_id = invitation.group_id, user_id, "Invitation accepted");

    Ok(())
}

/// Declines an invitation
pub async fn reject(groups: &dyn GroupStore, user_id: i64, invitation_id: i64) -> AppResult<()> {
    let invitation = pending_for(groups, user_id, invitation_id).await?;

    groups.reject_invitation(invitation.id).await?;

    tracing::info!(invitation_id, group_id = invitation.group_id, user_id, "Invitation rejected");

    Ok(())
}

async fn pending_for(
    groups: &dyn GroupStore,
    user_id: i64,
    invitation_id: i64,
) -> AppResult<Invitation> {
    let invitation = groups
        .invitation_for(invitation_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Invitation {} not found", invitation_id)))?;

    if invitation.status != InvitationStatus::Pending {
        return Err(AppError::InvalidInput(format!(
            "Invitation already {}",
            invitation.status
        )));
    }

    Ok(invitation)
}
