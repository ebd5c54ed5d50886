use poise::serenity_prelude as serenity;

/// Outcome of checking an invoker against a configured issuer role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleCheck {
    /// No role configured, or the invoker holds it.
    Allowed,
    /// A role is configured but no longer exists in the guild.
    RoleMissing,
    /// The invoker does not hold the configured role.
    NotHolder,
}

/// Decide access from already-resolved guild state.
pub fn evaluate_issuer_role(
    configured: Option<u64>,
    guild_roles: &[u64],
    member_roles: &[u64],
) -> RoleCheck {
    let Some(role_id) = configured else {
        return RoleCheck::Allowed;
    };

    if !guild_roles.contains(&role_id) {
        return RoleCheck::RoleMissing;
    }

    if member_roles.contains(&role_id) {
        RoleCheck::Allowed
    } else {
        RoleCheck::NotHolder
    }
}

/// Fetch the guild's roles and the member, then run [`evaluate_issuer_role`].
pub async fn check_issuer_role(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    configured: Option<u64>,
) -> anyhow::Result<RoleCheck> {
    if configured.is_none() {
        return Ok(RoleCheck::Allowed);
    }

    let guild_roles: Vec<u64> = guild_id.roles(http).await?.keys().map(|id| id.get()).collect();
    let member = guild_id.member(http, user_id).await?;
    let member_roles: Vec<u64> = member.roles.iter().map(|id| id.get()).collect();

    Ok(evaluate_issuer_role(configured, &guild_roles, &member_roles))
}

/// Resolve a member's effective guild permissions from their roles.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild_id.member(http, user_id).await?;
    let everyone_role_id = serenity::RoleId::new(guild_id.get());

    Ok(guild
        .roles
        .values()
        .filter(|role| role.id == everyone_role_id || member.roles.contains(&role.id))
        .fold(serenity::Permissions::empty(), |acc, role| acc | role.permissions))
}

pub async fn has_user_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = resolve_user_permissions(http, guild_id, user_id).await?;

    Ok(perms.contains(serenity::Permissions::ADMINISTRATOR) || perms.contains(required))
}

#[cfg(test)]
mod tests {
    use super::{RoleCheck, evaluate_issuer_role};

    #[test]
    fn unset_role_allows_everyone() {
        assert_eq!(evaluate_issuer_role(None, &[], &[]), RoleCheck::Allowed);
    }

    #[test]
    fn configured_role_must_exist() {
        assert_eq!(
            evaluate_issuer_role(Some(10), &[1, 2], &[10]),
            RoleCheck::RoleMissing
        );
    }

    #[test]
    fn configured_role_must_be_held() {
        assert_eq!(
            evaluate_issuer_role(Some(10), &[10, 11], &[11]),
            RoleCheck::NotHolder
        );
        assert_eq!(
            evaluate_issuer_role(Some(10), &[10, 11], &[11, 10]),
            RoleCheck::Allowed
        );
    }
}
