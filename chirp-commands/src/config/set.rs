use std::time::Duration;

use poise::serenity_prelude as serenity;
use serde_json::Value;
use tracing::info;

use chirp_core::{Context, Error};
use chirp_database::impls::guild_config::{
    add_infraction_type, refresh_guild_config, remove_infraction_type, set_config_value,
};
use chirp_database::model::guild_config::{ConfigKey, ConfigKind};
use chirp_utils::embed::titled_embed;
use chirp_utils::formatting::{channel_mention, role_mention};

use super::embeds::{expired_embed, menu_embed, removal_message, unchanged_embed, updated_embed};
use crate::access::ensure_manage_guild;
use crate::embeds::{cached_guild_icon, guild_only_message};

/// How long each menu step waits for the invoker.
const MENU_STEP_TIMEOUT: Duration = Duration::from_secs(120);

/// Discord's cap on string select options.
const MAX_SELECT_OPTIONS: usize = 25;

const ADD_TYPE: &str = "add_infraction_type";
const REMOVE_TYPE: &str = "remove_infraction_type";

#[derive(Debug, poise::Modal)]
#[name = "Add Infraction Type"]
struct InfractionTypeModal {
    #[name = "Infraction Type"]
    #[placeholder = "Strike, Warning, Activity Notice, etc."]
    #[max_length = 30]
    infraction_type: String,
}

/// Component ids scoped to one invocation.
struct MenuIds {
    key: String,
    role: String,
    channel: String,
    action: String,
    remove: String,
}

impl MenuIds {
    fn new(invocation_id: u64) -> Self {
        Self {
            key: format!("{invocation_id}_config_key"),
            role: format!("{invocation_id}_config_role"),
            channel: format!("{invocation_id}_config_channel"),
            action: format!("{invocation_id}_config_types_action"),
            remove: format!("{invocation_id}_config_types_remove"),
        }
    }
}

enum Step {
    Done,
    TimedOut,
}

/// Set configuration options through an interactive menu.
#[poise::command(slash_command, default_member_permissions = "MANAGE_GUILD")]
pub async fn set(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    ctx.defer_ephemeral().await?;

    if !ensure_manage_guild(ctx, guild_id).await? {
        return Ok(());
    }

    let thumbnail = cached_guild_icon(ctx);
    let ids = MenuIds::new(ctx.id());

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(menu_embed(thumbnail.as_deref()))
                .components(vec![key_select(&ids.key)])
                .ephemeral(true),
        )
        .await?;

    let step = run_menu(ctx, guild_id, &reply, &ids, thumbnail.as_deref()).await?;
    if let Step::TimedOut = step {
        let _ = reply
            .edit(
                ctx,
                poise::CreateReply::default()
                    .embed(expired_embed(thumbnail.as_deref()))
                    .components(Vec::new()),
            )
            .await;
    }

    Ok(())
}

async fn run_menu(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
    reply: &poise::ReplyHandle<'_>,
    ids: &MenuIds,
    thumbnail: Option<&str>,
) -> Result<Step, Error> {
    let Some(press) = next_press(ctx, &ids.key).await? else {
        return Ok(Step::TimedOut);
    };

    let Some(key) = selected_string(&press).and_then(|raw| ConfigKey::from_key(&raw)) else {
        return close_unchanged(ctx, &press, thumbnail).await;
    };

    match key.kind() {
        ConfigKind::Role => {
            let select = serenity::CreateSelectMenu::new(
                &ids.role,
                serenity::CreateSelectMenuKind::Role {
                    default_roles: None,
                },
            )
            .placeholder(format!("Select a role for {}", key.label()))
            .min_values(1)
            .max_values(1);

            update_menu(
                ctx,
                &press,
                titled_embed(
                    format!("Select Role for {}", key.label()),
                    "Choose a role from the menu below.",
                    thumbnail,
                ),
                vec![serenity::CreateActionRow::SelectMenu(select)],
            )
            .await?;

            let Some(press) = next_press(ctx, &ids.role).await? else {
                return Ok(Step::TimedOut);
            };
            let serenity::ComponentInteractionDataKind::RoleSelect { values } = &press.data.kind
            else {
                return close_unchanged(ctx, &press, thumbnail).await;
            };
            let Some(role_id) = values.first() else {
                return close_unchanged(ctx, &press, thumbnail).await;
            };

            store_snowflake(ctx, guild_id, key, role_id.get()).await?;
            update_menu(
                ctx,
                &press,
                updated_embed(key, &role_mention(role_id.get()), thumbnail),
                Vec::new(),
            )
            .await?;
        }
        ConfigKind::Channel => {
            let select = serenity::CreateSelectMenu::new(
                &ids.channel,
                serenity::CreateSelectMenuKind::Channel {
                    channel_types: Some(vec![serenity::ChannelType::Text]),
                    default_channels: None,
                },
            )
            .placeholder(format!("Select a channel for {}", key.label()))
            .min_values(1)
            .max_values(1);

            update_menu(
                ctx,
                &press,
                titled_embed(
                    format!("Select Channel for {}", key.label()),
                    "Choose a channel from the menu below.",
                    thumbnail,
                ),
                vec![serenity::CreateActionRow::SelectMenu(select)],
            )
            .await?;

            let Some(press) = next_press(ctx, &ids.channel).await? else {
                return Ok(Step::TimedOut);
            };
            let serenity::ComponentInteractionDataKind::ChannelSelect { values } =
                &press.data.kind
            else {
                return close_unchanged(ctx, &press, thumbnail).await;
            };
            let Some(channel_id) = values.first() else {
                return close_unchanged(ctx, &press, thumbnail).await;
            };

            store_snowflake(ctx, guild_id, key, channel_id.get()).await?;
            update_menu(
                ctx,
                &press,
                updated_embed(key, &channel_mention(channel_id.get()), thumbnail),
                Vec::new(),
            )
            .await?;
        }
        ConfigKind::List => {
            return edit_infraction_types(ctx, guild_id, reply, ids, thumbnail, &press).await;
        }
    }

    Ok(Step::Done)
}

async fn edit_infraction_types(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
    reply: &poise::ReplyHandle<'_>,
    ids: &MenuIds,
    thumbnail: Option<&str>,
    press: &serenity::ComponentInteraction,
) -> Result<Step, Error> {
    let actions = serenity::CreateSelectMenu::new(
        &ids.action,
        serenity::CreateSelectMenuKind::String {
            options: vec![
                serenity::CreateSelectMenuOption::new("Add Infraction Type", ADD_TYPE)
                    .description("Add a new infraction type"),
                serenity::CreateSelectMenuOption::new("Remove Infraction Type", REMOVE_TYPE)
                    .description("Remove an existing infraction type"),
            ],
        },
    )
    .placeholder("Select an action")
    .min_values(1)
    .max_values(1);

    update_menu(
        ctx,
        press,
        titled_embed(
            "Infraction Types Configuration",
            "Choose to add or remove an infraction type from the menu below.",
            thumbnail,
        ),
        vec![serenity::CreateActionRow::SelectMenu(actions)],
    )
    .await?;

    let Some(action_press) = next_press(ctx, &ids.action).await? else {
        return Ok(Step::TimedOut);
    };

    match selected_string(&action_press).as_deref() {
        Some(ADD_TYPE) => {
            let submitted = poise::execute_modal_on_component_interaction::<InfractionTypeModal>(
                ctx,
                action_press,
                None,
                Some(MENU_STEP_TIMEOUT),
            )
            .await?;
            let Some(submitted) = submitted else {
                return Ok(Step::TimedOut);
            };

            let infraction_type = submitted.infraction_type.trim().to_owned();
            let embed = if infraction_type.is_empty() {
                titled_embed(
                    "Infraction Type Not Added",
                    "Infraction types cannot be blank.",
                    thumbnail,
                )
            } else {
                let (_, added) =
                    add_infraction_type(&ctx.data().db, guild_id.get(), &infraction_type).await?;
                info!(guild_id = guild_id.get(), %infraction_type, added, "infraction type added");

                if added {
                    titled_embed(
                        "Infraction Type Added",
                        format!("Successfully added infraction type: **{infraction_type}**"),
                        thumbnail,
                    )
                } else {
                    titled_embed(
                        "Infraction Type Exists",
                        format!("**{infraction_type}** is already an infraction type."),
                        thumbnail,
                    )
                }
            };

            reply
                .edit(
                    ctx,
                    poise::CreateReply::default()
                        .embed(embed)
                        .components(Vec::new()),
                )
                .await?;
        }
        Some(REMOVE_TYPE) => {
            let config = refresh_guild_config(&ctx.data().db, guild_id.get()).await?;
            let types = config.infraction_types();

            if types.is_empty() {
                update_menu(
                    ctx,
                    &action_press,
                    titled_embed(
                        "No Infraction Types Found",
                        "There are no infraction types to remove.",
                        thumbnail,
                    ),
                    Vec::new(),
                )
                .await?;
                return Ok(Step::Done);
            }

            let options = types
                .iter()
                .take(MAX_SELECT_OPTIONS)
                .map(|entry| serenity::CreateSelectMenuOption::new(entry, entry))
                .collect();
            let select = serenity::CreateSelectMenu::new(
                &ids.remove,
                serenity::CreateSelectMenuKind::String { options },
            )
            .placeholder("Select an infraction type to remove")
            .min_values(1)
            .max_values(1);

            update_menu(
                ctx,
                &action_press,
                titled_embed(
                    "Select Infraction Type to Remove",
                    "Choose an infraction type from the menu below.",
                    thumbnail,
                ),
                vec![serenity::CreateActionRow::SelectMenu(select)],
            )
            .await?;

            let Some(type_press) = next_press(ctx, &ids.remove).await? else {
                return Ok(Step::TimedOut);
            };
            let Some(selected) = selected_string(&type_press) else {
                return close_unchanged(ctx, &type_press, thumbnail).await;
            };

            let (_, removed) =
                remove_infraction_type(&ctx.data().db, guild_id.get(), &selected).await?;
            info!(guild_id = guild_id.get(), infraction_type = %selected, removed, "infraction type removed");

            let (title, body) = removal_message(&selected, removed);
            update_menu(ctx, &type_press, titled_embed(title, body, thumbnail), Vec::new()).await?;
        }
        _ => return close_unchanged(ctx, &action_press, thumbnail).await,
    }

    Ok(Step::Done)
}

async fn store_snowflake(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
    key: ConfigKey,
    id: u64,
) -> Result<(), Error> {
    set_config_value(
        &ctx.data().db,
        guild_id.get(),
        key,
        Value::String(id.to_string()),
    )
    .await?;
    info!(guild_id = guild_id.get(), key = key.as_str(), id, "configuration updated");
    Ok(())
}

fn key_select(custom_id: &str) -> serenity::CreateActionRow {
    let options = ConfigKey::ALL
        .into_iter()
        .map(|key| {
            serenity::CreateSelectMenuOption::new(key.label(), key.as_str())
                .description(key.description())
        })
        .collect();

    serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(custom_id, serenity::CreateSelectMenuKind::String { options })
            .placeholder("Select a configuration setting to modify")
            .min_values(1)
            .max_values(1),
    )
}

/// Wait for the invoker to use the component `custom_id`. Other users get an
/// ephemeral refusal and the wait continues.
async fn next_press(
    ctx: Context<'_>,
    custom_id: &str,
) -> Result<Option<serenity::ComponentInteraction>, Error> {
    loop {
        let wanted = custom_id.to_owned();
        let Some(press) = serenity::collector::ComponentInteractionCollector::new(ctx)
            .filter(move |interaction| interaction.data.custom_id == wanted)
            .timeout(MENU_STEP_TIMEOUT)
            .await
        else {
            return Ok(None);
        };

        if press.user.id == ctx.author().id {
            return Ok(Some(press));
        }

        press
            .create_response(
                ctx.http(),
                serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content("This menu isn't for you!")
                        .ephemeral(true),
                ),
            )
            .await?;
    }
}

async fn update_menu(
    ctx: Context<'_>,
    press: &serenity::ComponentInteraction,
    embed: serenity::CreateEmbed,
    components: Vec<serenity::CreateActionRow>,
) -> Result<(), Error> {
    press
        .create_response(
            ctx.http(),
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(components),
            ),
        )
        .await?;
    Ok(())
}

/// Answer `press` by closing the menu without touching the config.
async fn close_unchanged(
    ctx: Context<'_>,
    press: &serenity::ComponentInteraction,
    thumbnail: Option<&str>,
) -> Result<Step, Error> {
    update_menu(ctx, press, unchanged_embed(thumbnail), Vec::new()).await?;
    Ok(Step::Done)
}

fn selected_string(press: &serenity::ComponentInteraction) -> Option<String> {
    match &press.data.kind {
        serenity::ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::MenuIds;

    #[test]
    fn menu_ids_are_scoped_and_distinct() {
        let ids = MenuIds::new(42);
        let all = [&ids.key, &ids.role, &ids.channel, &ids.action, &ids.remove];

        assert!(all.iter().all(|id| id.starts_with("42_config_")));
        for (i, left) in all.iter().enumerate() {
            for right in &all[i + 1..] {
                assert_ne!(left, right);
            }
        }
    }
}
