use tracing::info;

use chirp_core::{Context, Error};

use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "register",
    desc: "Register or unregister application commands (bot owners only).",
    category: "developer",
    usage: "!register",
};

/// Shows poise's register/unregister buttons for guild or global scope.
///
/// Non-owners hit `FrameworkError::NotAnOwner`, which the bot ignores.
#[poise::command(prefix_command, owners_only, hide_in_help, category = "Developer")]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    info!(user_id = ctx.author().id.get(), "owner opened command registration");
    poise::builtins::register_application_commands_buttons(ctx).await?;
    Ok(())
}
