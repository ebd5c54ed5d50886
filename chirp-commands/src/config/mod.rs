mod embeds;
mod set;
mod view;

use chirp_core::{Context, Error};

use crate::CommandMeta;
use set::set;
use view::view;

pub const META: CommandMeta = CommandMeta {
    name: "config",
    desc: "Configure issuer roles, log channels and infraction types.",
    category: "admin",
    usage: "/config <set|view>",
};

/// Configure bot settings for this server.
#[poise::command(
    slash_command,
    category = "Admin",
    subcommands("set", "view"),
    subcommand_required,
    default_member_permissions = "MANAGE_GUILD"
)]
pub async fn config(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}
