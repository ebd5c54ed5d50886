mod edit;
mod embeds;
mod promote;
mod revoke;
mod view;

use chirp_core::{Context, Error};

use crate::CommandMeta;
use edit::edit;
use promote::promote;
use revoke::revoke;
use view::view;

pub const META: CommandMeta = CommandMeta {
    name: "promotions",
    desc: "Promote members and manage promotion records.",
    category: "staff",
    usage: "/promotions <promote|view|revoke|edit>",
};

pub(crate) const NOT_FOUND: &str = "No promotion found with the given Promotion ID.";

/// Promotion management commands.
#[poise::command(
    slash_command,
    category = "Staff",
    subcommands("promote", "view", "revoke", "edit"),
    subcommand_required
)]
pub async fn promotions(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}
