pub mod config;
pub mod developer;
pub mod infractions;
pub mod promotions;
pub mod utility;

pub(crate) mod access;
pub(crate) mod embeds;
pub(crate) mod logging;

pub use infractions::expiry::{schedule_pending_expiries, spawn_expiry_sweeper};

use chirp_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    developer::register::META,
    config::META,
    infractions::META,
    promotions::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        developer::register::register(),
        config::config(),
        infractions::infractions(),
        promotions::promotions(),
    ]
}
