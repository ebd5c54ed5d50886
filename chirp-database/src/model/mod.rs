pub mod guild_config;
pub mod infraction;
pub mod promotion;
