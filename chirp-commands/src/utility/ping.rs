use chirp_core::{Context, Error};

use crate::CommandMeta;
use crate::embeds::send_success;

pub const META: CommandMeta = CommandMeta {
    name: "ping",
    desc: "Replies with Pong!",
    category: "utility",
    usage: "/ping",
};

/// Gateway heartbeat latency in whole milliseconds; 0 before the first heartbeat.
fn latency_ms(latency: std::time::Duration) -> u128 {
    latency.as_millis()
}

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let latency = ctx.ping().await;
    send_success(ctx, format!("Pong! Latency: {}ms", latency_ms(latency))).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::latency_ms;

    #[test]
    fn latency_rounds_down_to_millis() {
        assert_eq!(latency_ms(Duration::ZERO), 0);
        assert_eq!(latency_ms(Duration::from_micros(42_900)), 42);
    }
}
