use tracing::{debug, warn};

use poise::serenity_prelude as serenity;

/// Post an embed to a configured log channel. Returns the message id, or
/// `None` when the channel is unset or the post failed.
pub async fn post_log_message(
    http: &serenity::Http,
    channel_id: Option<u64>,
    content: Option<String>,
    embed: serenity::CreateEmbed,
) -> Option<u64> {
    let channel_id = channel_id?;

    let mut message = serenity::CreateMessage::new().embed(embed);
    if let Some(content) = content {
        message = message.content(content);
    }

    match serenity::ChannelId::new(channel_id)
        .send_message(http, message)
        .await
    {
        Ok(sent) => Some(sent.id.get()),
        Err(source) => {
            warn!(?source, channel_id, "failed to post to log channel");
            None
        }
    }
}

/// Replace the embed of an earlier log post. Missing ids are skipped and
/// failures are only logged.
pub async fn edit_log_message(
    http: &serenity::Http,
    channel_id: Option<u64>,
    message_id: Option<u64>,
    embed: serenity::CreateEmbed,
) {
    let (Some(channel_id), Some(message_id)) = (channel_id, message_id) else {
        return;
    };

    if let Err(source) = serenity::ChannelId::new(channel_id)
        .edit_message(
            http,
            serenity::MessageId::new(message_id),
            serenity::EditMessage::new().embed(embed),
        )
        .await
    {
        warn!(?source, channel_id, message_id, "failed to edit log message");
    }
}

/// DM a member. Closed DMs are expected, so failures are logged at debug.
pub async fn send_member_dm(
    http: &serenity::Http,
    user: &serenity::User,
    embed: serenity::CreateEmbed,
) {
    let result = match user.create_dm_channel(http).await {
        Ok(channel) => channel
            .send_message(http, serenity::CreateMessage::new().embed(embed))
            .await
            .map(|_| ()),
        Err(source) => Err(source),
    };

    if let Err(source) = result {
        debug!(?source, user_id = user.id.get(), "could not DM member");
    }
}
