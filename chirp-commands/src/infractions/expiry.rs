use std::sync::Arc;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use chirp_database::Database;
use chirp_database::impls::guild_config::get_guild_config;
use chirp_database::impls::infractions::{
    due_infractions, mark_infraction_expired, scheduled_infractions,
};
use chirp_database::model::guild_config::ConfigKey;
use chirp_database::model::infraction::Infraction;
use chirp_utils::tasks::TaskMap;
use chirp_utils::time::{delay_until, now_unix_secs};

use super::embeds::{InfractionSummary, expired_embed};
use crate::embeds::fetch_user_profile;
use crate::logging::edit_log_message;

/// Flip one infraction to expired and rewrite its log posts.
///
/// Returns `false` when it was already expired or no longer exists, so the
/// timer and the sweep never both act on the same record.
pub async fn expire_infraction(
    http: &serenity::Http,
    db: &Database,
    guild_id: u64,
    infraction_id: &str,
) -> anyhow::Result<bool> {
    let Some(infraction) = mark_infraction_expired(db, guild_id, infraction_id).await? else {
        return Ok(false);
    };

    let config = get_guild_config(db, guild_id).await?;
    let member = fetch_user_profile(http, infraction.member_id).await;
    let summary = InfractionSummary::from(&infraction);

    edit_log_message(
        http,
        config.channel(ConfigKey::InfractionLog),
        infraction.log_message_id,
        expired_embed(&member, summary),
    )
    .await;
    edit_log_message(
        http,
        config.channel(ConfigKey::InfractionAuditLog),
        infraction.audit_message_id,
        expired_embed(&member, summary),
    )
    .await;

    info!(guild_id, infraction_id, "infraction expired");
    Ok(true)
}

/// Arm a timer that expires the infraction at `expires_at`.
pub fn schedule_expiry(
    http: Arc<serenity::Http>,
    db: Database,
    tasks: &TaskMap,
    guild_id: u64,
    infraction_id: String,
    expires_at: u64,
) {
    let delay = delay_until(now_unix_secs(), expires_at);
    let key = infraction_id.clone();

    tasks.schedule(key, delay, async move {
        if let Err(source) = expire_infraction(&http, &db, guild_id, &infraction_id).await {
            error!(?source, guild_id, %infraction_id, "scheduled infraction expiry failed");
        }
    });
}

/// Re-arm timers for every active infraction that still has an expiry.
/// Called once at start-up.
pub async fn schedule_pending_expiries(
    http: Arc<serenity::Http>,
    db: &Database,
    tasks: &TaskMap,
) -> anyhow::Result<usize> {
    let pending = scheduled_infractions(db).await?;
    let count = pending.len();

    for entry in pending {
        schedule_expiry(
            http.clone(),
            db.clone(),
            tasks,
            entry.guild_id,
            entry.infraction_id,
            entry.expires_at,
        );
    }

    info!(count, "pending infraction expiries scheduled");
    Ok(count)
}

/// Infractions the sweep should expire: active, past their expiry, and
/// not owned by a pending timer.
pub(crate) fn sweepable<'a>(
    infractions: &'a [Infraction],
    now: u64,
    tasks: &TaskMap,
) -> Vec<&'a Infraction> {
    infractions
        .iter()
        .filter(|infraction| infraction.is_due(now) && !tasks.contains(&infraction.infraction_id))
        .collect()
}

/// Periodically expire every due infraction, catching anything a timer
/// missed (restarts, lost tasks).
pub fn spawn_expiry_sweeper(
    http: Arc<serenity::Http>,
    db: Database,
    tasks: TaskMap,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let now = now_unix_secs();
            let due = match due_infractions(&db, now).await {
                Ok(due) => due,
                Err(source) => {
                    warn!(?source, "failed to load due infractions");
                    continue;
                }
            };

            let mut expired = 0_usize;
            for infraction in sweepable(&due, now, &tasks) {
                match expire_infraction(&http, &db, infraction.guild_id, &infraction.infraction_id)
                    .await
                {
                    Ok(true) => expired += 1,
                    Ok(false) => {}
                    Err(source) => error!(
                        ?source,
                        infraction_id = %infraction.infraction_id,
                        "infraction expiry sweep failed"
                    ),
                }
            }

            if expired > 0 {
                info!(expired, "expiry sweep finished");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chirp_database::model::infraction::{Infraction, InfractionStatus};
    use chirp_utils::tasks::TaskMap;

    use super::sweepable;

    const NOW: u64 = 1_700_000_000;

    fn infraction(id: &str, expires_at: Option<u64>, status: InfractionStatus) -> Infraction {
        Infraction {
            infraction_id: id.to_owned(),
            guild_id: 1,
            member_id: 2,
            infraction_type: "Strike".to_owned(),
            issued_by_id: 3,
            log_message_id: None,
            audit_message_id: None,
            reason: None,
            created_at: NOW - 600,
            expires_at,
            status,
        }
    }

    #[tokio::test]
    async fn sweep_takes_only_unowned_due_infractions() {
        let tasks = TaskMap::new();
        tasks.schedule("timed", Duration::from_secs(3600), async {});

        let records = [
            infraction("due", Some(NOW - 1), InfractionStatus::Active),
            infraction("done", Some(NOW - 1), InfractionStatus::Expired),
            infraction("forever", None, InfractionStatus::Active),
            infraction("timed", Some(NOW - 1), InfractionStatus::Active),
            infraction("later", Some(NOW + 60), InfractionStatus::Active),
        ];

        let picked: Vec<&str> = sweepable(&records, NOW, &tasks)
            .into_iter()
            .map(|infraction| infraction.infraction_id.as_str())
            .collect();
        assert_eq!(picked, vec!["due"]);

        assert!(tasks.cancel("timed"));
        assert_eq!(sweepable(&records, NOW, &tasks).len(), 2);
    }
}
