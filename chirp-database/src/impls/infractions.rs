use tracing::warn;

use crate::cache::{RECORD_CACHE_TTL, infraction_key};
use crate::database::Database;
use crate::impls::{from_db_id, from_db_opt, next_record_id, now_unix_secs, to_db_id};
use crate::model::infraction::{Infraction, InfractionStatus, PendingExpiry};

const INFRACTION_COLUMNS: &str = "infraction_id, guild_id, member_id, infraction_type, issued_by_id, \
     log_message_id, audit_message_id, reason, created_at, expires_at, status";

/// Upper bound on rows handled by a single expiry sweep.
pub const SWEEP_BATCH_LIMIT: i64 = 100;

pub struct NewInfraction<'a> {
    pub guild_id: u64,
    pub member_id: u64,
    pub infraction_type: &'a str,
    pub issued_by_id: u64,
    pub log_message_id: Option<u64>,
    pub audit_message_id: Option<u64>,
    pub reason: Option<&'a str>,
    pub expires_at: Option<u64>,
}

#[derive(sqlx::FromRow)]
struct InfractionRow {
    infraction_id: String,
    guild_id: i64,
    member_id: i64,
    infraction_type: String,
    issued_by_id: i64,
    log_message_id: Option<i64>,
    audit_message_id: Option<i64>,
    reason: Option<String>,
    created_at: i64,
    expires_at: Option<i64>,
    status: String,
}

impl TryFrom<InfractionRow> for Infraction {
    type Error = anyhow::Error;

    fn try_from(row: InfractionRow) -> anyhow::Result<Self> {
        Ok(Self {
            infraction_id: row.infraction_id,
            guild_id: from_db_id(row.guild_id, "guild_id")?,
            member_id: from_db_id(row.member_id, "member_id")?,
            infraction_type: row.infraction_type,
            issued_by_id: from_db_id(row.issued_by_id, "issued_by_id")?,
            log_message_id: from_db_opt(row.log_message_id, "log_message_id")?,
            audit_message_id: from_db_opt(row.audit_message_id, "audit_message_id")?,
            reason: row.reason,
            created_at: from_db_id(row.created_at, "created_at")?,
            expires_at: from_db_opt(row.expires_at, "expires_at")?,
            status: InfractionStatus::parse(&row.status),
        })
    }
}

#[derive(sqlx::FromRow)]
struct PendingExpiryRow {
    infraction_id: String,
    guild_id: i64,
    expires_at: i64,
}

/// Pick an infraction id that is not in use yet.
pub async fn next_infraction_id(db: &Database) -> anyhow::Result<String> {
    next_record_id(
        db,
        "SELECT EXISTS(SELECT 1 FROM infractions WHERE infraction_id = $1)",
    )
    .await
}

pub async fn create_infraction(
    db: &Database,
    infraction_id: &str,
    new: NewInfraction<'_>,
) -> anyhow::Result<Infraction> {
    let guild_id = to_db_id(new.guild_id, "guild_id")?;
    let member_id = to_db_id(new.member_id, "member_id")?;
    let issued_by_id = to_db_id(new.issued_by_id, "issued_by_id")?;
    let log_message_id = new
        .log_message_id
        .map(|id| to_db_id(id, "log_message_id"))
        .transpose()?;
    let audit_message_id = new
        .audit_message_id
        .map(|id| to_db_id(id, "audit_message_id"))
        .transpose()?;
    let expires_at = new
        .expires_at
        .map(|at| to_db_id(at, "expires_at"))
        .transpose()?;
    let created_at = to_db_id(now_unix_secs(), "created_at")?;

    let row: InfractionRow = sqlx::query_as(&format!(
        "INSERT INTO infractions (
            infraction_id, guild_id, member_id, infraction_type, issued_by_id,
            log_message_id, audit_message_id, reason, created_at, expires_at, status
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'active')
         RETURNING {INFRACTION_COLUMNS}"
    ))
    .bind(infraction_id)
    .bind(guild_id)
    .bind(member_id)
    .bind(new.infraction_type)
    .bind(issued_by_id)
    .bind(log_message_id)
    .bind(audit_message_id)
    .bind(new.reason)
    .bind(created_at)
    .bind(expires_at)
    .fetch_one(db.pool())
    .await?;

    let infraction = Infraction::try_from(row)?;
    db.cache()
        .mirror_json(
            &infraction_key(db.cache(), &infraction.infraction_id),
            &infraction,
            RECORD_CACHE_TTL,
        )
        .await;

    Ok(infraction)
}

/// Look an infraction up by id within one guild. Cached records from other
/// guilds are treated as missing.
pub async fn get_infraction(
    db: &Database,
    guild_id: u64,
    infraction_id: &str,
) -> anyhow::Result<Option<Infraction>> {
    let cache_key = infraction_key(db.cache(), infraction_id);
    match db.cache().get_json::<Infraction>(&cache_key).await {
        Ok(Some(cached)) => return Ok((cached.guild_id == guild_id).then_some(cached)),
        Ok(None) => {}
        Err(e) => warn!(?e, cache_key = %cache_key, "cache get failed; falling back to database"),
    }

    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;
    let row: Option<InfractionRow> = sqlx::query_as(&format!(
        "SELECT {INFRACTION_COLUMNS} FROM infractions WHERE infraction_id = $1 AND guild_id = $2"
    ))
    .bind(infraction_id)
    .bind(guild_id_i64)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let infraction = Infraction::try_from(row)?;
    db.cache()
        .mirror_json(&cache_key, &infraction, RECORD_CACHE_TTL)
        .await;

    Ok(Some(infraction))
}

pub async fn delete_infraction(
    db: &Database,
    guild_id: u64,
    infraction_id: &str,
) -> anyhow::Result<bool> {
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;

    let deleted = sqlx::query("DELETE FROM infractions WHERE infraction_id = $1 AND guild_id = $2")
        .bind(infraction_id)
        .bind(guild_id_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    db.cache()
        .evict(&infraction_key(db.cache(), infraction_id))
        .await;

    Ok(deleted > 0)
}

/// A member's infractions, newest first.
pub async fn list_member_infractions(
    db: &Database,
    guild_id: u64,
    member_id: u64,
    limit: i64,
) -> anyhow::Result<Vec<Infraction>> {
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;
    let member_id_i64 = to_db_id(member_id, "member_id")?;

    let rows: Vec<InfractionRow> = sqlx::query_as(&format!(
        "SELECT {INFRACTION_COLUMNS}
         FROM infractions
         WHERE guild_id = $1 AND member_id = $2
         ORDER BY created_at DESC, infraction_id ASC
         LIMIT $3"
    ))
    .bind(guild_id_i64)
    .bind(member_id_i64)
    .bind(limit.max(1))
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(Infraction::try_from).collect()
}

/// Active infractions whose expiry is at or before `now`.
pub async fn due_infractions(db: &Database, now: u64) -> anyhow::Result<Vec<Infraction>> {
    let now_i64 = to_db_id(now, "now")?;

    let rows: Vec<InfractionRow> = sqlx::query_as(&format!(
        "SELECT {INFRACTION_COLUMNS}
         FROM infractions
         WHERE status = 'active' AND expires_at IS NOT NULL AND expires_at <= $1
         ORDER BY expires_at ASC
         LIMIT $2"
    ))
    .bind(now_i64)
    .bind(SWEEP_BATCH_LIMIT)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(Infraction::try_from).collect()
}

/// Every active infraction that still has an expiry ahead of it.
pub async fn scheduled_infractions(db: &Database) -> anyhow::Result<Vec<PendingExpiry>> {
    let rows: Vec<PendingExpiryRow> = sqlx::query_as(
        "SELECT infraction_id, guild_id, expires_at
         FROM infractions
         WHERE status = 'active' AND expires_at IS NOT NULL
         ORDER BY expires_at ASC",
    )
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(PendingExpiry {
                infraction_id: row.infraction_id,
                guild_id: from_db_id(row.guild_id, "guild_id")?,
                expires_at: from_db_id(row.expires_at, "expires_at")?,
            })
        })
        .collect()
}

/// Flip an active infraction to expired. Returns `None` when the record is
/// gone or was already expired, so concurrent expiry paths act only once.
pub async fn mark_infraction_expired(
    db: &Database,
    guild_id: u64,
    infraction_id: &str,
) -> anyhow::Result<Option<Infraction>> {
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;

    let row: Option<InfractionRow> = sqlx::query_as(&format!(
        "UPDATE infractions
         SET status = 'expired'
         WHERE infraction_id = $1 AND guild_id = $2 AND status = 'active'
         RETURNING {INFRACTION_COLUMNS}"
    ))
    .bind(infraction_id)
    .bind(guild_id_i64)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let infraction = Infraction::try_from(row)?;
    db.cache()
        .mirror_json(
            &infraction_key(db.cache(), infraction_id),
            &infraction,
            RECORD_CACHE_TTL,
        )
        .await;

    Ok(Some(infraction))
}
