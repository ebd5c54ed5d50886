use tracing::warn;

use crate::cache::{RECORD_CACHE_TTL, promotion_key};
use crate::database::Database;
use crate::impls::{from_db_id, from_db_opt, next_record_id, now_unix_secs, to_db_id};
use crate::model::promotion::Promotion;

const PROMOTION_COLUMNS: &str = "promotion_id, guild_id, member_id, new_role_id, issued_by_id, \
     log_message_id, audit_message_id, reason, created_at";

/// Most promotions listed for one member.
pub const MEMBER_PROMOTIONS_LIMIT: i64 = 100;

pub struct NewPromotion<'a> {
    pub guild_id: u64,
    pub member_id: u64,
    pub new_role_id: u64,
    pub issued_by_id: u64,
    pub log_message_id: Option<u64>,
    pub audit_message_id: Option<u64>,
    pub reason: Option<&'a str>,
}

#[derive(sqlx::FromRow)]
struct PromotionRow {
    promotion_id: String,
    guild_id: i64,
    member_id: i64,
    new_role_id: i64,
    issued_by_id: i64,
    log_message_id: Option<i64>,
    audit_message_id: Option<i64>,
    reason: Option<String>,
    created_at: i64,
}

impl TryFrom<PromotionRow> for Promotion {
    type Error = anyhow::Error;

    fn try_from(row: PromotionRow) -> anyhow::Result<Self> {
        Ok(Self {
            promotion_id: row.promotion_id,
            guild_id: from_db_id(row.guild_id, "guild_id")?,
            member_id: from_db_id(row.member_id, "member_id")?,
            new_role_id: from_db_id(row.new_role_id, "new_role_id")?,
            issued_by_id: from_db_id(row.issued_by_id, "issued_by_id")?,
            log_message_id: from_db_opt(row.log_message_id, "log_message_id")?,
            audit_message_id: from_db_opt(row.audit_message_id, "audit_message_id")?,
            reason: row.reason,
            created_at: from_db_id(row.created_at, "created_at")?,
        })
    }
}

pub async fn next_promotion_id(db: &Database) -> anyhow::Result<String> {
    next_record_id(
        db,
        "SELECT EXISTS(SELECT 1 FROM promotions WHERE promotion_id = $1)",
    )
    .await
}

pub async fn create_promotion(
    db: &Database,
    promotion_id: &str,
    new: NewPromotion<'_>,
) -> anyhow::Result<Promotion> {
    let guild_id = to_db_id(new.guild_id, "guild_id")?;
    let member_id = to_db_id(new.member_id, "member_id")?;
    let new_role_id = to_db_id(new.new_role_id, "new_role_id")?;
    let issued_by_id = to_db_id(new.issued_by_id, "issued_by_id")?;
    let log_message_id = new
        .log_message_id
        .map(|id| to_db_id(id, "log_message_id"))
        .transpose()?;
    let audit_message_id = new
        .audit_message_id
        .map(|id| to_db_id(id, "audit_message_id"))
        .transpose()?;
    let created_at = to_db_id(now_unix_secs(), "created_at")?;

    let row: PromotionRow = sqlx::query_as(&format!(
        "INSERT INTO promotions (
            promotion_id, guild_id, member_id, new_role_id, issued_by_id,
            log_message_id, audit_message_id, reason, created_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {PROMOTION_COLUMNS}"
    ))
    .bind(promotion_id)
    .bind(guild_id)
    .bind(member_id)
    .bind(new_role_id)
    .bind(issued_by_id)
    .bind(log_message_id)
    .bind(audit_message_id)
    .bind(new.reason)
    .bind(created_at)
    .fetch_one(db.pool())
    .await?;

    let promotion = Promotion::try_from(row)?;
    db.cache()
        .mirror_json(
            &promotion_key(db.cache(), &promotion.promotion_id),
            &promotion,
            RECORD_CACHE_TTL,
        )
        .await;

    Ok(promotion)
}

pub async fn get_promotion(
    db: &Database,
    guild_id: u64,
    promotion_id: &str,
) -> anyhow::Result<Option<Promotion>> {
    let cache_key = promotion_key(db.cache(), promotion_id);
    match db.cache().get_json::<Promotion>(&cache_key).await {
        Ok(Some(cached)) => return Ok((cached.guild_id == guild_id).then_some(cached)),
        Ok(None) => {}
        Err(e) => warn!(?e, cache_key = %cache_key, "cache get failed; falling back to database"),
    }

    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;
    let row: Option<PromotionRow> = sqlx::query_as(&format!(
        "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE promotion_id = $1 AND guild_id = $2"
    ))
    .bind(promotion_id)
    .bind(guild_id_i64)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let promotion = Promotion::try_from(row)?;
    db.cache()
        .mirror_json(&cache_key, &promotion, RECORD_CACHE_TTL)
        .await;

    Ok(Some(promotion))
}

pub async fn delete_promotion(
    db: &Database,
    guild_id: u64,
    promotion_id: &str,
) -> anyhow::Result<bool> {
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;

    let deleted = sqlx::query("DELETE FROM promotions WHERE promotion_id = $1 AND guild_id = $2")
        .bind(promotion_id)
        .bind(guild_id_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    db.cache()
        .evict(&promotion_key(db.cache(), promotion_id))
        .await;

    Ok(deleted > 0)
}

/// A member's promotions, oldest first, capped at [`MEMBER_PROMOTIONS_LIMIT`].
pub async fn list_member_promotions(
    db: &Database,
    guild_id: u64,
    member_id: u64,
) -> anyhow::Result<Vec<Promotion>> {
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;
    let member_id_i64 = to_db_id(member_id, "member_id")?;

    let rows: Vec<PromotionRow> = sqlx::query_as(&format!(
        "SELECT {PROMOTION_COLUMNS}
         FROM promotions
         WHERE guild_id = $1 AND member_id = $2
         ORDER BY created_at ASC, promotion_id ASC
         LIMIT $3"
    ))
    .bind(guild_id_i64)
    .bind(member_id_i64)
    .bind(MEMBER_PROMOTIONS_LIMIT)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(Promotion::try_from).collect()
}

/// Replace a promotion's reason. `None` clears it.
pub async fn update_promotion_reason(
    db: &Database,
    guild_id: u64,
    promotion_id: &str,
    reason: Option<&str>,
) -> anyhow::Result<Option<Promotion>> {
    let guild_id_i64 = to_db_id(guild_id, "guild_id")?;

    let row: Option<PromotionRow> = sqlx::query_as(&format!(
        "UPDATE promotions
         SET reason = $3
         WHERE promotion_id = $1 AND guild_id = $2
         RETURNING {PROMOTION_COLUMNS}"
    ))
    .bind(promotion_id)
    .bind(guild_id_i64)
    .bind(reason)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let promotion = Promotion::try_from(row)?;
    db.cache()
        .mirror_json(
            &promotion_key(db.cache(), promotion_id),
            &promotion,
            RECORD_CACHE_TTL,
        )
        .await;

    Ok(Some(promotion))
}
