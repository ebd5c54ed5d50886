pub mod guild_config;
pub mod infractions;
pub mod promotions;

use anyhow::Context as _;

use crate::database::Database;
use crate::ids::generate_record_id;

pub(crate) use chirp_utils::time::now_unix_secs;

const RECORD_ID_ATTEMPTS: usize = 5;

pub(crate) fn to_db_id(value: u64, field: &'static str) -> anyhow::Result<i64> {
    i64::try_from(value).with_context(|| format!("{field} out of i64 range"))
}

pub(crate) fn from_db_id(value: i64, field: &'static str) -> anyhow::Result<u64> {
    u64::try_from(value).with_context(|| format!("{field} row out of u64 range"))
}

pub(crate) fn from_db_opt(value: Option<i64>, field: &'static str) -> anyhow::Result<Option<u64>> {
    value.map(|raw| from_db_id(raw, field)).transpose()
}

/// Draw record ids until one is free. `exists_sql` takes the id as `$1`.
pub(crate) async fn next_record_id(db: &Database, exists_sql: &str) -> anyhow::Result<String> {
    for _ in 0..RECORD_ID_ATTEMPTS {
        let candidate = generate_record_id();
        let taken: bool = sqlx::query_scalar(exists_sql)
            .bind(&candidate)
            .fetch_one(db.pool())
            .await?;

        if !taken {
            return Ok(candidate);
        }
    }

    anyhow::bail!("could not allocate a free record id after {RECORD_ID_ATTEMPTS} attempts")
}

#[cfg(test)]
mod tests {
    use super::{from_db_id, from_db_opt, now_unix_secs, to_db_id};

    #[test]
    fn snowflake_conversions() {
        assert_eq!(to_db_id(42, "guild_id").unwrap(), 42);
        assert!(to_db_id(u64::MAX, "guild_id").is_err());
        assert_eq!(from_db_id(7, "member_id").unwrap(), 7);
        assert!(from_db_id(-1, "member_id").is_err());
        assert_eq!(from_db_opt(None, "log_message_id").unwrap(), None);
        assert_eq!(from_db_opt(Some(9), "log_message_id").unwrap(), Some(9));
    }

    #[test]
    fn record_timestamps_fit_the_column() {
        let now = now_unix_secs();
        assert!(now > 1_600_000_000);
        assert_eq!(to_db_id(now, "created_at").unwrap() as u64, now);
    }
}
