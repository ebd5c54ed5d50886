use chirp_database::Database;
use chirp_utils::tasks::TaskMap;

pub type Error = anyhow::Error;

/// Shared state handed to every command.
#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    /// Pending infraction expiries, keyed by infraction id.
    pub expiries: TaskMap,
}

impl Data {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            expiries: TaskMap::new(),
        }
    }
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type ApplicationContext<'a> = poise::ApplicationContext<'a, Data, Error>;
