mod config;

use std::collections::HashSet;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;

use chirp_api::{ApiAuth, ApiState, CacheDirectory};
use chirp_commands::{schedule_pending_expiries, spawn_expiry_sweeper};
use chirp_core::{Data, Error};
use chirp_database::{CacheService, Database, MIGRATOR};
use config::{BotConfig, CacheBackendKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();
    let config = BotConfig::from_env()?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    info!("PostgreSQL connection established.");

    if config.auto_run_migrations {
        MIGRATOR.run(&db_pool).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let cache = build_cache(&config).await;
    info!(backend = cache.backend_name(), "Cache configured.");
    let db = Database::with_cache(db_pool, cache);

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut owners = HashSet::new();
    if let Some(owner_id) = config.owner_id {
        owners.insert(serenity::UserId::new(owner_id));
    }

    let guild_id = config.guild_id;
    let sweep_every = config.infraction_sweep;
    let setup_db = db.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: chirp_commands::commands(),
            owners,
            on_error: |error| Box::pin(on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(chirp_utils::COMMAND_PREFIX.to_string()),
                mention_as_prefix: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            let db = setup_db.clone();
            Box::pin(async move {
                info!(user = %ready.user.tag(), "Chirp is ready.");

                match guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                        info!(guild_id, "Commands registered in guild.");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        info!("Commands registered globally.");
                    }
                }

                let data = Data::new(db);

                match schedule_pending_expiries(ctx.http.clone(), &data.db, &data.expiries).await {
                    Ok(count) => info!(count, "Pending infraction expiries scheduled."),
                    Err(err) => warn!(?err, "Failed to schedule pending infraction expiries."),
                }
                spawn_expiry_sweeper(
                    ctx.http.clone(),
                    data.db.clone(),
                    data.expiries.clone(),
                    sweep_every,
                );

                Ok(data)
            })
        })
        .build();

    info!("Chirp is connecting...");

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    if config.api_enabled {
        let auth = ApiAuth::new(config.api_token.clone(), config.secret_key.clone());
        if !auth.is_configured() {
            warn!("Dashboard API has no API_TOKEN or SECRET_KEY; /api routes will refuse requests.");
        }

        let state = ApiState::new(db.clone(), CacheDirectory::new(client.cache.clone()), auth);
        let addr = config.api_addr;
        tokio::spawn(async move {
            if let Err(err) = chirp_api::serve(state, addr).await {
                error!(?err, "dashboard API exited");
            }
        });
    } else {
        info!("Dashboard API disabled (set API_ENABLED=true to enable).");
    }

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("Shutdown signal received; stopping shards.");
        shard_manager.shutdown_all().await;
    });

    let result = client.start().await;
    db.close().await;
    info!("Database pool closed.");

    result?;
    Ok(())
}

async fn build_cache(config: &BotConfig) -> CacheService {
    let prefix = config.cache_key_prefix.clone();

    match config.cache_backend {
        CacheBackendKind::Memory => CacheService::memory(prefix),
        CacheBackendKind::Disabled => {
            info!("Cache disabled (CACHE_BACKEND=none); every read goes to the database.");
            CacheService::disabled(prefix)
        }
        CacheBackendKind::Redis => {
            let Some(redis_url) = config.redis_url.as_deref() else {
                warn!(key_prefix = %prefix, "CACHE_BACKEND=redis but REDIS_URL is missing; using the in-memory cache.");
                return CacheService::memory(prefix);
            };

            let cache = match CacheService::redis(redis_url, prefix.clone()) {
                Ok(cache) => cache,
                Err(err) => {
                    warn!(?err, key_prefix = %prefix, "Failed to initialize Redis cache; using the in-memory cache.");
                    return CacheService::memory(prefix);
                }
            };

            if let Err(err) = cache.ping().await {
                warn!(
                    ?err,
                    "Redis cache ping failed; cache operations will continue with fallback behavior."
                );
            } else {
                info!(key_prefix = %prefix, "Redis cache health check passed.");
            }

            cache
        }
    }
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            warn!(?err, "Failed to install SIGTERM handler; waiting for Ctrl-C only.");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(?error, command = %ctx.command().qualified_name, "command error");

            let embed = serenity::CreateEmbed::new()
                .title("Command Error")
                .description("Something went wrong while running this command.")
                .color(chirp_utils::embed::DEFAULT_EMBED_COLOR);

            let _ = ctx
                .send(poise::CreateReply::default().ephemeral(true).embed(embed))
                .await;
        }
        poise::FrameworkError::ArgumentParse { ctx, input, .. } => {
            let usage = format!(
                "Usage: `{}{}`",
                chirp_utils::COMMAND_PREFIX,
                ctx.command().qualified_name
            );
            let description = if let Some(input) = input {
                format!("Invalid argument: `{}`\n{}", input, usage)
            } else {
                format!("Missing required argument.\n{}", usage)
            };

            let _ = ctx.say(description).await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            debug!("unknown command invocation");
        }
        poise::FrameworkError::NotAnOwner { .. } => {
            debug!("owner-only command used by a non-owner");
        }
        other => {
            if let Err(err) = poise::builtins::on_error(other).await {
                error!(?err, "framework error handler failed");
            }
        }
    }
}
