mod commands;
mod context;
mod pages;

use anyhow::{Context as _, Result};
use backoffice_client::{VersionStatus, VersionWatcher};
use backoffice_logging::setup_logging;
use backoffice_settings::BackofficeConfig;
use backoffice_state::ChartFilters;
use backoffice_utils::ConsoleColors;
use clap::Parser;
use commands::{
    AnnouncementsCommand, ArtistsCommand, ChartsCommand, Cli, Command, PointsCommand, QrCommand,
    RewardsCommand, UsersCommand,
};
use context::Context;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;

async fn version(ctx: &Context, watch: bool) -> Result<()> {
    let mut watcher = VersionWatcher::new(ctx.api_client.clone());

    let current = match watcher.check(&ctx.cancel).await? {
        VersionStatus::Current(info) => info,
        VersionStatus::Stale { latest, .. } => latest,
    };
    pages::print_json(&current)?;

    if watch {
        let interval = Duration::from_secs(ctx.config.version_poll_secs.max(1));
        watcher
            .watch(interval, &ctx.cancel, |latest| {
                eprintln!(
                    "{}",
                    ConsoleColors::alert(&format!(
                        "A newer console build is available ({}), reload to update",
                        latest.version
                    ))
                );
            })
            .await;
    }

    Ok(())
}

async fn run(cli: Cli, config: BackofficeConfig) -> Result<()> {
    let ctx = Context::new(config)?;
    ctx.cancel_on_interrupt();

    match cli.command {
        Command::Users { command } => match command {
            UsersCommand::List {
                page,
                search,
                banned,
            } => pages::list_users(&ctx, &page, search, banned).await,
            UsersCommand::Ban { user_id, reason } => {
                pages::ban_user(&ctx, &user_id, &reason, true).await
            }
            UsersCommand::Unban { user_id } => pages::ban_user(&ctx, &user_id, "", false).await,
        },
        Command::Announcements { command } => match command {
            AnnouncementsCommand::List { page, pinned } => {
                pages::list_announcements(&ctx, &page, pinned).await
            }
            AnnouncementsCommand::Create {
                title,
                body,
                image,
                pinned,
            } => pages::create_announcement(&ctx, title, body, image.as_deref(), pinned).await,
        },
        Command::Qr {
            command:
                QrCommand::List {
                    page,
                    campaign,
                    active,
                },
        } => pages::list_qr_codes(&ctx, &page, campaign, active).await,
        Command::Artists {
            command: ArtistsCommand::List { page, search },
        } => pages::list_artists(&ctx, &page, search).await,
        Command::Points {
            command: PointsCommand::List { page, user },
        } => pages::list_point_modifications(&ctx, &page, user).await,
        Command::Rewards {
            command: RewardsCommand::List { page, active },
        } => pages::list_reward_policies(&ctx, &page, active).await,
        Command::Charts {
            command:
                ChartsCommand::List {
                    page,
                    period,
                    artist,
                },
        } => {
            let filters = ChartFilters {
                period: period.into(),
                artist_id: artist,
            };
            pages::list_chart_entries(&ctx, &page, filters).await
        }
        Command::Upload { file, collection } => {
            let key = pages::upload_with_progress(&ctx, &file, &collection).await?;
            pages::print_json(&serde_json::json!({ "key": key }))
        }
        Command::Version { watch } => version(&ctx, watch)
            .await
            .context("Failed to check console version"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = BackofficeConfig::new();

    if let Err(e) = setup_logging(&config.log_level) {
        eprintln!("{}", ConsoleColors::alert(&e.to_string()));
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!(
                "{}",
                ConsoleColors::alert("Request failed. Check the log for details.")
            );
            ExitCode::FAILURE
        }
    }
}
