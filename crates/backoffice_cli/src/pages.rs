use crate::commands::PageArgs;
use crate::context::Context;
use anyhow::{Context as _, Result};
use backoffice_client::{UploadFile, UploadStage};
use backoffice_error::ApiError;
use backoffice_state::{
    AnnouncementFilters, ArtistFilters, ChartFilters, ListDomain, ListState,
    PointModificationFilters, QrCodeFilters, RewardPolicyFilters, Store, StoreState, UserFilters,
};
use backoffice_types::{AnnouncementRequest, ListQuery, Page};
use backoffice_utils::ConsoleColors;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::future::Future;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fetch the store's current page and write the result back.
///
/// The query is taken from the store before the request goes out. A result
/// arriving after a newer fetch started, or after `cancel` fired, is dropped.
pub async fn refresh_list<D, F, Fut>(
    store: &Store<ListState<D>>,
    cancel: &CancellationToken,
    fetch: F,
) -> Result<ListState<D>>
where
    D: ListDomain,
    F: FnOnce(ListQuery) -> Fut,
    Fut: Future<Output = Result<Page<D::Item>, ApiError>>,
{
    let query = store.read(|s| s.query());
    let ticket = store.begin_fetch();

    match fetch(query).await {
        Ok(page) => {
            let applied = store
                .commit(ticket, cancel, |s| s.apply_page(page))
                .with_context(|| format!("Failed to persist {} store", D::KEY))?;
            if applied.is_none() {
                debug!(store = D::KEY, "Fetched page was superseded");
            }
            Ok(store.snapshot())
        }
        Err(e) => {
            store.fail(ticket, cancel, &e.to_string());
            Err(e).with_context(|| format!("Failed to load {}", D::KEY))
        }
    }
}

/// Apply the command line filters and page before fetching.
/// Stores that skip rehydration on construction are restored here first so
/// the saved page and filters are not overwritten with defaults.
fn prepare<D: ListDomain>(
    store: &Store<ListState<D>>,
    filters: D::Filters,
    page: &PageArgs,
) -> Result<()> {
    if !store.is_hydrated() {
        store
            .rehydrate()
            .with_context(|| format!("Failed to restore {} store", D::KEY))?;
    }

    store
        .update(|s| {
            s.set_filters(filters);
            if let Some(page) = page.page {
                s.set_page(page);
            }
        })
        .with_context(|| format!("Failed to persist {} store", D::KEY))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", rendered);
    Ok(())
}

fn print_list<D: ListDomain>(state: &ListState<D>) -> Result<()> {
    print_json(&state.persisted())?;
    eprintln!(
        "{}",
        ConsoleColors::highlight(&format!(
            "{}: page {} of {} ({} total)",
            D::KEY,
            state.page,
            state.page_count().max(1),
            state.total
        ))
    );
    Ok(())
}

pub async fn list_users(
    ctx: &Context,
    page: &PageArgs,
    search: Option<String>,
    banned_only: bool,
) -> Result<()> {
    let store = &*ctx.stores.users;
    prepare(store, UserFilters { search, banned_only }, page)?;

    let state = refresh_list(store, &ctx.cancel, |query| async move {
        ctx.api_client
            .list_users(&query, ctx.auth_token(), &ctx.cancel)
            .await
    })
    .await?;
    print_list(&state)
}

pub async fn ban_user(ctx: &Context, user_id: &str, reason: &str, ban: bool) -> Result<()> {
    let user = if ban {
        ctx.api_client
            .ban_user(user_id, reason, ctx.auth_token(), &ctx.cancel)
            .await
            .with_context(|| format!("Failed to ban user {}", user_id))?
    } else {
        ctx.api_client
            .unban_user(user_id, ctx.auth_token(), &ctx.cancel)
            .await
            .with_context(|| format!("Failed to unban user {}", user_id))?
    };

    ctx.stores
        .users
        .update(|s| {
            s.replace(user.clone());
        })
        .context("Failed to persist users store")?;
    print_json(&user)
}

pub async fn list_announcements(ctx: &Context, page: &PageArgs, pinned_only: bool) -> Result<()> {
    let store = &*ctx.stores.announcements;
    prepare(store, AnnouncementFilters { pinned_only }, page)?;

    let state = refresh_list(store, &ctx.cancel, |query| async move {
        ctx.api_client
            .list_announcements(&query, ctx.auth_token(), &ctx.cancel)
            .await
    })
    .await?;
    print_list(&state)
}

pub async fn create_announcement(
    ctx: &Context,
    title: String,
    body: String,
    image: Option<&Path>,
    is_pinned: bool,
) -> Result<()> {
    let image_key = match image {
        Some(path) => Some(upload_with_progress(ctx, path, "announcements").await?),
        None => None,
    };

    let request = AnnouncementRequest {
        title,
        body,
        image_key,
        is_pinned,
    };
    let announcement = ctx
        .api_client
        .create_announcement(&request, ctx.auth_token(), &ctx.cancel)
        .await
        .context("Failed to create announcement")?;

    ctx.stores
        .announcements
        .update(|s| s.upsert(announcement.clone()))
        .context("Failed to persist announcements store")?;
    print_json(&announcement)
}

pub async fn list_qr_codes(
    ctx: &Context,
    page: &PageArgs,
    campaign: Option<String>,
    active_only: bool,
) -> Result<()> {
    let store = &*ctx.stores.qr_codes;
    prepare(
        store,
        QrCodeFilters {
            campaign,
            active_only,
        },
        page,
    )?;

    let state = refresh_list(store, &ctx.cancel, |query| async move {
        ctx.api_client
            .list_qr_codes(&query, ctx.auth_token(), &ctx.cancel)
            .await
    })
    .await?;
    print_list(&state)
}

pub async fn list_artists(ctx: &Context, page: &PageArgs, search: Option<String>) -> Result<()> {
    let store = &*ctx.stores.artists;
    prepare(store, ArtistFilters { search }, page)?;

    let state = refresh_list(store, &ctx.cancel, |query| async move {
        ctx.api_client
            .list_artists(&query, ctx.auth_token(), &ctx.cancel)
            .await
    })
    .await?;
    print_list(&state)
}

pub async fn list_point_modifications(
    ctx: &Context,
    page: &PageArgs,
    user_id: Option<String>,
) -> Result<()> {
    let store = &*ctx.stores.point_modifications;
    prepare(store, PointModificationFilters { user_id }, page)?;

    let state = refresh_list(store, &ctx.cancel, |query| async move {
        ctx.api_client
            .list_point_modifications(&query, ctx.auth_token(), &ctx.cancel)
            .await
    })
    .await?;
    print_list(&state)
}

pub async fn list_reward_policies(ctx: &Context, page: &PageArgs, active_only: bool) -> Result<()> {
    let store = &*ctx.stores.reward_policies;
    prepare(store, RewardPolicyFilters { active_only }, page)?;

    let state = refresh_list(store, &ctx.cancel, |query| async move {
        ctx.api_client
            .list_reward_policies(&query, ctx.auth_token(), &ctx.cancel)
            .await
    })
    .await?;
    print_list(&state)
}

pub async fn list_chart_entries(ctx: &Context, page: &PageArgs, filters: ChartFilters) -> Result<()> {
    let store = &*ctx.stores.charts;
    prepare(store, filters, page)?;

    let state = refresh_list(store, &ctx.cancel, |query| async move {
        ctx.api_client
            .list_chart_entries(&query, ctx.auth_token(), &ctx.cancel)
            .await
    })
    .await?;
    print_list(&state)
}

/// Run the four step upload with a progress bar and return the object key
pub async fn upload_with_progress(ctx: &Context, path: &Path, collection: &str) -> Result<String> {
    let file = UploadFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let bar = ProgressBar::new(UploadStage::Done.progress().unwrap_or(100) as u64);
    let style = ProgressStyle::with_template("{msg} [{bar:40.green/magenta}] {pos}%")
        .context("Failed to build progress bar")?;
    bar.set_style(style);
    bar.set_message(ConsoleColors::highlight(&format!("Uploading {}", file.filename)));

    let result = ctx
        .uploader
        .upload_file(&file, collection, ctx.auth_token(), &ctx.cancel, |progress| {
            bar.set_position(progress as u64)
        })
        .await;

    match result {
        Ok(key) => {
            bar.finish_with_message(ConsoleColors::success(&format!("Uploaded {}", file.filename)));
            Ok(key)
        }
        Err(e) => {
            bar.abandon();
            Err(e).with_context(|| format!("Failed to upload {}", file.filename))
        }
    }
}
