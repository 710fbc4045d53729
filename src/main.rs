mod cli;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;

use cli::{Cli, Commands, ListArgs, SearchArgs};
use masthead::api::ListQuery;
use masthead::config::Config;
use masthead::forms::{self, ArticleForm, ContentForm, FormSession, PodcastForm, Submission, VideoForm};
use masthead::search::SearchQuery;
use masthead::store::ContentRef;
use masthead::types::{Content, ContentKind};
use masthead::Masthead;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }
    if let Some(token) = cli.token.clone() {
        config = config.with_token(token);
    }
    tracing::debug!(api = %config.api_url, authed = config.token.is_some(), "config resolved");
    let app = Masthead::new(config).context("building API client")?;
    let json = cli.json;

    match cli.command {
        Commands::List(args) => list(&app, args, json).await,
        Commands::Show { kind, id } => {
            let item = app.get(kind.into(), &id).await.with_context(|| format!("fetching {} {id}", ContentKind::from(kind)))?;
            if json { print_json(&item) } else { print_content(&item); Ok(()) }
        }
        Commands::Delete { kind, ids } => delete(&app, kind.into(), ids, json).await,
        Commands::Save { kind, draft, id } => match ContentKind::from(kind) {
            ContentKind::Article => save::<ArticleForm>(&app, &draft, id, json).await,
            ContentKind::Video => save::<VideoForm>(&app, &draft, id, json).await,
            ContentKind::Podcast => save::<PodcastForm>(&app, &draft, id, json).await,
            ContentKind::TvShow => bail!("tv shows are read-only"),
        },
        Commands::Search(args) => search(&app, args, json).await,
        Commands::Featured => {
            let snap = app.public_snapshot(false).await;
            let items: Vec<ContentRef<'_>> = snap.featured_articles().into_iter().map(ContentRef::Article)
                .chain(snap.featured_videos().into_iter().map(ContentRef::Video))
                .chain(snap.featured_podcasts().into_iter().map(ContentRef::Podcast))
                .collect();
            print_refs(&items, json)
        }
        Commands::Trending => {
            let snap = app.public_snapshot(false).await;
            let items: Vec<ContentRef<'_>> = snap.trending_articles().into_iter().map(ContentRef::Article)
                .chain(snap.trending_videos().into_iter().map(ContentRef::Video))
                .collect();
            print_refs(&items, json)
        }
        Commands::EditorsPick => {
            let snap = app.public_snapshot(false).await;
            let items: Vec<ContentRef<'_>> = snap.editors_pick().into_iter().map(ContentRef::Article).collect();
            print_refs(&items, json)
        }
        Commands::Categories => {
            let snap = app.public_snapshot(false).await;
            let cats = snap.categories();
            if json { return print_json(&cats); }
            for c in cats {
                println!("{:>5}  {}", c.count, c.name);
            }
            Ok(())
        }
        Commands::Category { name } => {
            let snap = app.public_snapshot(false).await;
            let listing = snap.in_category(&name);
            if json { return print_json(&listing); }
            if listing.is_empty() {
                println!("Nothing filed under {name}.");
            }
            let items: Vec<ContentRef<'_>> = listing.articles.iter().map(|&a| ContentRef::Article(a))
                .chain(listing.videos.iter().map(|&v| ContentRef::Video(v)))
                .chain(listing.tv_shows.iter().map(|&s| ContentRef::TvShow(s)))
                .chain(listing.podcasts.iter().map(|&p| ContentRef::Podcast(p)))
                .collect();
            print_refs(&items, false)
        }
        Commands::Stats { top } => {
            let stats = app.dashboard(top).await;
            if json { return print_json(&stats); }
            let t = &stats.totals;
            println!("Content: {} ({} articles, {} videos, {} tv shows, {} podcasts)", t.total(), t.articles, t.videos, t.tv_shows, t.podcasts);
            for (status, n) in &stats.by_status {
                println!("  {status}: {n}");
            }
            println!("Featured: {}  Trending: {}  Editor's pick: {}", stats.featured, stats.trending, stats.editors_pick);
            println!("Total views: {}", stats.total_views);
            if !stats.top_categories.is_empty() {
                println!("Top categories:");
                for c in &stats.top_categories {
                    println!("  {} ({})", c.name, c.count);
                }
            }
            if !stats.top_items.is_empty() {
                println!("Most viewed:");
                for i in &stats.top_items {
                    println!("  [{}] {} - {} views", i.kind, i.title, i.views);
                }
            }
            Ok(())
        }
    }
}

async fn list(app: &Masthead, args: ListArgs, json: bool) -> Result<()> {
    let kind = ContentKind::from(args.kind);
    let query = ListQuery {
        page: args.page,
        limit: args.limit,
        status: args.status.map(Into::into),
        category: args.category,
        search: args.search,
        ..Default::default()
    };
    let listing = app.list(kind, &query).await.with_context(|| format!("listing {kind}s"))?;
    if json { return print_json(&listing); }
    for item in &listing.items {
        println!("{:<24} {:<10} {}", item.id(), item.status(), item.title());
    }
    if let Some(p) = listing.pagination {
        println!("page {}/{} ({} total)", p.page, p.pages, p.total);
    }
    Ok(())
}

async fn delete(app: &Masthead, kind: ContentKind, ids: Vec<String>, json: bool) -> Result<()> {
    let results = join_all(ids.iter().map(|id| app.delete(kind, id))).await;
    let mut failed = 0;
    for (id, res) in ids.iter().zip(&results) {
        match res {
            Ok(()) if !json => println!("deleted {kind} {id}"),
            Ok(()) => {}
            Err(e) => {
                failed += 1;
                eprintln!("failed to delete {kind} {id}: {e}");
            }
        }
    }
    if json {
        let deleted: Vec<&str> = ids.iter().zip(&results).filter(|(_, r)| r.is_ok()).map(|(id, _)| id.as_str()).collect();
        print_json(&serde_json::json!({ "deleted": deleted, "failed": failed }))?;
    }
    if failed > 0 {
        bail!("{failed} of {} deletions failed", ids.len());
    }
    Ok(())
}

async fn save<F>(app: &Masthead, path: &Path, id: Option<String>, json: bool) -> Result<()>
where
    F: ContentForm + DeserializeOwned,
    F::Saved: Serialize,
{
    let draft: F = forms::load_draft(path)?;
    let mut session = match id {
        Some(id) => FormSession::edit(id, draft),
        None => FormSession::create(draft),
    };
    match app.submit(&mut session).await {
        Submission::Saved(saved) => {
            if json { return print_json(saved); }
            let value = serde_json::to_value(saved)?;
            println!("saved {} {} ({})", F::ENTITY, value["id"].as_str().unwrap_or("?"), value["title"].as_str().unwrap_or(""));
            Ok(())
        }
        Submission::Failed(failure) => {
            for (field, msg) in &failure.fields {
                eprintln!("{field}: {msg}");
            }
            if let Some(general) = &failure.general {
                eprintln!("{general}");
            }
            bail!("{} not saved", F::ENTITY)
        }
        Submission::Idle | Submission::Submitting => bail!("{} submit did not complete", F::ENTITY),
    }
}

async fn search(app: &Masthead, args: SearchArgs, json: bool) -> Result<()> {
    let mut query = SearchQuery::new(args.query).kind(args.kind).sort(args.sort);
    if let Some(c) = args.category {
        query = query.category(c);
    }
    let page = app.search(&query, args.page, args.per_page).await;
    if json { return print_json(&page); }
    if page.items.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for r in &page.items {
        println!("{:>3}  [{}] {}{}", r.relevance_score, r.kind, r.title, r.category.as_deref().map(|c| format!(" ({c})")).unwrap_or_default());
    }
    println!("page {}/{} ({} results)", page.page, page.total_pages, page.total);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_refs(items: &[ContentRef<'_>], json: bool) -> Result<()> {
    if json { return print_json(items); }
    for item in items {
        println!("[{}] {:<24} {}", item.kind(), item.id(), item.title());
    }
    Ok(())
}

fn print_content(item: &Content) {
    println!("{} {}", item.kind(), item.id());
    println!("  title:  {}", item.title());
    println!("  status: {}", item.status());
    let (category, description) = match item {
        Content::Article(a) => (a.category.as_deref(), a.excerpt.as_deref()),
        Content::Video(v) => (v.category.as_deref(), v.description.as_deref()),
        Content::TvShow(s) => (s.category.as_deref(), s.description.as_deref()),
        Content::Podcast(p) => (p.category.as_deref(), p.description.as_deref()),
    };
    if let Some(c) = category {
        println!("  category: {c}");
    }
    if let Some(d) = description {
        println!("  {d}");
    }
}
