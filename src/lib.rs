pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod paging;
pub mod search;
pub mod source;
pub mod stats;
pub mod store;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::api::{ApiClient, ListQuery};
    pub use crate::config::Config;
    pub use crate::error::{ApiError, ApiResult, FieldError};
    pub use crate::forms::{ArticleForm, ContentForm, FormSession, PodcastForm, Submission, VideoForm};
    pub use crate::paging::Page;
    pub use crate::search::{SearchQuery, SearchResult, SortMode, TypeFilter};
    pub use crate::stats::DashboardStats;
    pub use crate::store::{ContentRef, ContentStore, Snapshot};
    pub use crate::types::{Article, Content, ContentKind, ContentStatus, Listing, Podcast, TvShow, Video};
    pub use crate::Masthead;
}

use std::sync::Arc;

use crate::api::{ApiClient, ListQuery};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::forms::{ContentForm, FormSession, Submission};
use crate::paging::Page;
use crate::search::{SearchQuery, SearchResult};
use crate::source::ApiSource;
use crate::stats::DashboardStats;
use crate::store::{ContentStore, RefreshOutcome, Snapshot};
use crate::types::{Content, ContentKind, Listing};

/// Async library entry point. Owns the API client and one content store per
/// audience: `public` for the reading side, `admin` for the editorial side.
pub struct Masthead {
    config: Config,
    client: ApiClient,
    public: ContentStore<ApiSource>,
    admin: ContentStore<ApiSource>,
}

impl Masthead {
    pub fn new(config: Config) -> ApiResult<Self> {
        let client = ApiClient::new(&config)?;
        let public = ContentStore::new(ApiSource::public(client.clone()), config.page_size);
        let admin = ContentStore::new(ApiSource::admin(client.clone()), config.page_size);
        Ok(Self { config, client, public, admin })
    }

    pub fn config(&self) -> &Config { &self.config }
    pub fn client(&self) -> &ApiClient { &self.client }
    pub fn public_store(&self) -> &ContentStore<ApiSource> { &self.public }
    pub fn admin_store(&self) -> &ContentStore<ApiSource> { &self.admin }

    /// Public snapshot, fetched on first use or when `refresh` is set.
    pub async fn public_snapshot(&self, refresh: bool) -> Arc<Snapshot> {
        load(&self.public, refresh).await
    }

    /// Admin snapshot (every status), fetched on first use or when `refresh` is set.
    pub async fn admin_snapshot(&self, refresh: bool) -> Arc<Snapshot> {
        load(&self.admin, refresh).await
    }

    /// Relevance search over the public collections, one page at a time.
    pub async fn search(&self, query: &SearchQuery, page: usize, per_page: usize) -> Page<SearchResult> {
        let snap = self.public_snapshot(false).await;
        search::search_page(&snap, query, page, per_page)
    }

    /// Dashboard over the admin snapshot, with TV shows taken from the public one.
    pub async fn dashboard(&self, top_n: usize) -> DashboardStats {
        let (admin, public) = tokio::join!(self.admin_snapshot(false), self.public_snapshot(false));
        stats::dashboard(&stats::with_public_shows(&admin, &public), top_n)
    }

    /// Admin listing of one kind. TV shows only have a public listing.
    pub async fn list(&self, kind: ContentKind, query: &ListQuery) -> ApiResult<Listing<Content>> {
        fn wrap<T>(l: Listing<T>, f: fn(T) -> Content) -> Listing<Content> {
            Listing { items: l.items.into_iter().map(f).collect(), pagination: l.pagination }
        }
        Ok(match kind {
            ContentKind::Article => wrap(self.client.list_articles(query).await?, Content::Article),
            ContentKind::Video => wrap(self.client.list_videos(query).await?, Content::Video),
            ContentKind::TvShow => wrap(self.client.public_tv_shows(query).await?, Content::TvShow),
            ContentKind::Podcast => wrap(self.client.list_podcasts(query).await?, Content::Podcast),
        })
    }

    pub async fn get(&self, kind: ContentKind, id: &str) -> ApiResult<Content> {
        Ok(match kind {
            ContentKind::Article => Content::Article(self.client.get_article(id).await?),
            ContentKind::Video => Content::Video(self.client.get_video(id).await?),
            ContentKind::Podcast => Content::Podcast(self.client.get_podcast(id).await?),
            ContentKind::TvShow => {
                // No single-show endpoint; look it up in the public snapshot.
                let snap = self.public_snapshot(false).await;
                let show = snap.tv_shows().iter().find(|s| s.id == id).cloned();
                Content::TvShow(show.ok_or_else(|| ApiError::Status { status: 404, message: format!("tv show {id} not found") })?)
            }
        })
    }

    pub async fn delete(&self, kind: ContentKind, id: &str) -> ApiResult<()> {
        match kind {
            ContentKind::Article => self.client.delete_article(id).await,
            ContentKind::Video => self.client.delete_video(id).await,
            ContentKind::Podcast => self.client.delete_podcast(id).await,
            ContentKind::TvShow => Err(ApiError::Rejected { message: "tv shows are read-only".into() }),
        }
    }

    /// Submit a form session through the API. A successful save invalidates the
    /// admin snapshot so the next read refetches.
    pub async fn submit<'s, F: ContentForm>(&self, session: &'s mut FormSession<F>) -> &'s Submission<F::Saved> {
        let state = session.submit(&self.client).await;
        if state.is_saved() {
            self.admin.invalidate();
        }
        state
    }
}

async fn load(store: &ContentStore<ApiSource>, refresh: bool) -> Arc<Snapshot> {
    let current = store.snapshot();
    if !refresh && current.generation() > 0 {
        return current;
    }
    match store.refresh().await {
        RefreshOutcome::Applied(snap) => snap,
        RefreshOutcome::Discarded => store.snapshot(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tv_shows_cannot_be_deleted() {
        let app = Masthead::new(Config::default()).unwrap();
        let err = app.delete(ContentKind::TvShow, "s1").await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { .. }));
    }

    #[test]
    fn stores_start_empty() {
        let app = Masthead::new(Config::default()).unwrap();
        assert_eq!(app.public_store().snapshot().generation(), 0);
        assert!(app.admin_store().snapshot().is_empty());
        assert_eq!(app.client().base_url().as_str(), config::DEFAULT_API_URL);
    }
}
