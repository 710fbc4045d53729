//! In-memory content store: fetches every collection, holds the result as an
//! immutable [`Snapshot`] and serves curated views and lookups from it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::Serialize;

use crate::source::ContentSource;
use crate::types::{Article, ContentKind, Podcast, TvShow, Video};

/// Collections as fetched by one refresh. Derived views are computed on first
/// use and kept for the life of the snapshot.
#[derive(Debug, Default)]
pub struct Snapshot {
    generation: u64,
    articles: Vec<Article>,
    videos: Vec<Video>,
    tv_shows: Vec<TvShow>,
    podcasts: Vec<Podcast>,
    views: OnceLock<Views>,
}

#[derive(Debug, Default)]
struct Views {
    featured_articles: Vec<usize>,
    trending_articles: Vec<usize>,
    editors_pick: Vec<usize>,
    featured_videos: Vec<usize>,
    trending_videos: Vec<usize>,
    featured_podcasts: Vec<usize>,
    index: HashMap<(ContentKind, String), usize>,
}

/// Borrowed handle to one record of any kind.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", content = "item", rename_all = "lowercase")]
pub enum ContentRef<'a> {
    Article(&'a Article),
    Video(&'a Video),
    #[serde(rename = "tvshow")]
    TvShow(&'a TvShow),
    Podcast(&'a Podcast),
}

impl ContentRef<'_> {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentRef::Article(_) => ContentKind::Article,
            ContentRef::Video(_) => ContentKind::Video,
            ContentRef::TvShow(_) => ContentKind::TvShow,
            ContentRef::Podcast(_) => ContentKind::Podcast,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ContentRef::Article(a) => &a.id,
            ContentRef::Video(v) => &v.id,
            ContentRef::TvShow(s) => &s.id,
            ContentRef::Podcast(p) => &p.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ContentRef::Article(a) => &a.title,
            ContentRef::Video(v) => &v.title,
            ContentRef::TvShow(s) => &s.title,
            ContentRef::Podcast(p) => &p.title,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            ContentRef::Article(a) => a.category.as_deref(),
            ContentRef::Video(v) => v.category.as_deref(),
            ContentRef::TvShow(s) => s.category.as_deref(),
            ContentRef::Podcast(p) => p.category.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Everything filed under one category.
#[derive(Debug, Default, Serialize)]
pub struct CategoryListing<'a> {
    pub articles: Vec<&'a Article>,
    pub videos: Vec<&'a Video>,
    pub tv_shows: Vec<&'a TvShow>,
    pub podcasts: Vec<&'a Podcast>,
}

impl CategoryListing<'_> {
    pub fn len(&self) -> usize { self.articles.len() + self.videos.len() + self.tv_shows.len() + self.podcasts.len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Snapshot {
    pub fn new(articles: Vec<Article>, videos: Vec<Video>, tv_shows: Vec<TvShow>, podcasts: Vec<Podcast>) -> Self {
        Self { generation: 0, articles, videos, tv_shows, podcasts, views: OnceLock::new() }
    }

    /// Refresh ticket that produced this snapshot; 0 for the empty initial one.
    pub fn generation(&self) -> u64 { self.generation }

    pub fn articles(&self) -> &[Article] { &self.articles }
    pub fn videos(&self) -> &[Video] { &self.videos }
    pub fn tv_shows(&self) -> &[TvShow] { &self.tv_shows }
    pub fn podcasts(&self) -> &[Podcast] { &self.podcasts }

    pub fn len(&self) -> usize { self.articles.len() + self.videos.len() + self.tv_shows.len() + self.podcasts.len() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    fn views(&self) -> &Views {
        self.views.get_or_init(|| {
            let pick = |flags: Vec<bool>| flags.into_iter().enumerate().filter(|(_, f)| *f).map(|(i, _)| i).collect::<Vec<_>>();
            let mut index = HashMap::with_capacity(self.len());
            // First occurrence wins when the backend repeats an id.
            for (i, a) in self.articles.iter().enumerate() { index.entry((ContentKind::Article, a.id.clone())).or_insert(i); }
            for (i, v) in self.videos.iter().enumerate() { index.entry((ContentKind::Video, v.id.clone())).or_insert(i); }
            for (i, s) in self.tv_shows.iter().enumerate() { index.entry((ContentKind::TvShow, s.id.clone())).or_insert(i); }
            for (i, p) in self.podcasts.iter().enumerate() { index.entry((ContentKind::Podcast, p.id.clone())).or_insert(i); }
            Views {
                featured_articles: pick(self.articles.iter().map(|a| a.featured).collect()),
                trending_articles: pick(self.articles.iter().map(|a| a.trending).collect()),
                editors_pick: pick(self.articles.iter().map(|a| a.editors_pick).collect()),
                featured_videos: pick(self.videos.iter().map(|v| v.featured).collect()),
                trending_videos: pick(self.videos.iter().map(|v| v.trending || v.is_new).collect()),
                featured_podcasts: pick(self.podcasts.iter().map(|p| p.featured).collect()),
                index,
            }
        })
    }

    pub fn featured_articles(&self) -> Vec<&Article> { self.views().featured_articles.iter().map(|&i| &self.articles[i]).collect() }
    pub fn trending_articles(&self) -> Vec<&Article> { self.views().trending_articles.iter().map(|&i| &self.articles[i]).collect() }
    pub fn editors_pick(&self) -> Vec<&Article> { self.views().editors_pick.iter().map(|&i| &self.articles[i]).collect() }
    pub fn featured_videos(&self) -> Vec<&Video> { self.views().featured_videos.iter().map(|&i| &self.videos[i]).collect() }
    /// Videos flagged trending or new.
    pub fn trending_videos(&self) -> Vec<&Video> { self.views().trending_videos.iter().map(|&i| &self.videos[i]).collect() }
    pub fn featured_podcasts(&self) -> Vec<&Podcast> { self.views().featured_podcasts.iter().map(|&i| &self.podcasts[i]).collect() }

    pub fn find(&self, kind: ContentKind, id: &str) -> Option<ContentRef<'_>> {
        let &i = self.views().index.get(&(kind, id.to_string()))?;
        Some(match kind {
            ContentKind::Article => ContentRef::Article(&self.articles[i]),
            ContentKind::Video => ContentRef::Video(&self.videos[i]),
            ContentKind::TvShow => ContentRef::TvShow(&self.tv_shows[i]),
            ContentKind::Podcast => ContentRef::Podcast(&self.podcasts[i]),
        })
    }

    pub fn article(&self, id: &str) -> Option<&Article> {
        match self.find(ContentKind::Article, id)? { ContentRef::Article(a) => Some(a), _ => None }
    }

    pub fn iter(&self) -> impl Iterator<Item = ContentRef<'_>> {
        self.articles.iter().map(ContentRef::Article)
            .chain(self.videos.iter().map(ContentRef::Video))
            .chain(self.tv_shows.iter().map(ContentRef::TvShow))
            .chain(self.podcasts.iter().map(ContentRef::Podcast))
    }

    /// Distinct categories across all collections, most populated first.
    /// Names compare case-insensitively; the first spelling seen is kept.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut order: Vec<CategoryCount> = Vec::new();
        let mut pos: HashMap<String, usize> = HashMap::new();
        for item in self.iter() {
            let Some(name) = item.category().map(str::trim).filter(|c| !c.is_empty()) else { continue };
            let key = name.to_lowercase();
            match pos.get(&key) {
                Some(&i) => order[i].count += 1,
                None => {
                    pos.insert(key, order.len());
                    order.push(CategoryCount { name: name.to_string(), count: 1 });
                }
            }
        }
        order.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())));
        order
    }

    pub fn in_category(&self, name: &str) -> CategoryListing<'_> {
        let wanted = name.trim().to_lowercase();
        let is = |c: &Option<String>| c.as_deref().map(|c| c.trim().to_lowercase() == wanted).unwrap_or(false);
        CategoryListing {
            articles: self.articles.iter().filter(|a| is(&a.category)).collect(),
            videos: self.videos.iter().filter(|v| is(&v.category)).collect(),
            tv_shows: self.tv_shows.iter().filter(|s| is(&s.category)).collect(),
            podcasts: self.podcasts.iter().filter(|p| is(&p.category)).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Applied(Arc<Snapshot>),
    /// The store was invalidated or a newer refresh started while this one was in flight.
    Discarded,
}

/// Fetch-and-hold store over a [`ContentSource`].
pub struct ContentStore<S> {
    source: S,
    limit: usize,
    current: RwLock<Arc<Snapshot>>,
    epoch: AtomicU64,
}

impl<S: ContentSource> ContentStore<S> {
    pub fn new(source: S, limit: usize) -> Self {
        Self { source, limit: limit.max(1), current: RwLock::new(Arc::new(Snapshot::default())), epoch: AtomicU64::new(0) }
    }

    pub fn source(&self) -> &S { &self.source }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Fetch all four collections concurrently and swap in the new snapshot.
    ///
    /// A collection that fails to load is replaced by an empty list; the others
    /// are unaffected.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let limit = self.limit;
        let (articles, videos, tv_shows, podcasts) = tokio::join!(
            self.source.articles(limit),
            self.source.videos(limit),
            self.source.tv_shows(limit),
            self.source.podcasts(limit),
        );
        let mut snap = Snapshot::new(
            or_empty(articles, ContentKind::Article),
            or_empty(videos, ContentKind::Video),
            or_empty(tv_shows, ContentKind::TvShow),
            or_empty(podcasts, ContentKind::Podcast),
        );
        snap.generation = ticket;

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if self.epoch.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, "discarding stale refresh");
            return RefreshOutcome::Discarded;
        }
        let snap = Arc::new(snap);
        tracing::info!(
            articles = snap.articles.len(),
            videos = snap.videos.len(),
            tv_shows = snap.tv_shows.len(),
            podcasts = snap.podcasts.len(),
            "content store refreshed"
        );
        *current = snap.clone();
        RefreshOutcome::Applied(snap)
    }

    /// Tear down: drop the held snapshot and make any refresh still in flight
    /// discard its result. Readers see an empty generation-0 snapshot until
    /// the next refresh.
    pub fn invalidate(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *current = Arc::new(Snapshot::default());
    }
}

fn or_empty<T>(res: crate::error::ApiResult<Vec<T>>, kind: ContentKind) -> Vec<T> {
    res.unwrap_or_else(|e| {
        tracing::warn!(collection = %kind, error = %e, "failed to load collection");
        Vec::new()
    })
}
