//! Dashboard figures computed from a fetched snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::search::parse_popularity;
use crate::store::{CategoryCount, ContentRef, Snapshot};
use crate::types::{ContentKind, ContentStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub articles: usize,
    pub videos: usize,
    pub tv_shows: usize,
    pub podcasts: usize,
}

impl KindCounts {
    pub fn total(&self) -> usize { self.articles + self.videos + self.tv_shows + self.podcasts }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopItem {
    pub kind: ContentKind,
    pub id: String,
    pub title: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub totals: KindCounts,
    /// Items per status across all kinds, keyed by status name.
    pub by_status: BTreeMap<String, usize>,
    pub featured: usize,
    pub trending: usize,
    pub editors_pick: usize,
    pub top_categories: Vec<CategoryCount>,
    /// Sum of parsed views and plays.
    pub total_views: u64,
    pub top_items: Vec<TopItem>,
}

fn status_of<'a>(item: &ContentRef<'a>) -> &'a ContentStatus {
    match *item {
        ContentRef::Article(a) => &a.status,
        ContentRef::Video(v) => &v.status,
        ContentRef::TvShow(s) => &s.status,
        ContentRef::Podcast(p) => &p.status,
    }
}

fn views_of(item: &ContentRef<'_>) -> u64 {
    let raw = match *item {
        ContentRef::Article(a) => a.views.as_deref(),
        ContentRef::Video(v) => v.views.as_deref(),
        ContentRef::TvShow(s) => s.views.as_deref(),
        ContentRef::Podcast(p) => p.plays.as_deref(),
    };
    raw.map(parse_popularity).unwrap_or(0)
}

/// The admin collections plus TV shows, which only the public side lists.
/// Shows already present in `admin` are kept as they are.
pub fn with_public_shows(admin: &Snapshot, public: &Snapshot) -> Snapshot {
    let shows = if admin.tv_shows().is_empty() { public.tv_shows() } else { admin.tv_shows() };
    Snapshot::new(admin.articles().to_vec(), admin.videos().to_vec(), shows.to_vec(), admin.podcasts().to_vec())
}

/// Summarise `snapshot`, keeping the `top_n` largest categories and items.
pub fn dashboard(snapshot: &Snapshot, top_n: usize) -> DashboardStats {
    let totals = KindCounts {
        articles: snapshot.articles().len(),
        videos: snapshot.videos().len(),
        tv_shows: snapshot.tv_shows().len(),
        podcasts: snapshot.podcasts().len(),
    };

    let mut by_status = BTreeMap::new();
    let mut total_views = 0u64;
    let mut ranked: Vec<TopItem> = Vec::with_capacity(snapshot.len());
    for item in snapshot.iter() {
        *by_status.entry(status_of(&item).as_str().to_string()).or_insert(0) += 1;
        let views = views_of(&item);
        total_views = total_views.saturating_add(views);
        ranked.push(TopItem { kind: item.kind(), id: item.id().to_string(), title: item.title().to_string(), views });
    }
    // Stable: equal view counts keep snapshot order.
    ranked.sort_by(|a, b| b.views.cmp(&a.views));
    ranked.retain(|t| t.views > 0);
    ranked.truncate(top_n);

    let mut top_categories = snapshot.categories();
    top_categories.truncate(top_n);

    DashboardStats {
        totals,
        by_status,
        featured: snapshot.featured_articles().len() + snapshot.featured_videos().len() + snapshot.featured_podcasts().len(),
        trending: snapshot.trending_articles().len() + snapshot.trending_videos().len(),
        editors_pick: snapshot.editors_pick().len(),
        top_categories,
        total_views,
        top_items: ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Article, Podcast, TvShow, Video};

    #[test]
    fn summarises_snapshot() {
        let snap = Snapshot::new(
            vec![
                Article { id: "a1".into(), title: "One".into(), status: ContentStatus::Published, featured: true, editors_pick: true, category: Some("Tech".into()), views: Some("2K".into()), ..Default::default() },
                Article { id: "a2".into(), title: "Two".into(), status: ContentStatus::Draft, trending: true, category: Some("tech".into()), ..Default::default() },
            ],
            vec![Video { id: "v1".into(), title: "Clip".into(), status: ContentStatus::Published, views: Some("12K".into()), is_new: true, category: Some("Film".into()), ..Default::default() }],
            vec![TvShow { id: "s1".into(), title: "Show".into(), ..Default::default() }],
            vec![Podcast { id: "p1".into(), title: "Pod".into(), status: ContentStatus::Published, plays: Some("500".into()), featured: true, ..Default::default() }],
        );
        let s = dashboard(&snap, 2);
        assert_eq!(s.totals.total(), 5);
        assert_eq!(s.by_status["published"], 3);
        assert_eq!(s.by_status["draft"], 2);
        assert_eq!(s.featured, 2);
        assert_eq!(s.trending, 2);
        assert_eq!(s.editors_pick, 1);
        assert_eq!(s.total_views, 14_500);
        assert_eq!(s.top_items.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["v1", "a1"]);
        assert_eq!(s.top_categories[0], CategoryCount { name: "Tech".into(), count: 2 });
        assert_eq!(s.top_categories.len(), 2);
    }

    #[test]
    fn public_shows_count_towards_the_dashboard() {
        let admin = Snapshot::new(vec![Article { id: "a1".into(), title: "One".into(), views: Some("10".into()), ..Default::default() }], vec![], vec![], vec![]);
        let public = Snapshot::new(
            vec![],
            vec![],
            vec![TvShow { id: "s1".into(), title: "Late Night".into(), status: ContentStatus::Published, category: Some("Comedy".into()), views: Some("3K".into()), ..Default::default() }],
            vec![],
        );
        let s = dashboard(&with_public_shows(&admin, &public), 5);
        assert_eq!(s.totals.tv_shows, 1);
        assert_eq!(s.totals.articles, 1);
        assert_eq!(s.top_items[0].id, "s1");
        assert_eq!(s.top_categories[0].name, "Comedy");
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let s = dashboard(&Snapshot::default(), 5);
        assert_eq!(s.totals, KindCounts::default());
        assert!(s.by_status.is_empty() && s.top_items.is_empty() && s.top_categories.is_empty());
        assert_eq!(s.total_views, 0);
    }
}
