//! Client-side relevance search over a fetched [`Snapshot`].
//!
//! Scoring is a plain case-insensitive substring heuristic:
//!
//! | field                     | points |
//! |---------------------------|--------|
//! | title contains query      | 10     |
//! | title starts with query   | +5     |
//! | category                  | 5      |
//! | description / excerpt     | 3      |
//! | author / guest / host     | 4      |
//! | any tag                   | 2      |
//!
//! Items scoring zero are dropped. An empty query matches nothing.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::paging::{paginate, Page};
use crate::store::{ContentRef, Snapshot};
use crate::types::{parse_date, ContentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Articles,
    Videos,
    TvShows,
    Podcasts,
}

impl TypeFilter {
    pub fn admits(&self, kind: ContentKind) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Articles => kind == ContentKind::Article,
            TypeFilter::Videos => kind == ContentKind::Video,
            TypeFilter::TvShows => kind == ContentKind::TvShow,
            TypeFilter::Podcasts => kind == ContentKind::Podcast,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(TypeFilter::All),
            "article" | "articles" => Ok(TypeFilter::Articles),
            "video" | "videos" => Ok(TypeFilter::Videos),
            "tvshow" | "tvshows" | "tv-shows" | "shows" => Ok(TypeFilter::TvShows),
            "podcast" | "podcasts" => Ok(TypeFilter::Podcasts),
            other => Err(format!("unknown content type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Relevance,
    Date,
    Popularity,
}

impl FromStr for SortMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortMode::Relevance),
            "date" | "newest" => Ok(SortMode::Date),
            "popularity" | "popular" => Ok(SortMode::Popularity),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { SortMode::Relevance => "relevance", SortMode::Date => "date", SortMode::Popularity => "popularity" })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub kind: TypeFilter,
    /// `None` (or "all") means every category.
    pub category: Option<String>,
    pub sort: SortMode,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self { Self { text: text.into(), ..Default::default() } }
    pub fn kind(mut self, kind: TypeFilter) -> Self { self.kind = kind; self }
    pub fn category(mut self, category: impl Into<String>) -> Self { self.category = Some(category.into()); self }
    pub fn sort(mut self, sort: SortMode) -> Self { self.sort = sort; self }

    fn category_filter(&self) -> Option<String> {
        self.category.as_deref().map(str::trim).filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all")).map(str::to_lowercase)
    }
}

/// Flattened view of a matching item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Author, guest or host.
    pub author: Option<String>,
    pub publish_date: Option<String>,
    /// Read time for articles, duration otherwise.
    pub duration: Option<String>,
    /// Views, or plays for podcasts.
    pub popularity: Option<String>,
    pub image: Option<String>,
    pub relevance_score: u32,
}

/// Fields a single item contributes to scoring.
struct Fields<'a> {
    title: &'a str,
    category: Option<&'a str>,
    description: Option<&'a str>,
    author: Option<&'a str>,
    tags: &'a [String],
}

/// Score one item against an already lower-cased, trimmed needle.
fn score_fields(f: &Fields<'_>, needle: &str) -> u32 {
    if needle.is_empty() { return 0; }
    let has = |s: Option<&str>| s.map(|s| s.to_lowercase().contains(needle)).unwrap_or(false);
    let mut score = 0;
    let title = f.title.to_lowercase();
    if title.contains(needle) {
        score += 10;
        if title.starts_with(needle) { score += 5; }
    }
    if has(f.category) { score += 5; }
    if has(f.description) { score += 3; }
    if has(f.author) { score += 4; }
    if f.tags.iter().any(|t| t.to_lowercase().contains(needle)) { score += 2; }
    score
}

fn fields<'a>(item: &ContentRef<'a>) -> Fields<'a> {
    match *item {
        ContentRef::Article(a) => Fields {
            title: &a.title,
            category: a.category.as_deref(),
            description: a.excerpt.as_deref().or(a.subtitle.as_deref()),
            author: a.author.as_deref(),
            tags: &a.tags,
        },
        ContentRef::Video(v) => Fields { title: &v.title, category: v.category.as_deref(), description: v.description.as_deref(), author: None, tags: &v.tags },
        ContentRef::TvShow(s) => Fields { title: &s.title, category: s.category.as_deref(), description: s.description.as_deref(), author: s.host.as_deref(), tags: &s.tags },
        ContentRef::Podcast(p) => Fields { title: &p.title, category: p.category.as_deref(), description: p.description.as_deref(), author: p.guest_name.as_deref(), tags: &p.tags },
    }
}

/// Relevance of `item` for `query`; 0 means no match.
pub fn score(item: &ContentRef<'_>, query: &str) -> u32 {
    score_fields(&fields(item), &query.trim().to_lowercase())
}

fn to_result(item: &ContentRef<'_>, relevance_score: u32) -> SearchResult {
    let f = fields(item);
    let (publish_date, duration, popularity, image) = match *item {
        ContentRef::Article(a) => (a.publish_date.clone(), a.read_time.clone(), a.views.clone(), a.featured_image.clone()),
        ContentRef::Video(v) => (v.upload_date.clone(), v.duration.clone(), v.views.clone(), v.thumbnail.clone()),
        ContentRef::TvShow(s) => (s.air_date.clone(), s.duration.clone(), s.views.clone(), s.thumbnail.clone()),
        ContentRef::Podcast(p) => (p.publish_date.clone(), p.duration.clone(), p.plays.clone(), p.image.clone()),
    };
    SearchResult {
        id: item.id().to_string(),
        kind: item.kind(),
        title: f.title.to_string(),
        description: f.description.map(str::to_string),
        category: f.category.map(str::to_string),
        author: f.author.map(str::to_string),
        publish_date,
        duration,
        popularity,
        image,
        relevance_score,
    }
}

/// Parse a views/plays figure: `"12K"` is 12000, `"500"` is 500, anything else 0.
pub fn parse_popularity(raw: &str) -> u64 {
    let s = raw.trim();
    if let Some(num) = s.strip_suffix(['K', 'k']) {
        return num.trim().parse::<f64>().ok().filter(|n| n.is_finite() && *n >= 0.0).map(|n| (n * 1000.0).round() as u64).unwrap_or(0);
    }
    s.parse::<u64>().unwrap_or(0)
}

fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort in place. All modes are stable, so ties keep their input order.
pub fn sort_results(results: &mut [SearchResult], mode: SortMode) {
    match mode {
        SortMode::Relevance => results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score)),
        SortMode::Date => sort_by_date(results),
        SortMode::Popularity => results.sort_by_key(|r| std::cmp::Reverse(r.popularity.as_deref().map(parse_popularity).unwrap_or(0))),
    }
}

// Parse each date once, then a stable sort over the parsed keys.
fn sort_by_date(results: &mut [SearchResult]) {
    let mut keyed: Vec<(Option<DateTime<Utc>>, SearchResult)> =
        results.iter().map(|r| (r.publish_date.as_deref().and_then(parse_date), r.clone())).collect();
    keyed.sort_by(|a, b| newest_first(a.0, b.0));
    for (slot, (_, r)) in results.iter_mut().zip(keyed) { *slot = r; }
}

/// Score, filter and sort every item in the snapshot.
pub fn search(snapshot: &Snapshot, query: &SearchQuery) -> Vec<SearchResult> {
    let needle = query.text.trim().to_lowercase();
    if needle.is_empty() { return Vec::new(); }
    let category = query.category_filter();
    let mut results: Vec<SearchResult> = snapshot
        .iter()
        .filter(|item| query.kind.admits(item.kind()))
        .filter(|item| match &category {
            Some(c) => item.category().map(|ic| ic.trim().to_lowercase() == *c).unwrap_or(false),
            None => true,
        })
        .filter_map(|item| {
            let s = score_fields(&fields(&item), &needle);
            (s > 0).then(|| to_result(&item, s))
        })
        .collect();
    sort_results(&mut results, query.sort);
    tracing::debug!(query = %query.text, sort = %query.sort, hits = results.len(), "search");
    results
}

/// [`search`] followed by client-side pagination.
pub fn search_page(snapshot: &Snapshot, query: &SearchQuery, page: usize, per_page: usize) -> Page<SearchResult> {
    paginate(search(snapshot, query), page, per_page)
}

/// Hits per content type, for result tabs.
pub fn counts_by_kind(results: &[SearchResult]) -> BTreeMap<ContentKind, usize> {
    let mut out = BTreeMap::new();
    for r in results { *out.entry(r.kind).or_insert(0) += 1; }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Article, Podcast, TvShow, Video};

    fn snapshot() -> Snapshot {
        let articles = vec![
            Article { id: "a1".into(), title: "AI in Education".into(), category: Some("Tech Trends".into()), excerpt: Some("How classrooms change".into()), publish_date: Some("2024-01-10".into()), views: Some("1.2K".into()), ..Default::default() },
            Article { id: "a2".into(), title: "Gardening Weekly".into(), category: Some("Lifestyle".into()), author: Some("Aimee Stone".into()), tags: vec!["outdoors".into()], publish_date: Some("2024-03-01".into()), views: Some("300".into()), ..Default::default() },
            Article { id: "a3".into(), title: "The Future".into(), category: Some("Tech Trends".into()), tags: vec!["ai".into()], publish_date: Some("2024-01-10".into()), ..Default::default() },
        ];
        let videos = vec![Video { id: "v1".into(), title: "Robotics".into(), category: Some("Science".into()), description: Some("Factory floors and AI integration".into()), upload_date: Some("2024-02-01".into()), views: Some("12K".into()), ..Default::default() }];
        let shows = vec![TvShow { id: "s1".into(), title: "Morning Desk".into(), host: Some("Kim".into()), ..Default::default() }];
        let podcasts = vec![Podcast { id: "p1".into(), title: "Talking Machines".into(), guest_name: Some("Dr. Ai Lin".into()), category: Some("Tech Trends".into()), plays: Some("900".into()), ..Default::default() }];
        Snapshot::new(articles, videos, shows, podcasts)
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> { results.iter().map(|r| r.id.as_str()).collect() }

    #[test]
    fn empty_query_matches_nothing() {
        let snap = snapshot();
        assert!(search(&snap, &SearchQuery::new("")).is_empty());
        assert!(search(&snap, &SearchQuery::new("   ")).is_empty());
        for item in snap.iter() { assert_eq!(score(&item, ""), 0); }
    }

    #[test]
    fn title_matches_score_at_least_ten_and_prefix_fifteen() {
        let snap = snapshot();
        let a1 = snap.find(ContentKind::Article, "a1").unwrap();
        assert!(score(&a1, "ai in education") >= 15);
        assert!(score(&a1, "education") >= 10);
        assert!(score(&a1, "EDUCATION") >= 10);
    }

    #[test]
    fn ai_example_ranks_article_above_video() {
        let snap = snapshot();
        let results = search(&snap, &SearchQuery::new("AI"));
        let a1 = results.iter().find(|r| r.id == "a1").unwrap();
        let v1 = results.iter().find(|r| r.id == "v1").unwrap();
        assert!(a1.relevance_score >= 10);
        assert_eq!(v1.relevance_score, 3);
        assert_eq!(results[0].id, "a1");
        assert_eq!(a1.kind, ContentKind::Article);
    }

    #[test]
    fn author_guest_and_tag_fields_count() {
        let snap = snapshot();
        let results = search(&snap, &SearchQuery::new("ai"));
        let score_of = |id: &str| results.iter().find(|r| r.id == id).map(|r| r.relevance_score);
        // "Aimee" in author
        assert_eq!(score_of("a2"), Some(4));
        // tag "ai"
        assert_eq!(score_of("a3"), Some(2));
        // guest "Dr. Ai Lin"
        assert_eq!(score_of("p1"), Some(4));
        assert_eq!(score_of("s1"), None);
    }

    #[test]
    fn type_filter_keeps_only_that_kind_and_commutes_with_category() {
        let snap = snapshot();
        let base = SearchQuery::new("ai");
        let only_articles = search(&snap, &base.clone().kind(TypeFilter::Articles));
        assert!(only_articles.iter().all(|r| r.kind == ContentKind::Article));

        let both = search(&snap, &base.clone().kind(TypeFilter::Articles).category("tech trends"));
        let mut by_type_then_cat: Vec<_> = only_articles.iter().filter(|r| r.category.as_deref().map(|c| c.eq_ignore_ascii_case("tech trends")).unwrap_or(false)).map(|r| r.id.clone()).collect();
        let cat_only = search(&snap, &base.clone().category("Tech Trends"));
        let mut by_cat_then_type: Vec<_> = cat_only.iter().filter(|r| r.kind == ContentKind::Article).map(|r| r.id.clone()).collect();
        by_type_then_cat.sort();
        by_cat_then_type.sort();
        let mut combined: Vec<_> = both.iter().map(|r| r.id.clone()).collect();
        combined.sort();
        assert_eq!(by_type_then_cat, by_cat_then_type);
        assert_eq!(combined, by_type_then_cat);
        assert_eq!(combined, vec!["a1", "a3"]);
    }

    #[test]
    fn category_all_is_no_filter() {
        let snap = snapshot();
        let all = search(&snap, &SearchQuery::new("ai").category("All"));
        assert_eq!(all.len(), search(&snap, &SearchQuery::new("ai")).len());
    }

    #[test]
    fn date_sort_is_descending_and_stable() {
        let snap = snapshot();
        let results = search(&snap, &SearchQuery::new("ai").sort(SortMode::Date));
        // a2 (Mar) > v1 (Feb) > a1 = a3 (Jan, input order kept) > p1 (no date)
        assert_eq!(ids(&results), vec!["a2", "v1", "a1", "a3", "p1"]);
    }

    #[test]
    fn popularity_sort_uses_parsed_counts() {
        let snap = snapshot();
        let results = search(&snap, &SearchQuery::new("ai").sort(SortMode::Popularity));
        assert_eq!(ids(&results), vec!["v1", "a1", "p1", "a2", "a3"]);
    }

    #[test]
    fn popularity_parsing() {
        assert_eq!(parse_popularity("12K"), 12_000);
        assert_eq!(parse_popularity("1.5K"), 1_500);
        assert_eq!(parse_popularity("500"), 500);
        assert_eq!(parse_popularity(""), 0);
        assert_eq!(parse_popularity("lots"), 0);
        assert_eq!(parse_popularity("xK"), 0);
        assert_eq!(parse_popularity("2M"), 0);
    }

    #[test]
    fn paging_and_counts() {
        let snap = snapshot();
        let page = search_page(&snap, &SearchQuery::new("ai"), 2, 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);
        let counts = counts_by_kind(&search(&snap, &SearchQuery::new("ai")));
        assert_eq!(counts.get(&ContentKind::Article), Some(&3));
        assert_eq!(counts.get(&ContentKind::TvShow), None);
    }

    #[test]
    fn filters_parse_from_cli_strings() {
        assert_eq!("tv-shows".parse::<TypeFilter>().unwrap(), TypeFilter::TvShows);
        assert_eq!("Popularity".parse::<SortMode>().unwrap(), SortMode::Popularity);
        assert!("music".parse::<TypeFilter>().is_err());
    }
}
