//! Content records as the platform's API returns them.
//!
//! The backend speaks snake_case JSON and is loose about scalar types: ids may be
//! numbers or strings, flags may be booleans or `0`/`1`, tags may be a
//! comma-separated string or an array, numbers may arrive as strings and any
//! field may be `null`. The helpers in [`wire`] normalise those shapes so the
//! rest of the crate only sees one representation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Article,
    Video,
    #[serde(rename = "tvshow")]
    TvShow,
    Podcast,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Video => "video",
            ContentKind::TvShow => "tvshow",
            ContentKind::Podcast => "podcast",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

/// Publication status. Values outside the known four keep the backend's text
/// so they survive an edit unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Scheduled,
    Archived,
    Other(String),
}

impl ContentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Scheduled => "scheduled",
            ContentStatus::Archived => "archived",
            ContentStatus::Other(s) => s,
        }
    }

    /// Blank input is a draft.
    pub fn parse(raw: &str) -> Self {
        let t = raw.trim();
        match t.to_ascii_lowercase().as_str() {
            "" | "draft" => ContentStatus::Draft,
            "published" => ContentStatus::Published,
            "scheduled" => ContentStatus::Scheduled,
            "archived" => ContentStatus::Archived,
            _ => ContentStatus::Other(t.to_string()),
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

impl Serialize for ContentStatus {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> { s.serialize_str(self.as_str()) }
}

impl<'de> Deserialize<'de> for ContentStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(wire::opt_text(d)?.map(|s| ContentStatus::parse(&s)).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticleImage {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(deserialize_with = "wire::text")]
    pub title: String,
    pub subtitle: Option<String>,
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "wire::text")]
    pub content: String,
    #[serde(alias = "category_name")]
    pub category: Option<String>,
    pub author: Option<String>,
    pub author_bio: Option<String>,
    #[serde(alias = "published_at")]
    pub publish_date: Option<String>,
    #[serde(deserialize_with = "wire::opt_text")]
    pub read_time: Option<String>,
    #[serde(deserialize_with = "wire::tags")]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub featured_image_alt: Option<String>,
    #[serde(deserialize_with = "wire::images")]
    pub additional_images: Vec<ArticleImage>,
    pub meta_description: Option<String>,
    pub status: ContentStatus,
    #[serde(deserialize_with = "wire::flag")]
    pub featured: bool,
    #[serde(deserialize_with = "wire::flag")]
    pub trending: bool,
    #[serde(deserialize_with = "wire::flag")]
    pub editors_pick: bool,
    #[serde(deserialize_with = "wire::flag")]
    pub allow_comments: bool,
    #[serde(deserialize_with = "wire::opt_text")]
    pub views: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(deserialize_with = "wire::text")]
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "wire::opt_text")]
    pub duration: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "thumbnail_url")]
    pub thumbnail: Option<String>,
    #[serde(alias = "platform_url", alias = "url")]
    pub video_url: Option<String>,
    #[serde(deserialize_with = "wire::tags")]
    pub tags: Vec<String>,
    #[serde(alias = "isNew", deserialize_with = "wire::flag")]
    pub is_new: bool,
    #[serde(deserialize_with = "wire::flag")]
    pub featured: bool,
    #[serde(deserialize_with = "wire::flag")]
    pub trending: bool,
    #[serde(deserialize_with = "wire::opt_f32")]
    pub rating: Option<f32>,
    #[serde(alias = "created_at")]
    pub upload_date: Option<String>,
    pub status: ContentStatus,
    #[serde(deserialize_with = "wire::opt_text")]
    pub views: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TvShow {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(deserialize_with = "wire::text")]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub host: Option<String>,
    #[serde(alias = "thumbnail_url")]
    pub thumbnail: Option<String>,
    #[serde(deserialize_with = "wire::opt_u32")]
    pub episodes: Option<u32>,
    #[serde(deserialize_with = "wire::opt_text")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "wire::tags")]
    pub tags: Vec<String>,
    #[serde(alias = "release_date")]
    pub air_date: Option<String>,
    pub status: ContentStatus,
    #[serde(deserialize_with = "wire::flag")]
    pub featured: bool,
    #[serde(deserialize_with = "wire::flag")]
    pub trending: bool,
    #[serde(deserialize_with = "wire::opt_text")]
    pub views: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Podcast {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(deserialize_with = "wire::text")]
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "wire::opt_text")]
    pub duration: Option<String>,
    #[serde(alias = "guest")]
    pub guest_name: Option<String>,
    #[serde(deserialize_with = "wire::opt_id")]
    pub series_id: Option<String>,
    pub category: Option<String>,
    #[serde(deserialize_with = "wire::opt_u32")]
    pub episode_number: Option<u32>,
    #[serde(alias = "image_url", alias = "thumbnail")]
    pub image: Option<String>,
    pub youtube_url: Option<String>,
    pub spotify_url: Option<String>,
    pub apple_url: Option<String>,
    pub google_url: Option<String>,
    pub transcript: Option<String>,
    #[serde(deserialize_with = "wire::tags")]
    pub tags: Vec<String>,
    pub status: ContentStatus,
    #[serde(deserialize_with = "wire::flag")]
    pub featured: bool,
    #[serde(deserialize_with = "wire::flag")]
    pub trending: bool,
    #[serde(alias = "published_at")]
    pub publish_date: Option<String>,
    #[serde(alias = "listens", deserialize_with = "wire::opt_text")]
    pub plays: Option<String>,
}

/// Owned record of any kind, as returned by single-item lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "item", rename_all = "lowercase")]
pub enum Content {
    Article(Article),
    Video(Video),
    #[serde(rename = "tvshow")]
    TvShow(TvShow),
    Podcast(Podcast),
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Article(_) => ContentKind::Article,
            Content::Video(_) => ContentKind::Video,
            Content::TvShow(_) => ContentKind::TvShow,
            Content::Podcast(_) => ContentKind::Podcast,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Content::Article(a) => &a.id,
            Content::Video(v) => &v.id,
            Content::TvShow(s) => &s.id,
            Content::Podcast(p) => &p.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Content::Article(a) => &a.title,
            Content::Video(v) => &v.title,
            Content::TvShow(s) => &s.title,
            Content::Podcast(p) => &p.title,
        }
    }

    pub fn status(&self) -> &ContentStatus {
        match self {
            Content::Article(a) => &a.status,
            Content::Video(v) => &v.status,
            Content::TvShow(s) => &s.status,
            Content::Podcast(p) => &p.status,
        }
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(alias = "total_pages", alias = "totalPages")]
    pub pages: u32,
}

/// A page of records plus the backend's pagination block, if it sent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

/// Parse the assortment of date formats the backend emits.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() { return None; }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) { return Some(dt.with_timezone(&Utc)); }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(n) = NaiveDateTime::parse_from_str(s, fmt) { return Some(n.and_utc()); }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc())
}

/// Deserialisers for the backend's loosely typed scalars.
pub(crate) mod wire {
    use super::ArticleImage;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar_text(v: Value) -> Option<String> {
        match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?).filter(|s| !s.is_empty()))
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        opt_id(d)
    }

    /// Strings and numbers as text; `null` and other shapes as empty.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        id(d)
    }

    fn number(v: Value) -> Option<f64> {
        let n = match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|f| f.is_finite())
    }

    /// A number or numeric string; anything else is `None`.
    pub fn opt_f32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f32>, D::Error> {
        Ok(number(Value::deserialize(d)?).map(|f| f as f32))
    }

    /// A non-negative whole number, possibly as a string; anything else is `None`.
    pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(number(Value::deserialize(d)?)
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
            .map(|f| f as u32))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
            _ => false,
        })
    }

    /// Split a comma-separated tag string; arrays pass through. Blank entries are dropped.
    pub fn split_tags(raw: &str) -> Vec<String> {
        raw.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect()
    }

    pub fn tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => {
                // Some endpoints double-encode the array as a JSON string.
                match serde_json::from_str::<Vec<String>>(&s) {
                    Ok(list) => list.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
                    Err(_) => split_tags(&s),
                }
            }
            Value::Array(items) => items.into_iter().filter_map(scalar_text).map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
            _ => Vec::new(),
        })
    }

    pub fn images<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<ArticleImage>, D::Error> {
        let v = match Value::deserialize(d)? {
            Value::String(s) => serde_json::from_str::<Value>(&s).unwrap_or(Value::Null),
            other => other,
        };
        Ok(match v {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<ArticleImage>(item).ok())
                .filter(|img| !img.url.trim().is_empty())
                .collect(),
            _ => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn article_accepts_loose_backend_shapes() {
        let a: Article = serde_json::from_value(json!({
            "id": 42,
            "title": "AI in Education",
            "content": "body",
            "category_name": "Tech Trends",
            "tags": "ai, education, ,schools",
            "featured": 1,
            "editors_pick": "true",
            "trending": false,
            "additional_images": "[{\"url\":\"https://img/1.jpg\",\"caption\":\"one\"},{\"url\":\"\"}]",
            "status": "published",
            "views": 1200
        }))
        .unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(a.category.as_deref(), Some("Tech Trends"));
        assert_eq!(a.tags, vec!["ai", "education", "schools"]);
        assert!(a.featured && a.editors_pick && !a.trending);
        assert_eq!(a.additional_images.len(), 1);
        assert_eq!(a.status, ContentStatus::Published);
        assert_eq!(a.views.as_deref(), Some("1200"));
    }

    #[test]
    fn unknown_status_keeps_its_text() {
        let v: Video = serde_json::from_value(json!({"id": "v1", "title": "Robotics", "status": "pending_review", "isNew": true})).unwrap();
        assert_eq!(v.status, ContentStatus::Other("pending_review".into()));
        assert!(v.is_new);
        assert_eq!(serde_json::to_value(&v.status).unwrap(), json!("pending_review"));
        let p: Podcast = serde_json::from_value(json!({"status": "Published"})).unwrap();
        assert_eq!(p.status, ContentStatus::Published);
    }

    #[test]
    fn numeric_strings_and_nulls_decode() {
        let v: Video = serde_json::from_value(json!({"id": 3, "title": null, "rating": "4.50", "duration": 754, "status": null})).unwrap();
        assert_eq!(v.rating, Some(4.5));
        assert_eq!(v.title, "");
        assert_eq!(v.duration.as_deref(), Some("754"));
        assert_eq!(v.status, ContentStatus::Draft);

        let p: Podcast = serde_json::from_value(json!({"id": "p1", "episode_number": "3"})).unwrap();
        assert_eq!(p.episode_number, Some(3));
        let s: TvShow = serde_json::from_value(json!({"id": "s1", "episodes": "twelve"})).unwrap();
        assert_eq!(s.episodes, None);
        let a: Article = serde_json::from_value(json!({"id": "a1", "content": null, "read_time": 5})).unwrap();
        assert_eq!(a.content, "");
        assert_eq!(a.read_time.as_deref(), Some("5"));
    }

    #[test]
    fn one_odd_record_does_not_sink_the_collection() {
        let videos: Vec<Video> = serde_json::from_value(json!([
            {"id": 1, "title": "A", "rating": 4},
            {"id": 2, "title": "B", "rating": "4.50"},
            {"id": 3, "title": "C", "rating": "n/a"}
        ]))
        .unwrap();
        assert_eq!(videos.len(), 3);
        assert_eq!(videos[2].rating, None);
    }

    #[test]
    fn podcast_tags_array_and_numeric_series() {
        let p: Podcast = serde_json::from_value(json!({"id": "p1", "title": "Ep 1", "series_id": 7, "tags": ["tech", " ai "], "guest": "Ada"})).unwrap();
        assert_eq!(p.series_id.as_deref(), Some("7"));
        assert_eq!(p.tags, vec!["tech", "ai"]);
        assert_eq!(p.guest_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn parse_date_handles_backend_formats() {
        assert_eq!(parse_date("2024-03-05").unwrap().day(), 5);
        assert!(parse_date("2024-03-05T10:00:00Z").is_some());
        assert!(parse_date("2024-03-05 10:00:00").is_some());
        assert!(parse_date("last tuesday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn content_kind_wire_names() {
        assert_eq!(serde_json::to_string(&ContentKind::TvShow).unwrap(), "\"tvshow\"");
        assert_eq!(ContentKind::Podcast.to_string(), "podcast");
    }
}
