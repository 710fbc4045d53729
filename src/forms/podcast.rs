use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{normalize_tags, opt, Checks, ContentForm, Editorial, FieldErrors, FormField};
use crate::error::ApiResult;
use crate::types::{ContentStatus, Podcast};

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 5000;
pub const GUEST_MAX: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodcastField {
    Title,
    Description,
    Duration,
    GuestName,
    SeriesId,
    EpisodeNumber,
    Image,
    YoutubeUrl,
    SpotifyUrl,
    AppleUrl,
    GoogleUrl,
    Transcript,
    Tags,
    Status,
    PublishDate,
}

impl FormField for PodcastField {
    fn key(&self) -> &'static str {
        match self {
            PodcastField::Title => "title",
            PodcastField::Description => "description",
            PodcastField::Duration => "duration",
            PodcastField::GuestName => "guestName",
            PodcastField::SeriesId => "seriesId",
            PodcastField::EpisodeNumber => "episodeNumber",
            PodcastField::Image => "image",
            PodcastField::YoutubeUrl => "youtubeUrl",
            PodcastField::SpotifyUrl => "spotifyUrl",
            PodcastField::AppleUrl => "appleUrl",
            PodcastField::GoogleUrl => "googleUrl",
            PodcastField::Transcript => "transcript",
            PodcastField::Tags => "tags",
            PodcastField::Status => "status",
            PodcastField::PublishDate => "publishDate",
        }
    }

    fn from_backend(path: &str) -> Option<Self> {
        Some(match path {
            "title" => PodcastField::Title,
            "description" => PodcastField::Description,
            "duration" => PodcastField::Duration,
            "guest_name" | "guest" => PodcastField::GuestName,
            "series_id" | "series" => PodcastField::SeriesId,
            "episode_number" => PodcastField::EpisodeNumber,
            "image" | "image_url" | "thumbnail" => PodcastField::Image,
            "youtube_url" => PodcastField::YoutubeUrl,
            "spotify_url" => PodcastField::SpotifyUrl,
            "apple_url" | "apple_podcasts_url" => PodcastField::AppleUrl,
            "google_url" | "google_podcasts_url" => PodcastField::GoogleUrl,
            "transcript" => PodcastField::Transcript,
            "tags" => PodcastField::Tags,
            "status" => PodcastField::Status,
            "publish_date" | "published_at" => PodcastField::PublishDate,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodcastForm {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub guest_name: String,
    pub series_id: String,
    pub episode_number: Option<u32>,
    pub image: String,
    pub youtube_url: String,
    pub spotify_url: String,
    pub apple_url: String,
    pub google_url: String,
    pub transcript: String,
    pub tags: String,
    pub status: ContentStatus,
    pub featured: bool,
    pub publish_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodcastPayload {
    pub title: String,
    pub description: String,
    pub duration: Option<String>,
    pub guest_name: Option<String>,
    pub series_id: Option<String>,
    pub episode_number: Option<u32>,
    pub image: Option<String>,
    pub youtube_url: Option<String>,
    pub spotify_url: Option<String>,
    pub apple_url: Option<String>,
    pub google_url: Option<String>,
    pub transcript: Option<String>,
    pub tags: String,
    pub status: ContentStatus,
    pub featured: bool,
    pub publish_date: Option<String>,
}

impl PodcastForm {
    pub fn from_podcast(p: &Podcast) -> Self {
        let s = |o: &Option<String>| o.clone().unwrap_or_default();
        Self {
            title: p.title.clone(),
            description: s(&p.description),
            duration: s(&p.duration),
            guest_name: s(&p.guest_name),
            series_id: s(&p.series_id),
            episode_number: p.episode_number,
            image: s(&p.image),
            youtube_url: s(&p.youtube_url),
            spotify_url: s(&p.spotify_url),
            apple_url: s(&p.apple_url),
            google_url: s(&p.google_url),
            transcript: s(&p.transcript),
            tags: p.tags.join(", "),
            status: p.status.clone(),
            featured: p.featured,
            publish_date: p.publish_date.as_deref().map(|d| d.chars().take(10).collect()).unwrap_or_default(),
        }
    }

    pub fn to_payload(&self) -> PodcastPayload {
        PodcastPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            duration: opt(&self.duration),
            guest_name: opt(&self.guest_name),
            series_id: opt(&self.series_id),
            episode_number: self.episode_number,
            image: opt(&self.image),
            youtube_url: opt(&self.youtube_url),
            spotify_url: opt(&self.spotify_url),
            apple_url: opt(&self.apple_url),
            google_url: opt(&self.google_url),
            transcript: opt(&self.transcript),
            tags: normalize_tags(&self.tags),
            status: self.status.clone(),
            featured: self.featured,
            publish_date: opt(&self.publish_date),
        }
    }
}

#[async_trait]
impl ContentForm for PodcastForm {
    type Field = PodcastField;
    type Saved = Podcast;
    const ENTITY: &'static str = "podcast";

    fn validate(&self) -> FieldErrors {
        use PodcastField as F;
        let mut c = Checks::<F>::new();
        c.required(F::Title, &self.title, "Title")
            .max_len(F::Title, &self.title, TITLE_MAX, "Title")
            .required(F::Description, &self.description, "Description")
            .max_len(F::Description, &self.description, DESCRIPTION_MAX, "Description")
            .duration(F::Duration, &self.duration, "Duration")
            .max_len(F::GuestName, &self.guest_name, GUEST_MAX, "Guest name")
            .url(F::Image, &self.image, "Image")
            .url(F::YoutubeUrl, &self.youtube_url, "YouTube URL")
            .url(F::SpotifyUrl, &self.spotify_url, "Spotify URL")
            .url(F::AppleUrl, &self.apple_url, "Apple Podcasts URL")
            .url(F::GoogleUrl, &self.google_url, "Google Podcasts URL")
            .date(F::PublishDate, &self.publish_date, "Publish date");
        if self.episode_number == Some(0) {
            c.fail(F::EpisodeNumber, "Episode number must be 1 or greater");
        }
        if self.episode_number.is_some() && self.series_id.trim().is_empty() {
            c.fail(F::SeriesId, "Series is required when an episode number is set");
        }
        c.finish()
    }

    async fn save(&self, backend: &dyn Editorial, id: Option<&str>) -> ApiResult<Podcast> {
        let payload = self.to_payload();
        match id {
            Some(id) => backend.update_podcast(id, &payload).await,
            None => backend.create_podcast(&payload).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::testing::FakeEditorial;
    use crate::forms::FormSession;

    fn valid() -> PodcastForm {
        PodcastForm {
            title: "Talking Machines".into(),
            description: "A chat about AI".into(),
            duration: "1:02:03".into(),
            guest_name: "Dr. Ai Lin".into(),
            series_id: "7".into(),
            episode_number: Some(3),
            spotify_url: "https://open.spotify.com/episode/x".into(),
            ..Default::default()
        }
    }

    #[test]
    fn platform_urls_and_episode_rules() {
        assert!(valid().validate().is_empty());
        let mut f = valid();
        f.apple_url = "podcasts.apple".into();
        f.episode_number = Some(0);
        f.series_id = " ".into();
        let e = f.validate();
        assert!(e.contains_key("appleUrl"));
        assert!(e.contains_key("episodeNumber"));
        assert!(e.contains_key("seriesId"));
    }

    #[test]
    fn backend_guest_path_maps() {
        assert_eq!(PodcastField::from_backend("guest"), Some(PodcastField::GuestName));
        assert_eq!(PodcastField::from_backend("apple_podcasts_url").map(|f| f.key()), Some("appleUrl"));
    }

    #[tokio::test]
    async fn transport_failure_is_general_error() {
        let backend = FakeEditorial::failing(crate::error::ApiError::Status { status: 401, message: "Unauthorized".into() });
        let mut s = FormSession::create(valid());
        let f = s.submit(&backend).await.failure().cloned().unwrap();
        assert!(f.fields.is_empty());
        assert_eq!(f.general.as_deref(), Some("Failed to save podcast: Unauthorized"));
    }

    #[tokio::test]
    async fn update_path() {
        let backend = FakeEditorial::default();
        let mut s = FormSession::edit("p1", PodcastForm::from_podcast(&Podcast { id: "p1".into(), title: "Old".into(), description: Some("d".into()), ..Default::default() }));
        s.draft.title = "New".into();
        assert!(s.submit(&backend).await.is_saved());
        assert_eq!(backend.calls.lock().unwrap().as_slice(), ["update podcast p1"]);
    }
}
