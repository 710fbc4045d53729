use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{normalize_tags, opt, Checks, ContentForm, Editorial, FieldErrors, FormField};
use crate::error::ApiResult;
use crate::types::{ContentStatus, Video};

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoField {
    Title,
    Description,
    Duration,
    Category,
    Thumbnail,
    VideoUrl,
    Tags,
    Rating,
    UploadDate,
    Status,
}

impl FormField for VideoField {
    fn key(&self) -> &'static str {
        match self {
            VideoField::Title => "title",
            VideoField::Description => "description",
            VideoField::Duration => "duration",
            VideoField::Category => "category",
            VideoField::Thumbnail => "thumbnail",
            VideoField::VideoUrl => "videoUrl",
            VideoField::Tags => "tags",
            VideoField::Rating => "rating",
            VideoField::UploadDate => "uploadDate",
            VideoField::Status => "status",
        }
    }

    fn from_backend(path: &str) -> Option<Self> {
        Some(match path {
            "title" => VideoField::Title,
            "description" => VideoField::Description,
            "duration" => VideoField::Duration,
            "category" | "category_id" => VideoField::Category,
            "thumbnail" | "thumbnail_url" => VideoField::Thumbnail,
            "video_url" | "platform_url" | "url" => VideoField::VideoUrl,
            "tags" => VideoField::Tags,
            "rating" => VideoField::Rating,
            "upload_date" => VideoField::UploadDate,
            "status" => VideoField::Status,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoForm {
    pub title: String,
    pub description: String,
    /// `mm:ss` or `h:mm:ss`.
    pub duration: String,
    pub category: String,
    pub thumbnail: String,
    pub video_url: String,
    pub tags: String,
    pub is_new: bool,
    pub featured: bool,
    pub trending: bool,
    pub rating: Option<f32>,
    pub upload_date: String,
    pub status: ContentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoPayload {
    pub title: String,
    pub description: String,
    pub duration: Option<String>,
    pub category: String,
    pub thumbnail: Option<String>,
    pub video_url: String,
    pub tags: String,
    pub is_new: bool,
    pub featured: bool,
    pub trending: bool,
    pub rating: Option<f32>,
    pub upload_date: Option<String>,
    pub status: ContentStatus,
}

impl VideoForm {
    pub fn from_video(v: &Video) -> Self {
        let s = |o: &Option<String>| o.clone().unwrap_or_default();
        Self {
            title: v.title.clone(),
            description: s(&v.description),
            duration: s(&v.duration),
            category: s(&v.category),
            thumbnail: s(&v.thumbnail),
            video_url: s(&v.video_url),
            tags: v.tags.join(", "),
            is_new: v.is_new,
            featured: v.featured,
            trending: v.trending,
            rating: v.rating,
            upload_date: v.upload_date.as_deref().map(|d| d.chars().take(10).collect()).unwrap_or_default(),
            status: v.status.clone(),
        }
    }

    pub fn to_payload(&self) -> VideoPayload {
        VideoPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            duration: opt(&self.duration),
            category: self.category.trim().to_string(),
            thumbnail: opt(&self.thumbnail),
            video_url: self.video_url.trim().to_string(),
            tags: normalize_tags(&self.tags),
            is_new: self.is_new,
            featured: self.featured,
            trending: self.trending,
            rating: self.rating,
            upload_date: opt(&self.upload_date),
            status: self.status.clone(),
        }
    }
}

#[async_trait]
impl ContentForm for VideoForm {
    type Field = VideoField;
    type Saved = Video;
    const ENTITY: &'static str = "video";

    fn validate(&self) -> FieldErrors {
        use VideoField as F;
        let mut c = Checks::<F>::new();
        c.required(F::Title, &self.title, "Title")
            .max_len(F::Title, &self.title, TITLE_MAX, "Title")
            .required(F::Description, &self.description, "Description")
            .max_len(F::Description, &self.description, DESCRIPTION_MAX, "Description")
            .duration(F::Duration, &self.duration, "Duration")
            .required(F::Category, &self.category, "Category")
            .required(F::VideoUrl, &self.video_url, "Video URL")
            .url(F::VideoUrl, &self.video_url, "Video URL")
            .url(F::Thumbnail, &self.thumbnail, "Thumbnail")
            .date(F::UploadDate, &self.upload_date, "Upload date");
        if let Some(r) = self.rating {
            if !(0.0..=5.0).contains(&r) { c.fail(F::Rating, "Rating must be between 0 and 5"); }
        }
        c.finish()
    }

    async fn save(&self, backend: &dyn Editorial, id: Option<&str>) -> ApiResult<Video> {
        let payload = self.to_payload();
        match id {
            Some(id) => backend.update_video(id, &payload).await,
            None => backend.create_video(&payload).await,
        }
    }
}
