use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{normalize_tags, opt, Checks, ContentForm, Editorial, FieldErrors, FormField};
use crate::error::ApiResult;
use crate::types::{Article, ArticleImage, ContentStatus};

pub const TITLE_MAX: usize = 200;
pub const SUBTITLE_MAX: usize = 300;
pub const EXCERPT_MAX: usize = 500;
pub const META_DESCRIPTION_MAX: usize = 160;
pub const AUTHOR_BIO_MAX: usize = 1000;
pub const IMAGE_ALT_MAX: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleField {
    Title,
    Subtitle,
    Excerpt,
    Content,
    Category,
    Author,
    AuthorBio,
    PublishDate,
    ReadTime,
    Tags,
    FeaturedImage,
    FeaturedImageAlt,
    AdditionalImages,
    MetaDescription,
    Status,
}

impl FormField for ArticleField {
    fn key(&self) -> &'static str {
        match self {
            ArticleField::Title => "title",
            ArticleField::Subtitle => "subtitle",
            ArticleField::Excerpt => "excerpt",
            ArticleField::Content => "content",
            ArticleField::Category => "category",
            ArticleField::Author => "author",
            ArticleField::AuthorBio => "authorBio",
            ArticleField::PublishDate => "publishDate",
            ArticleField::ReadTime => "readTime",
            ArticleField::Tags => "tags",
            ArticleField::FeaturedImage => "featuredImage",
            ArticleField::FeaturedImageAlt => "featuredImageAlt",
            ArticleField::AdditionalImages => "additionalImages",
            ArticleField::MetaDescription => "metaDescription",
            ArticleField::Status => "status",
        }
    }

    fn from_backend(path: &str) -> Option<Self> {
        // "additional_images[2].url" -> "additional_images"
        let root = path.split(['[', '.']).next().unwrap_or(path);
        Some(match root {
            "title" => ArticleField::Title,
            "subtitle" => ArticleField::Subtitle,
            "excerpt" => ArticleField::Excerpt,
            "content" | "body" => ArticleField::Content,
            "category" | "category_id" | "category_name" => ArticleField::Category,
            "author" | "author_name" => ArticleField::Author,
            "author_bio" => ArticleField::AuthorBio,
            "publish_date" | "published_at" => ArticleField::PublishDate,
            "read_time" => ArticleField::ReadTime,
            "tags" => ArticleField::Tags,
            "featured_image" | "featured_image_url" => ArticleField::FeaturedImage,
            "featured_image_alt" => ArticleField::FeaturedImageAlt,
            "additional_images" | "images" => ArticleField::AdditionalImages,
            "meta_description" => ArticleField::MetaDescription,
            "status" => ArticleField::Status,
            _ => return None,
        })
    }
}

/// Article editor contents. Text inputs are plain strings; blank means unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleForm {
    pub title: String,
    pub subtitle: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub author_bio: String,
    pub publish_date: String,
    pub read_time: String,
    /// Comma-separated.
    pub tags: String,
    pub featured_image: String,
    pub featured_image_alt: String,
    pub additional_images: Vec<ArticleImage>,
    pub meta_description: String,
    pub status: ContentStatus,
    pub featured: bool,
    pub trending: bool,
    pub editors_pick: bool,
    pub allow_comments: bool,
}

impl Default for ArticleForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            excerpt: String::new(),
            content: String::new(),
            category: String::new(),
            author: String::new(),
            author_bio: String::new(),
            publish_date: String::new(),
            read_time: String::new(),
            tags: String::new(),
            featured_image: String::new(),
            featured_image_alt: String::new(),
            additional_images: Vec::new(),
            meta_description: String::new(),
            status: ContentStatus::Draft,
            featured: false,
            trending: false,
            editors_pick: false,
            allow_comments: true,
        }
    }
}

/// Body of `POST /articles` and `PUT /articles/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticlePayload {
    pub title: String,
    pub subtitle: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub author: String,
    pub author_bio: Option<String>,
    pub publish_date: Option<String>,
    pub read_time: Option<String>,
    pub tags: String,
    pub featured_image: Option<String>,
    pub featured_image_alt: Option<String>,
    pub additional_images: Vec<ArticleImage>,
    pub meta_description: Option<String>,
    pub status: ContentStatus,
    pub featured: bool,
    pub trending: bool,
    pub editors_pick: bool,
    pub allow_comments: bool,
}

impl ArticleForm {
    /// Prefill the editor from an existing article.
    pub fn from_article(a: &Article) -> Self {
        let s = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            title: a.title.clone(),
            subtitle: s(&a.subtitle),
            excerpt: s(&a.excerpt),
            content: a.content.clone(),
            category: s(&a.category),
            author: s(&a.author),
            author_bio: s(&a.author_bio),
            // The date input only takes the day part.
            publish_date: a.publish_date.as_deref().map(|d| d.chars().take(10).collect()).unwrap_or_default(),
            read_time: s(&a.read_time),
            tags: a.tags.join(", "),
            featured_image: s(&a.featured_image),
            featured_image_alt: s(&a.featured_image_alt),
            additional_images: a.additional_images.clone(),
            meta_description: s(&a.meta_description),
            status: a.status.clone(),
            featured: a.featured,
            trending: a.trending,
            editors_pick: a.editors_pick,
            allow_comments: a.allow_comments,
        }
    }

    pub fn to_payload(&self) -> ArticlePayload {
        ArticlePayload {
            title: self.title.trim().to_string(),
            subtitle: opt(&self.subtitle),
            excerpt: opt(&self.excerpt),
            content: self.content.trim().to_string(),
            category: self.category.trim().to_string(),
            author: self.author.trim().to_string(),
            author_bio: opt(&self.author_bio),
            publish_date: opt(&self.publish_date),
            read_time: opt(&self.read_time),
            tags: normalize_tags(&self.tags),
            featured_image: opt(&self.featured_image),
            featured_image_alt: opt(&self.featured_image_alt),
            additional_images: self
                .additional_images
                .iter()
                .filter(|img| !img.url.trim().is_empty())
                .map(|img| ArticleImage {
                    url: img.url.trim().to_string(),
                    alt: img.alt.as_deref().and_then(opt),
                    caption: img.caption.as_deref().and_then(opt),
                })
                .collect(),
            meta_description: opt(&self.meta_description),
            status: self.status.clone(),
            featured: self.featured,
            trending: self.trending,
            editors_pick: self.editors_pick,
            allow_comments: self.allow_comments,
        }
    }
}

#[async_trait]
impl ContentForm for ArticleForm {
    type Field = ArticleField;
    type Saved = Article;
    const ENTITY: &'static str = "article";

    fn validate(&self) -> FieldErrors {
        use ArticleField as F;
        let mut c = Checks::<F>::new();
        c.required(F::Title, &self.title, "Title")
            .max_len(F::Title, &self.title, TITLE_MAX, "Title")
            .max_len(F::Subtitle, &self.subtitle, SUBTITLE_MAX, "Subtitle")
            .max_len(F::Excerpt, &self.excerpt, EXCERPT_MAX, "Excerpt")
            .required(F::Content, &self.content, "Content")
            .required(F::Category, &self.category, "Category")
            .required(F::Author, &self.author, "Author")
            .max_len(F::AuthorBio, &self.author_bio, AUTHOR_BIO_MAX, "Author bio")
            .date(F::PublishDate, &self.publish_date, "Publish date")
            .url(F::FeaturedImage, &self.featured_image, "Featured image")
            .max_len(F::FeaturedImageAlt, &self.featured_image_alt, IMAGE_ALT_MAX, "Image alt text")
            .max_len(F::MetaDescription, &self.meta_description, META_DESCRIPTION_MAX, "Meta description");
        if !self.featured_image.trim().is_empty() && self.featured_image_alt.trim().is_empty() {
            c.fail(F::FeaturedImageAlt, "Image alt text is required when a featured image is set");
        }
        for (i, img) in self.additional_images.iter().enumerate() {
            if img.url.trim().is_empty() {
                if img.alt.as_deref().map(str::trim).is_some_and(|s| !s.is_empty()) || img.caption.as_deref().map(str::trim).is_some_and(|s| !s.is_empty()) {
                    c.fail(F::AdditionalImages, format!("Image {} needs a URL", i + 1));
                }
            } else if !super::is_web_url(img.url.trim()) {
                c.fail(F::AdditionalImages, format!("Image {} must be a valid http(s) URL", i + 1));
            }
        }
        c.finish()
    }

    async fn save(&self, backend: &dyn Editorial, id: Option<&str>) -> ApiResult<Article> {
        let payload = self.to_payload();
        match id {
            Some(id) => backend.update_article(id, &payload).await,
            None => backend.create_article(&payload).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, FieldError};
    use crate::forms::testing::FakeEditorial;
    use crate::forms::{FormSession, Submission};
    use std::sync::{Arc, Mutex};

    fn valid() -> ArticleForm {
        ArticleForm {
            title: "AI in Education".into(),
            content: "Body".into(),
            category: "Tech Trends".into(),
            author: "Jo Park".into(),
            tags: "ai, education, ai".into(),
            featured_image: "https://cdn.example.com/ai.jpg".into(),
            featured_image_alt: "Classroom".into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_form_reports_required_fields() {
        let errors = ArticleForm::default().validate();
        for key in ["title", "content", "category", "author"] {
            assert!(errors.contains_key(key), "missing {key}");
        }
        assert_eq!(errors["title"], "Title is required");
    }

    #[test]
    fn length_and_format_checks() {
        let mut f = valid();
        f.meta_description = "x".repeat(META_DESCRIPTION_MAX + 1);
        f.publish_date = "someday".into();
        f.featured_image = "not-a-url".into();
        f.additional_images = vec![ArticleImage { url: "".into(), alt: None, caption: Some("orphan".into()) }];
        let errors = f.validate();
        assert!(errors["metaDescription"].contains("160"));
        assert!(errors.contains_key("publishDate"));
        assert!(errors.contains_key("featuredImage"));
        assert_eq!(errors["additionalImages"], "Image 1 needs a URL");
        assert!(valid().validate().is_empty());
    }

    #[test]
    fn payload_is_trimmed_and_snake_case() {
        let mut f = valid();
        f.subtitle = "   ".into();
        f.additional_images = vec![
            ArticleImage { url: " https://cdn.example.com/1.jpg ".into(), alt: Some(" ".into()), caption: Some("One".into()) },
            ArticleImage { url: "".into(), alt: None, caption: None },
        ];
        let p = f.to_payload();
        assert_eq!(p.subtitle, None);
        assert_eq!(p.tags, "ai, education");
        assert_eq!(p.additional_images.len(), 1);
        assert_eq!(p.additional_images[0].alt, None);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["featured_image_alt"], "Classroom");
        assert_eq!(json["editors_pick"], false);
        assert_eq!(json["allow_comments"], true);
        assert_eq!(json["status"], "draft");
    }

    #[test]
    fn backend_paths_map_to_form_fields() {
        assert_eq!(ArticleField::from_backend("author_bio"), Some(ArticleField::AuthorBio));
        assert_eq!(ArticleField::from_backend("additional_images[1].url"), Some(ArticleField::AdditionalImages));
        assert_eq!(ArticleField::from_backend("category_id"), Some(ArticleField::Category));
        assert_eq!(ArticleField::from_backend("slug"), None);
    }

    #[test]
    fn prefill_round_trips_editable_fields() {
        let a = Article { id: "9".into(), title: "T".into(), tags: vec!["a".into(), "b".into()], publish_date: Some("2024-05-01T08:00:00Z".into()), allow_comments: false, ..Default::default() };
        let f = ArticleForm::from_article(&a);
        assert_eq!(f.tags, "a, b");
        assert_eq!(f.publish_date, "2024-05-01");
        assert!(!f.allow_comments);
    }

    #[test]
    fn unknown_backend_status_survives_an_edit() {
        let a: Article = serde_json::from_value(serde_json::json!({"id": 9, "title": "T", "status": "review"})).unwrap();
        let json = serde_json::to_value(ArticleForm::from_article(&a).to_payload()).unwrap();
        assert_eq!(json["status"], "review");
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_backend() {
        let backend = FakeEditorial::default();
        let mut session = FormSession::create(ArticleForm::default());
        let state = session.submit(&backend).await;
        assert!(matches!(state, Submission::Failed(f) if f.fields.contains_key("title")));
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_success_invokes_hook() {
        let backend = FakeEditorial::default();
        let saved = Arc::new(Mutex::new(None));
        let sink = saved.clone();
        let mut session = FormSession::create(valid()).on_save(move |a: &Article| *sink.lock().unwrap() = Some(a.id.clone()));
        assert!(session.submit(&backend).await.is_saved());
        assert_eq!(saved.lock().unwrap().as_deref(), Some("new-1"));
        assert_eq!(backend.calls.lock().unwrap().as_slice(), ["create article AI in Education"]);
    }

    #[tokio::test]
    async fn edit_uses_update() {
        let backend = FakeEditorial::default();
        let mut session = FormSession::edit("42", valid());
        session.submit(&backend).await;
        assert_eq!(backend.calls.lock().unwrap().as_slice(), ["update article 42"]);
    }

    #[tokio::test]
    async fn backend_validation_maps_to_fields() {
        let backend = FakeEditorial::failing(ApiError::Validation {
            message: "Validation failed".into(),
            errors: vec![
                FieldError { path: "author_bio".into(), msg: "Bio too long".into() },
                FieldError { path: "slug".into(), msg: "Slug already taken".into() },
            ],
        });
        let mut session = FormSession::create(valid());
        let failure = session.submit(&backend).await.failure().cloned().unwrap();
        assert_eq!(failure.fields["authorBio"], "Bio too long");
        assert_eq!(failure.general.as_deref(), Some("Slug already taken"));
        session.clear_error(ArticleField::AuthorBio);
        assert!(session.state().failure().unwrap().fields.is_empty());

        // resubmitting is a fresh attempt
        assert!(session.submit(&backend).await.is_saved());
    }
}
