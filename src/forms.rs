//! Editorial forms: client-side validation, payload mapping and the submit
//! state machine shared by articles, videos and podcast episodes.

pub mod article;
pub mod podcast;
pub mod video;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::types::{parse_date, Article, Podcast, Video};

pub use article::{ArticleField, ArticleForm, ArticlePayload};
pub use podcast::{PodcastField, PodcastForm, PodcastPayload};
pub use video::{VideoField, VideoForm, VideoPayload};

/// Error message per form field, keyed by the field's form name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// A field of one of the editorial forms.
pub trait FormField: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Name used for the field on the form (camelCase).
    fn key(&self) -> &'static str;
    /// Field a backend validation `path` refers to, if any.
    fn from_backend(path: &str) -> Option<Self>;
}

/// Write side of the API, as the forms need it.
#[async_trait]
pub trait Editorial: Send + Sync {
    async fn create_article(&self, payload: &ArticlePayload) -> ApiResult<Article>;
    async fn update_article(&self, id: &str, payload: &ArticlePayload) -> ApiResult<Article>;
    async fn create_video(&self, payload: &VideoPayload) -> ApiResult<Video>;
    async fn update_video(&self, id: &str, payload: &VideoPayload) -> ApiResult<Video>;
    async fn create_podcast(&self, payload: &PodcastPayload) -> ApiResult<Podcast>;
    async fn update_podcast(&self, id: &str, payload: &PodcastPayload) -> ApiResult<Podcast>;
}

#[async_trait]
impl Editorial for ApiClient {
    async fn create_article(&self, payload: &ArticlePayload) -> ApiResult<Article> { ApiClient::create_article(self, payload).await }
    async fn update_article(&self, id: &str, payload: &ArticlePayload) -> ApiResult<Article> { ApiClient::update_article(self, id, payload).await }
    async fn create_video(&self, payload: &VideoPayload) -> ApiResult<Video> { ApiClient::create_video(self, payload).await }
    async fn update_video(&self, id: &str, payload: &VideoPayload) -> ApiResult<Video> { ApiClient::update_video(self, id, payload).await }
    async fn create_podcast(&self, payload: &PodcastPayload) -> ApiResult<Podcast> { ApiClient::create_podcast(self, payload).await }
    async fn update_podcast(&self, id: &str, payload: &PodcastPayload) -> ApiResult<Podcast> { ApiClient::update_podcast(self, id, payload).await }
}

/// A draft that can be validated and saved.
#[async_trait]
pub trait ContentForm: Send + Sync {
    type Field: FormField;
    type Saved: Send;

    /// Entity name used in messages ("article", "video", ...).
    const ENTITY: &'static str;

    fn validate(&self) -> FieldErrors;

    /// Create when `id` is `None`, update otherwise.
    async fn save(&self, backend: &dyn Editorial, id: Option<&str>) -> ApiResult<Self::Saved>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFailure {
    pub fields: FieldErrors,
    pub general: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Submission<T> {
    Idle,
    Submitting,
    Saved(T),
    Failed(FormFailure),
}

impl<T> Submission<T> {
    pub fn is_saved(&self) -> bool { matches!(self, Submission::Saved(_)) }
    pub fn failure(&self) -> Option<&FormFailure> {
        match self { Submission::Failed(f) => Some(f), _ => None }
    }
}

type SaveHook<T> = Box<dyn FnMut(&T) + Send>;

/// One open form: the draft, the id being edited (if any) and the submit state.
pub struct FormSession<F: ContentForm> {
    pub draft: F,
    editing: Option<String>,
    state: Submission<F::Saved>,
    on_save: Option<SaveHook<F::Saved>>,
}

impl<F: ContentForm> FormSession<F> {
    pub fn create(draft: F) -> Self {
        Self { draft, editing: None, state: Submission::Idle, on_save: None }
    }

    pub fn edit(id: impl Into<String>, draft: F) -> Self {
        Self { editing: Some(id.into()), ..Self::create(draft) }
    }

    /// Called with the saved entity after a successful submit.
    pub fn on_save(mut self, hook: impl FnMut(&F::Saved) + Send + 'static) -> Self {
        self.on_save = Some(Box::new(hook));
        self
    }

    pub fn editing(&self) -> Option<&str> { self.editing.as_deref() }
    pub fn state(&self) -> &Submission<F::Saved> { &self.state }

    pub fn into_state(self) -> Submission<F::Saved> { self.state }

    /// Drop the error shown for one field, as when the user edits it.
    pub fn clear_error(&mut self, field: F::Field) {
        if let Submission::Failed(f) = &mut self.state {
            f.fields.remove(field.key());
        }
    }

    /// Validate, then create or update through `backend`.
    ///
    /// Invalid drafts fail without a request. Backend validation errors are
    /// mapped back onto form fields; anything else becomes the general error.
    pub async fn submit(&mut self, backend: &dyn Editorial) -> &Submission<F::Saved> {
        let errors = self.draft.validate();
        if !errors.is_empty() {
            tracing::debug!(entity = F::ENTITY, fields = errors.len(), "draft failed validation");
            self.state = Submission::Failed(FormFailure { fields: errors, general: None });
            return &self.state;
        }
        self.state = Submission::Submitting;
        let result = self.draft.save(backend, self.editing.as_deref()).await;
        match result {
            Ok(saved) => {
                if let Some(hook) = self.on_save.as_mut() { hook(&saved); }
                self.state = Submission::Saved(saved);
            }
            Err(e) => {
                tracing::warn!(entity = F::ENTITY, error = %e, "save failed");
                self.state = Submission::Failed(failure_from_api::<F::Field>(F::ENTITY, &e));
            }
        }
        &self.state
    }
}

/// Map an API error onto form fields.
pub fn failure_from_api<Fd: FormField>(entity: &str, err: &ApiError) -> FormFailure {
    let mut out = FormFailure::default();
    if let ApiError::Validation { message, errors } = err {
        let mut unmapped = Vec::new();
        for fe in errors {
            match Fd::from_backend(&fe.path) {
                Some(field) => { out.fields.entry(field.key()).or_insert_with(|| fe.msg.clone()); }
                None => unmapped.push(fe.msg.clone()),
            }
        }
        if !unmapped.is_empty() {
            out.general = Some(unmapped.join("; "));
        } else if out.fields.is_empty() {
            out.general = Some(format!("Failed to save {entity}: {message}"));
        }
    } else {
        out.general = Some(format!("Failed to save {entity}: {}", err.message()));
    }
    out
}

/// Collects field errors; the first error per field wins.
pub(crate) struct Checks<Fd: FormField> {
    errors: FieldErrors,
    _field: std::marker::PhantomData<Fd>,
}

impl<Fd: FormField> Checks<Fd> {
    pub fn new() -> Self { Self { errors: FieldErrors::new(), _field: std::marker::PhantomData } }

    pub fn fail(&mut self, field: Fd, msg: impl Into<String>) -> &mut Self {
        self.errors.entry(field.key()).or_insert_with(|| msg.into());
        self
    }

    pub fn required(&mut self, field: Fd, value: &str, label: &str) -> &mut Self {
        if value.trim().is_empty() { self.fail(field, format!("{label} is required")); }
        self
    }

    pub fn max_len(&mut self, field: Fd, value: &str, max: usize, label: &str) -> &mut Self {
        if value.trim().chars().count() > max { self.fail(field, format!("{label} must be at most {max} characters")); }
        self
    }

    pub fn url(&mut self, field: Fd, value: &str, label: &str) -> &mut Self {
        let v = value.trim();
        if !v.is_empty() && !is_web_url(v) { self.fail(field, format!("{label} must be a valid http(s) URL")); }
        self
    }

    pub fn date(&mut self, field: Fd, value: &str, label: &str) -> &mut Self {
        let v = value.trim();
        if !v.is_empty() && parse_date(v).is_none() { self.fail(field, format!("{label} must be a date (YYYY-MM-DD)")); }
        self
    }

    pub fn duration(&mut self, field: Fd, value: &str, label: &str) -> &mut Self {
        let v = value.trim();
        if !v.is_empty() && !is_duration(v) { self.fail(field, format!("{label} must look like mm:ss, h:mm:ss or 12 min")); }
        self
    }

    pub fn finish(&mut self) -> FieldErrors { std::mem::take(&mut self.errors) }
}

pub(crate) fn is_web_url(s: &str) -> bool {
    url::Url::parse(s).map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some()).unwrap_or(false)
}

/// `mm:ss`, `h:mm:ss`, or amounts with units such as `12 min` or `1h 20m`.
pub(crate) fn is_duration(s: &str) -> bool {
    is_clock_duration(s) || is_unit_duration(s)
}

/// Seconds and minutes below 60 after the leading part.
fn is_clock_duration(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    if !(2..=3).contains(&parts.len()) { return false; }
    if parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) { return false; }
    parts[1..].iter().all(|p| p.len() == 2 && p.parse::<u32>().map(|n| n < 60).unwrap_or(false))
}

fn is_unit_duration(s: &str) -> bool {
    const UNITS: &[&str] = &[
        "h", "hr", "hrs", "hour", "hours",
        "m", "min", "mins", "minute", "minutes",
        "s", "sec", "secs", "second", "seconds",
    ];
    let mut rest = s.trim();
    let mut pairs = 0;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 { return false; }
        rest = rest[digits..].trim_start();
        let letters = rest.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(rest.len());
        if !UNITS.contains(&rest[..letters].to_ascii_lowercase().as_str()) { return false; }
        rest = rest[letters..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        pairs += 1;
    }
    pairs > 0
}

/// Blank input becomes `None`.
pub(crate) fn opt(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Normalise a comma-separated tag input: trimmed, blanks and duplicates dropped.
pub(crate) fn normalize_tags(raw: &str) -> String {
    let mut seen = std::collections::HashSet::new();
    crate::types::wire::split_tags(raw)
        .into_iter()
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a draft from a `.json` or `.toml` file.
pub fn load_draft<F: DeserializeOwned>(path: &Path) -> Result<F> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading draft: {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("toml") => toml::from_str(&raw).with_context(|| format!("parsing TOML draft: {}", path.display())),
        _ => serde_json::from_str(&raw).with_context(|| format!("parsing JSON draft: {}", path.display())),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records payloads and answers with a canned result.
    #[derive(Default)]
    pub struct FakeEditorial {
        pub fail_with: Mutex<Option<ApiError>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeEditorial {
        pub fn failing(err: ApiError) -> Self { Self { fail_with: Mutex::new(Some(err)), ..Default::default() } }

        fn record(&self, call: String) -> ApiResult<()> {
            self.calls.lock().unwrap().push(call);
            match self.fail_with.lock().unwrap().take() { Some(e) => Err(e), None => Ok(()) }
        }
    }

    #[async_trait]
    impl Editorial for FakeEditorial {
        async fn create_article(&self, p: &ArticlePayload) -> ApiResult<Article> {
            self.record(format!("create article {}", p.title))?;
            Ok(Article { id: "new-1".into(), title: p.title.clone(), tags: crate::types::wire::split_tags(&p.tags), ..Default::default() })
        }
        async fn update_article(&self, id: &str, p: &ArticlePayload) -> ApiResult<Article> {
            self.record(format!("update article {id}"))?;
            Ok(Article { id: id.into(), title: p.title.clone(), ..Default::default() })
        }
        async fn create_video(&self, p: &VideoPayload) -> ApiResult<Video> {
            self.record(format!("create video {}", p.title))?;
            Ok(Video { id: "v-new".into(), title: p.title.clone(), ..Default::default() })
        }
        async fn update_video(&self, id: &str, p: &VideoPayload) -> ApiResult<Video> {
            self.record(format!("update video {id}"))?;
            Ok(Video { id: id.into(), title: p.title.clone(), ..Default::default() })
        }
        async fn create_podcast(&self, p: &PodcastPayload) -> ApiResult<Podcast> {
            self.record(format!("create podcast {}", p.title))?;
            Ok(Podcast { id: "p-new".into(), title: p.title.clone(), ..Default::default() })
        }
        async fn update_podcast(&self, id: &str, p: &PodcastPayload) -> ApiResult<Podcast> {
            self.record(format!("update podcast {id}"))?;
            Ok(Podcast { id: id.into(), title: p.title.clone(), ..Default::default() })
        }
    }
}
