use async_trait::async_trait;

use crate::api::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::types::{Article, Podcast, TvShow, Video};

/// Where the content store pulls its collections from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn articles(&self, limit: usize) -> ApiResult<Vec<Article>>;
    async fn videos(&self, limit: usize) -> ApiResult<Vec<Video>>;
    async fn tv_shows(&self, limit: usize) -> ApiResult<Vec<TvShow>>;
    async fn podcasts(&self, limit: usize) -> ApiResult<Vec<Podcast>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `/public/*`: published content for readers.
    Public,
    /// Authenticated collection endpoints: every status, for editors.
    Admin,
}

/// [`ContentSource`] backed by the REST API.
#[derive(Clone)]
pub struct ApiSource {
    client: ApiClient,
    scope: Scope,
}

impl ApiSource {
    pub fn new(client: ApiClient, scope: Scope) -> Self { Self { client, scope } }
    pub fn public(client: ApiClient) -> Self { Self::new(client, Scope::Public) }
    pub fn admin(client: ApiClient) -> Self { Self::new(client, Scope::Admin) }
    pub fn scope(&self) -> Scope { self.scope }
}

#[async_trait]
impl ContentSource for ApiSource {
    async fn articles(&self, limit: usize) -> ApiResult<Vec<Article>> {
        let q = ListQuery::limit(limit);
        let listing = match self.scope {
            Scope::Public => self.client.public_articles(&q).await?,
            Scope::Admin => self.client.list_articles(&q).await?,
        };
        Ok(listing.items)
    }

    async fn videos(&self, limit: usize) -> ApiResult<Vec<Video>> {
        let q = ListQuery::limit(limit);
        let listing = match self.scope {
            Scope::Public => self.client.public_videos(&q).await?,
            Scope::Admin => self.client.list_videos(&q).await?,
        };
        Ok(listing.items)
    }

    async fn tv_shows(&self, limit: usize) -> ApiResult<Vec<TvShow>> {
        match self.scope {
            Scope::Public => Ok(self.client.public_tv_shows(&ListQuery::limit(limit)).await?.items),
            // No admin endpoint for shows.
            Scope::Admin => Ok(Vec::new()),
        }
    }

    async fn podcasts(&self, limit: usize) -> ApiResult<Vec<Podcast>> {
        let q = ListQuery::limit(limit);
        let listing = match self.scope {
            Scope::Public => self.client.public_podcasts(&q).await?,
            Scope::Admin => self.client.list_podcasts(&q).await?,
        };
        Ok(listing.items)
    }
}
