use super::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::forms::article::ArticlePayload;
use crate::types::{Article, Listing};

const RESOURCE: &str = "articles";

impl ApiClient {
    /// Admin listing: every status, filtered by `query`.
    pub async fn list_articles(&self, query: &ListQuery) -> ApiResult<Listing<Article>> {
        self.list_resource(RESOURCE, query).await
    }

    pub async fn get_article(&self, id: &str) -> ApiResult<Article> {
        self.get_resource(RESOURCE, id).await
    }

    pub async fn create_article(&self, payload: &ArticlePayload) -> ApiResult<Article> {
        tracing::info!(title = %payload.title, "creating article");
        self.create_resource(RESOURCE, payload).await
    }

    pub async fn update_article(&self, id: &str, payload: &ArticlePayload) -> ApiResult<Article> {
        tracing::info!(id, "updating article");
        self.update_resource(RESOURCE, id, payload).await
    }

    pub async fn delete_article(&self, id: &str) -> ApiResult<()> {
        tracing::info!(id, "deleting article");
        self.delete_resource(RESOURCE, id).await
    }
}
