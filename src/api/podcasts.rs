use super::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::forms::podcast::PodcastPayload;
use crate::types::{Listing, Podcast};

const RESOURCE: &str = "podcasts";

impl ApiClient {
    pub async fn list_podcasts(&self, query: &ListQuery) -> ApiResult<Listing<Podcast>> {
        self.list_resource(RESOURCE, query).await
    }

    pub async fn get_podcast(&self, id: &str) -> ApiResult<Podcast> {
        self.get_resource(RESOURCE, id).await
    }

    pub async fn create_podcast(&self, payload: &PodcastPayload) -> ApiResult<Podcast> {
        tracing::info!(title = %payload.title, "creating podcast episode");
        self.create_resource(RESOURCE, payload).await
    }

    pub async fn update_podcast(&self, id: &str, payload: &PodcastPayload) -> ApiResult<Podcast> {
        tracing::info!(id, "updating podcast episode");
        self.update_resource(RESOURCE, id, payload).await
    }

    pub async fn delete_podcast(&self, id: &str) -> ApiResult<()> {
        tracing::info!(id, "deleting podcast episode");
        self.delete_resource(RESOURCE, id).await
    }
}
