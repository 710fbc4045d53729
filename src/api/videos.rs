use super::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::forms::video::VideoPayload;
use crate::types::{Listing, Video};

const RESOURCE: &str = "videos";

impl ApiClient {
    pub async fn list_videos(&self, query: &ListQuery) -> ApiResult<Listing<Video>> {
        self.list_resource(RESOURCE, query).await
    }

    pub async fn get_video(&self, id: &str) -> ApiResult<Video> {
        self.get_resource(RESOURCE, id).await
    }

    pub async fn create_video(&self, payload: &VideoPayload) -> ApiResult<Video> {
        tracing::info!(title = %payload.title, "creating video");
        self.create_resource(RESOURCE, payload).await
    }

    pub async fn update_video(&self, id: &str, payload: &VideoPayload) -> ApiResult<Video> {
        tracing::info!(id, "updating video");
        self.update_resource(RESOURCE, id, payload).await
    }

    pub async fn delete_video(&self, id: &str) -> ApiResult<()> {
        tracing::info!(id, "deleting video");
        self.delete_resource(RESOURCE, id).await
    }
}
