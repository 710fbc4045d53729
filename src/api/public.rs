//! Unauthenticated `/public/*` endpoints used by the reading side.

use reqwest::Method;
use serde::de::DeserializeOwned;

use super::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::types::{Article, Listing, Podcast, TvShow, Video};

impl ApiClient {
    async fn public_list<T: DeserializeOwned>(&self, collection: &str, query: &ListQuery) -> ApiResult<Listing<T>> {
        let rb = self.request(Method::GET, &["public", collection], false)?.query(query);
        self.fetch_list(rb, &format!("public {collection}")).await
    }

    pub async fn public_articles(&self, query: &ListQuery) -> ApiResult<Listing<Article>> {
        self.public_list("articles", query).await
    }

    pub async fn public_article(&self, id: &str) -> ApiResult<Article> {
        let rb = self.request(Method::GET, &["public", "articles", id], false)?;
        self.fetch_one(rb, "public article").await
    }

    pub async fn public_videos(&self, query: &ListQuery) -> ApiResult<Listing<Video>> {
        self.public_list("videos", query).await
    }

    pub async fn public_tv_shows(&self, query: &ListQuery) -> ApiResult<Listing<TvShow>> {
        self.public_list("tv-shows", query).await
    }

    pub async fn public_podcasts(&self, query: &ListQuery) -> ApiResult<Listing<Podcast>> {
        self.public_list("podcasts", query).await
    }
}
