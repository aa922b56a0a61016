//! Read-write catalog stored in a hosted table behind a PostgREST-style API
//! (`GET`/`POST`/`DELETE` on `/rest/v1/<table>`).

use marquee_core::config::RemoteConfig;
use marquee_core::error::RepositoryError;
use marquee_core::models::{MovieEntry, MovieId, NewMovie};
use marquee_core::repository::CatalogRepository;
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::error::{check_response, RemoteError};

/// Remote table client.
pub struct RemoteTableRepository {
    table_url: Url,
    order_by: String,
    api_key: Option<String>,
    http: Client,
}

impl RemoteTableRepository {
    pub fn new(
        endpoint: &str,
        table: &str,
        order_by: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            table_url: table_url(endpoint, table)?,
            order_by: order_by.into(),
            api_key,
            http: Client::new(),
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        Self::new(
            &config.endpoint,
            &config.table,
            config.order_by.clone(),
            config.api_key(),
        )
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header("Accept", "application/json");
        match &self.api_key {
            Some(key) => req
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}")),
            None => req,
        }
    }

    fn list_url(&self) -> Url {
        let mut url = self.table_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            if !self.order_by.is_empty() {
                query.append_pair("order", &self.order_by);
            }
        }
        url
    }

    fn row_url(&self, id: &MovieId) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));
        url
    }

    #[tracing::instrument(name = "remote_list", skip(self))]
    pub async fn fetch_rows(&self) -> Result<Vec<MovieEntry>, RemoteError> {
        let resp = self.authorize(self.http.get(self.list_url())).send().await?;
        let resp = check_response(resp, "list").await?;
        let rows: Vec<MovieEntry> = resp
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        tracing::debug!(count = rows.len(), "Remote rows received");
        Ok(rows)
    }

    #[tracing::instrument(name = "remote_insert", skip(self, movie), fields(title = %movie.title))]
    pub async fn insert_row(&self, movie: &NewMovie) -> Result<MovieEntry, RemoteError> {
        let resp = self
            .authorize(self.http.post(self.table_url.clone()))
            .header("Prefer", "return=representation")
            .json(movie)
            .send()
            .await?;
        let resp = check_response(resp, "create").await?;
        let mut rows: Vec<MovieEntry> = resp
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        if rows.is_empty() {
            return Err(RemoteError::Parse("insert returned no row".into()));
        }
        Ok(rows.swap_remove(0))
    }

    /// Delete by id. Returns how many rows were removed.
    #[tracing::instrument(name = "remote_delete", skip(self, id), fields(id = %id))]
    pub async fn delete_row(&self, id: &MovieId) -> Result<usize, RemoteError> {
        let resp = self
            .authorize(self.http.delete(self.row_url(id)))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let resp = check_response(resp, "delete").await?;
        let rows: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        Ok(rows.len())
    }
}

impl CatalogRepository for RemoteTableRepository {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn list(&self) -> Result<Vec<MovieEntry>, RepositoryError> {
        Ok(self.fetch_rows().await?)
    }

    async fn create(&self, movie: &NewMovie) -> Result<MovieEntry, RepositoryError> {
        Ok(self.insert_row(movie).await?)
    }

    async fn delete(&self, id: &MovieId) -> Result<(), RepositoryError> {
        match self.delete_row(id).await? {
            0 => Err(RepositoryError::NotFound(id.to_string())),
            _ => Ok(()),
        }
    }
}

/// `<endpoint>/rest/v1/<table>`, keeping any path prefix the endpoint has.
fn table_url(endpoint: &str, table: &str) -> Result<Url, RemoteError> {
    let invalid = |reason: String| RemoteError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let table = table.trim();
    if table.is_empty() {
        return Err(invalid("table name is empty".into()));
    }
    let mut url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| invalid("endpoint cannot be a base URL".into()))?
        .pop_if_empty()
        .extend(["rest", "v1", table]);
    Ok(url)
}
