//! Tempo Core v3 worklog endpoints.

use chrono::NaiveDate;

use crate::client::ApiClient;
use crate::config::{ClientConfig, DEFAULT_TEMPO_PAGE_SIZE};
use crate::error::{ApiError, Result};
use crate::models::{TempoPage, TempoWorklog, TempoWorklogPayload, TempoWorklogRequest};
use crate::rate_limiter::RateLimiter;

#[derive(Clone)]
pub struct TempoClient {
    api: ApiClient,
    page_size: u32,
}

impl TempoClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config)?,
            page_size: DEFAULT_TEMPO_PAGE_SIZE,
        })
    }

    pub fn new_with_limiter(config: ClientConfig, limiter: RateLimiter) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new_with_limiter(config, limiter)?,
            page_size: DEFAULT_TEMPO_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 1000);
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Lists every worklog of `account_id` dated between `from` and `to`, both
    /// inclusive, following `metadata.next` until the last page.
    pub async fn worklogs_for_user(
        &self,
        account_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TempoWorklog>> {
        if account_id.trim().is_empty() {
            return Err(ApiError::Validation("Tempo account id is empty".to_string()));
        }
        let path = format!("worklogs/user/{}", account_id.trim());
        let query = [
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
            ("offset", "0".to_string()),
            ("limit", self.page_size.to_string()),
        ];

        let mut page: TempoPage<TempoWorklogPayload> =
            self.api.get_with_query(&path, &query).await?;
        let mut worklogs = Vec::new();
        loop {
            let next = page.metadata.next.take();
            worklogs.extend(page.results.into_iter().map(TempoWorklog::from));
            match next {
                Some(href) if !href.trim().is_empty() => {
                    tracing::debug!(fetched = worklogs.len(), "following Tempo pagination");
                    page = self.api.get_absolute(&href).await?;
                }
                _ => break,
            }
        }
        Ok(worklogs)
    }

    pub async fn create_worklog(&self, worklog: &TempoWorklog) -> Result<TempoWorklog> {
        validate(worklog)?;
        let payload: TempoWorklogPayload = self
            .api
            .post("worklogs", &TempoWorklogRequest::from(worklog))
            .await?;
        Ok(payload.into())
    }

    pub async fn update_worklog(&self, worklog: &TempoWorklog) -> Result<TempoWorklog> {
        validate(worklog)?;
        let id = worklog
            .id
            .ok_or_else(|| ApiError::Validation("worklog has no id to update".to_string()))?;
        let path = format!("worklogs/{}", id);
        let payload: TempoWorklogPayload =
            self.api.put(&path, &TempoWorklogRequest::from(worklog)).await?;
        Ok(payload.into())
    }

    pub async fn delete_worklog(&self, id: u64) -> Result<()> {
        let path = format!("worklogs/{}", id);
        self.api.delete(&path).await
    }
}

fn validate(worklog: &TempoWorklog) -> Result<()> {
    if worklog.issue_key.trim().is_empty() {
        return Err(ApiError::Validation(
            "worklog has no issue key; put one in the description".to_string(),
        ));
    }
    if worklog.author_account_id.trim().is_empty() {
        return Err(ApiError::Validation("worklog has no author account id".to_string()));
    }
    Ok(())
}
