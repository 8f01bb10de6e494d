use super::{PairStore, StoreError};
use crate::language::{Language, PairTable, Table};
use crate::model::{DictionaryEntry, LanguagePairRecord};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Rows requested per page; hosted instances cap responses at 1000 rows
const PAGE_SIZE: usize = 1000;

/// Client for a hosted database exposing tables over a PostgREST-style API
#[derive(Clone)]
pub struct RestStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn fetch_all<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            let request = self
                .client
                .get(self.endpoint(table))
                .query(&[("select", "*"), ("order", "id")])
                .query(filters)
                .query(&[("offset", offset), ("limit", PAGE_SIZE)]);
            let response = check(self.authorized(request).send().await?).await?;
            let page: Vec<T> = response.json().await?;

            let fetched = page.len();
            rows.extend(page);
            debug!(table, fetched, total = rows.len(), "Fetched page");

            if fetched < PAGE_SIZE {
                return Ok(rows);
            }
            offset += fetched;
        }
    }
}

/// Turn a non-success status into `StoreError::Rejected` with the response body
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// Whether a rejection body reports an integrity constraint violation.
///
/// Postgres reports those with SQLSTATE class 23; conflicts also come back as 409.
pub(super) fn is_constraint_violation(status: u16, body: &str) -> bool {
    if status == 409 {
        return true;
    }
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(|c| c.as_str()).map(|c| c.starts_with("23")))
        .unwrap_or(false)
}

/// Which optional columns a record carries once serialized
fn shape(record: &LanguagePairRecord) -> [bool; 6] {
    [
        record.pronunciation.is_some(),
        record.reading_aid.is_some(),
        record.entry_type.is_some(),
        record.level.is_some(),
        record.example.is_some(),
        record.synonyms.is_some(),
    ]
}

/// Bulk inserts need every object to have the same keys, and filling the gaps
/// with nulls would overwrite stored values, so each column set gets its own
/// request. Groups keep first-seen order.
fn group_by_shape(records: &[LanguagePairRecord]) -> Vec<Vec<&LanguagePairRecord>> {
    let mut groups: Vec<([bool; 6], Vec<&LanguagePairRecord>)> = Vec::new();
    for record in records {
        let key = shape(record);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(record),
            None => groups.push((key, vec![record])),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}

/// Extract the total from a `Content-Range` header such as `0-24/3573` or `*/0`
pub(super) fn parse_content_range(value: &str) -> Option<i64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

impl PairStore for RestStore {
    async fn fetch_words(&self, language: Language) -> Result<Vec<DictionaryEntry>, StoreError> {
        self.fetch_all("words", &[("language", format!("eq.{}", language.code()))])
            .await
    }

    async fn fetch_pairs(&self, pair: PairTable) -> Result<Vec<LanguagePairRecord>, StoreError> {
        self.fetch_all(&pair.name(), &[]).await
    }

    async fn upsert_pairs(
        &self,
        pair: PairTable,
        records: &[LanguagePairRecord],
    ) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let table = pair.name();
        let groups = group_by_shape(records);
        if groups.len() > 1 {
            debug!(table = %table, requests = groups.len(), "Splitting batch by column set");
        }
        for group in &groups {
            let request = self
                .client
                .post(self.endpoint(&table))
                .query(&[("on_conflict", "source_word")])
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(group);
            check(self.authorized(request).send().await?).await?;
        }

        Ok(records.len() as u64)
    }

    async fn count_rows(&self, table: Table) -> Result<i64, StoreError> {
        let request = self
            .client
            .head(self.endpoint(&table.name()))
            .query(&[("select", "*")])
            .header("Prefer", "count=exact");
        let response = check(self.authorized(request).send().await?).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| StoreError::Decode(format!("no row count for {}", table.name())))
    }
}
