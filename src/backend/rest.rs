use async_trait::async_trait;
use reqwest::Method;

use crate::error::{AppError, AppResult};
use crate::http_client::HttpClient;
use crate::middleware::Identity;
use crate::models::{NewPart, Part, PartPatch};

use super::{Order, PartQuery, PartsTable};

/// Table access through the backend's PostgREST endpoint.
pub struct RestTable {
    http: HttpClient,
    table: String,
}

impl RestTable {
    pub fn new(http: HttpClient, table: String) -> Self {
        Self { http, table }
    }

    fn path(&self) -> String {
        format!("rest/v1/{}", self.table)
    }
}

/// Quote a value for use inside a PostgREST logic filter.
fn quote_filter_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Make `%` and `_` in a search term match literally under `ilike`.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Query-string parameters for a select.
pub fn query_params(query: &PartQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", "*".to_string())];

    if let Some(id) = &query.id {
        params.push(("id", format!("eq.{}", id)));
    }
    if let Some(term) = &query.search {
        let pattern = quote_filter_value(&format!("*{}*", escape_like(term)));
        params.push((
            "or",
            format!("(part_id.ilike.{p},name.ilike.{p})", p = pattern),
        ));
    }
    match query.order {
        Some(Order::CreatedAtAsc) => params.push(("order", "created_at.asc".to_string())),
        Some(Order::CreatedAtDesc) => params.push(("order", "created_at.desc".to_string())),
        None => {}
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

#[async_trait]
impl PartsTable for RestTable {
    async fn select(&self, identity: &Identity, query: &PartQuery) -> AppResult<Vec<Part>> {
        let response = self
            .http
            .request(Method::GET, &self.path(), Some(identity))
            .query(&query_params(query))
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = HttpClient::check(response).await?.json().await?;

        tracing::debug!(table = %self.table, rows = rows.len(), "Selected parts");
        Part::from_values(rows)
    }

    async fn insert(&self, identity: &Identity, part: NewPart) -> AppResult<Part> {
        let response = self
            .http
            .request(Method::POST, &self.path(), Some(identity))
            .header("Prefer", "return=representation")
            .json(&part)
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = HttpClient::check(response).await?.json().await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Backend("Insert returned no row".to_string()))?;
        let part = Part::from_value(row)?;

        tracing::info!(table = %self.table, id = %part.id, part_id = %part.part_id, "Inserted part");
        Ok(part)
    }

    async fn update(&self, identity: &Identity, id: &str, patch: PartPatch) -> AppResult<()> {
        let response = self
            .http
            .request(Method::PATCH, &self.path(), Some(identity))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await?;
        HttpClient::check(response).await?;

        tracing::info!(table = %self.table, id = %id, ?patch, "Updated part");
        Ok(())
    }

    async fn delete(&self, identity: &Identity, id: &str) -> AppResult<()> {
        let response = self
            .http
            .request(Method::DELETE, &self.path(), Some(identity))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        HttpClient::check(response).await?;

        tracing::info!(table = %self.table, id = %id, "Deleted part");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params() {
        let params = query_params(&PartQuery::all().order(Order::CreatedAtDesc));
        assert_eq!(
            params,
            vec![
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_params() {
        let params = query_params(&PartQuery::matching("BRK").order(Order::CreatedAtAsc).limit(1));
        assert_eq!(
            params,
            vec![
                ("select", "*".to_string()),
                ("or", "(part_id.ilike.\"*BRK*\",name.ilike.\"*BRK*\")".to_string()),
                ("order", "created_at.asc".to_string()),
                ("limit", "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_term_with_reserved_characters_is_quoted() {
        let params = query_params(&PartQuery::matching("a,b(\"c\")"));
        assert_eq!(
            params[1].1,
            "(part_id.ilike.\"*a,b(\\\"c\\\")*\",name.ilike.\"*a,b(\\\"c\\\")*\")"
        );
    }

    #[test]
    fn test_search_term_like_wildcards_match_literally() {
        let params = query_params(&PartQuery::matching("50%_off"));
        assert_eq!(
            params[1].1,
            r#"(part_id.ilike."*50\\%\\_off*",name.ilike."*50\\%\\_off*")"#
        );
    }

    #[test]
    fn test_by_id_params() {
        let params = query_params(&PartQuery::by_id("abc"));
        assert!(params.contains(&("id", "eq.abc".to_string())));
        assert!(params.contains(&("limit", "1".to_string())));
    }
}
