use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{GradeCriteriaId, PolicyDocumentId};

/// Separator between uploaded file URLs in `EventProposalRequest::file_urls`.
///
/// `;` is legal inside a URL, so URLs that contain it cannot be joined.
pub const FILE_URL_SEPARATOR: &str = ";";

pub const DEFAULT_PAGE_SIZE: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("file url '{url}' contains the ';' separator")]
pub struct SeparatorInUrl {
    pub url: String,
}

/// Joins URLs with `FILE_URL_SEPARATOR`. Fails rather than produce a value
/// that splits back into different URLs.
pub fn join_file_urls(urls: &[String]) -> Result<String, SeparatorInUrl> {
    if let Some(url) = urls.iter().find(|url| url.contains(FILE_URL_SEPARATOR)) {
        return Err(SeparatorInUrl { url: url.clone() });
    }
    Ok(urls.join(FILE_URL_SEPARATOR))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProposalRequest {
    pub title: String,
    pub content: String,
    pub file_urls: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFilesResponse {
    pub file_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeCriteria {
    pub id: GradeCriteriaId,
    pub content: String,
    pub policy_document_id: PolicyDocumentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGradeCriteriaRequest {
    pub content: String,
    pub policy_document_id: PolicyDocumentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a paged listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_urls_join_with_shared_separator() {
        let urls = vec!["https://cdn/a.pdf".to_string(), "https://cdn/b.png".to_string()];
        let joined = join_file_urls(&urls).expect("joined");
        assert_eq!(joined, format!("https://cdn/a.pdf{FILE_URL_SEPARATOR}https://cdn/b.png"));
        let parts: Vec<_> = joined.split(FILE_URL_SEPARATOR).collect();
        assert_eq!(parts, urls);
    }

    #[test]
    fn no_file_urls_join_to_empty_string() {
        assert_eq!(join_file_urls(&[]).expect("joined"), "");
    }

    #[test]
    fn url_containing_separator_is_refused() {
        let urls = vec![
            "https://cdn/a.pdf".to_string(),
            "https://cdn/x;v=1".to_string(),
        ];
        let err = join_file_urls(&urls).expect_err("must refuse");
        assert_eq!(err.url, "https://cdn/x;v=1");
        assert!(err.to_string().contains("https://cdn/x;v=1"));
    }

    #[test]
    fn proposal_request_uses_camel_case_fields() {
        let request = EventProposalRequest {
            title: "Spring fair".to_string(),
            content: "<p>details</p>".to_string(),
            file_urls: "a;b".to_string(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "title": "Spring fair",
                "content": "<p>details</p>",
                "fileUrls": "a;b",
            })
        );
    }

    #[test]
    fn page_tolerates_missing_paging_fields() {
        let page: Page<GradeCriteria> = serde_json::from_str(
            r#"{"content":[{"id":4,"content":"Attendance","policyDocumentId":2}]}"#,
        )
        .expect("page");
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].id, GradeCriteriaId(4));
        assert_eq!(page.content[0].policy_document_id, PolicyDocumentId(2));
        assert_eq!(page.total_elements, 0);
    }
}
