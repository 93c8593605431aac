//! Free-text search, status filtering and sorting over an audit log snapshot.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entry::{AuditLogEntry, EventKind};
use crate::error::Result;
use crate::gateway::ApiGateway;

/// A query parameter that did not match any known value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {field} '{value}'")]
pub struct InvalidQueryValue {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Success,
    Error,
    Processing,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Success => "success",
            StatusFilter::Error => "error",
            StatusFilter::Processing => "processing",
        }
    }

    /// Exact match on the resolved status. Entries without one only pass `All`.
    pub fn matches(&self, status: Option<&str>) -> bool {
        match self {
            StatusFilter::All => true,
            other => status == Some(other.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = InvalidQueryValue;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "success" => Ok(StatusFilter::Success),
            "error" => Ok(StatusFilter::Error),
            "processing" => Ok(StatusFilter::Processing),
            other => Err(InvalidQueryValue {
                field: "status filter",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Timestamp,
    Filename,
    EventType,
}

impl FromStr for SortField {
    type Err = InvalidQueryValue;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(SortField::Timestamp),
            "filename" => Ok(SortField::Filename),
            "event_type" => Ok(SortField::EventType),
            other => Err(InvalidQueryValue {
                field: "sort field",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = InvalidQueryValue;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(InvalidQueryValue {
                field: "sort direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Query parameters for the audit view. Defaults to newest first, unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditQuery {
    pub free_text: String,
    pub status_filter: StatusFilter,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl AuditQuery {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = text.into();
        self
    }

    pub fn with_status(mut self, filter: StatusFilter) -> Self {
        self.status_filter = filter;
        self
    }

    pub fn sorted_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_field = field;
        self.sort_direction = direction;
        self
    }

    pub fn paginate(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Filtered, sorted, paginated audit entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditView {
    pub entries: Vec<AuditLogEntry>,
    /// Matching entries before pagination.
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Counts shown above the audit table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total: usize,
    pub by_kind: BTreeMap<EventKind, usize>,
    pub by_status: BTreeMap<String, usize>,
    pub without_status: usize,
}

/// Case-insensitive substring match on document id, filename, event type and
/// the JSON form of `details`. `needle` must already be lowercase.
fn matches_text(entry: &AuditLogEntry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    entry.document_id.as_deref().is_some_and(contains)
        || entry.filename.as_deref().is_some_and(contains)
        || entry.event_type.as_deref().is_some_and(contains)
        || contains(&entry.details.to_json())
}

fn compare_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    let a = a.unwrap_or_default().to_lowercase();
    let b = b.unwrap_or_default().to_lowercase();
    a.cmp(&b)
}

/// Ascending order on `field`. Missing timestamps sort first.
pub fn compare_entries(a: &AuditLogEntry, b: &AuditLogEntry, field: SortField) -> Ordering {
    match field {
        SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortField::Filename => compare_text(a.resolved_filename(), b.resolved_filename()),
        SortField::EventType => compare_text(a.resolved_event_type(), b.resolved_event_type()),
    }
}

/// Computes the view of `entries` for `query`.
///
/// Pure: the same entries and query always give the same view. The sort is
/// stable, so equal entries keep their input order in either direction.
pub fn apply_query(entries: &[AuditLogEntry], query: &AuditQuery) -> AuditView {
    let needle = query.free_text.trim().to_lowercase();

    let mut matched: Vec<&AuditLogEntry> = entries
        .iter()
        .filter(|e| query.status_filter.matches(e.resolved_status()))
        .filter(|e| matches_text(e, &needle))
        .collect();

    matched.sort_by(|a, b| {
        let ordering = compare_entries(a, b, query.sort_field);
        match query.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let total = matched.len();
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(usize::MAX);
    let entries = matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    AuditView {
        entries,
        total,
        limit: query.limit,
        offset: query.offset,
    }
}

/// An immutable audit log snapshot and the queries over it.
///
/// Refreshing means building a new engine; there is no live subscription.
#[derive(Debug, Clone, Default)]
pub struct AuditQueryEngine {
    entries: Vec<AuditLogEntry>,
    skipped: usize,
}

impl AuditQueryEngine {
    pub fn from_entries(entries: Vec<AuditLogEntry>) -> Self {
        Self {
            entries,
            skipped: 0,
        }
    }

    /// Parses raw `/audit/logs` elements, skipping any that are not objects.
    pub fn from_values(values: &[serde_json::Value]) -> Self {
        let mut skipped = 0;
        let entries = values
            .iter()
            .filter_map(|v| {
                let entry = AuditLogEntry::from_value(v);
                if entry.is_none() {
                    skipped += 1;
                }
                entry
            })
            .collect();

        if skipped > 0 {
            warn!("Skipped {} malformed audit log entries", skipped);
        }
        Self { entries, skipped }
    }

    /// Fetches the audit log once through `gateway`.
    pub async fn load<G: ApiGateway + ?Sized>(gateway: &G) -> Result<Self> {
        let values = gateway.fetch_audit_logs().await?;
        let engine = Self::from_values(&values);
        debug!("Loaded audit snapshot with {} entries", engine.len());
        Ok(engine)
    }

    pub fn entries(&self) -> &[AuditLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of raw elements dropped while parsing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn query(&self, query: &AuditQuery) -> AuditView {
        apply_query(&self.entries, query)
    }

    pub fn summary(&self) -> AuditSummary {
        let mut summary = AuditSummary {
            total: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            *summary.by_kind.entry(entry.kind()).or_insert(0) += 1;
            match entry.resolved_status() {
                Some(status) => *summary.by_status.entry(status.to_string()).or_insert(0) += 1,
                None => summary.without_status += 1,
            }
        }
        summary
    }
}
