use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::research::StudyType;
use super::source::Source;

/// One report section. Content is markdown with inline `[B#]`/`[W#]`
/// citation markers; `citation_ids` is the set extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportSection {
    pub id: String,
    pub title: String,
    pub content: String,
    pub citation_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportSection>,
}

/// A citation entry: the source plus every section that used it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub source: Source,
    pub used_in_sections: Vec<String>,
}

/// Table-of-contents entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct TocEntry {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

/// Aggregate citation quality over a report.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub total_citations: u32,
    pub sections_with_citations: u32,
    pub total_sections: u32,
    /// 0–100.
    pub completeness_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub study_type: StudyType,
    pub query: String,
    pub generated_at: DateTime<Utc>,
    pub total_sources: u32,
}

/// The terminal synthesis product of a deep-research job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub title: String,
    /// Executive summary.
    pub summary: String,
    pub metadata: ReportMetadata,
    pub table_of_contents: Vec<TocEntry>,
    pub sections: Vec<ReportSection>,
    /// Citation id → citation, for every marker used in any section.
    pub citations: BTreeMap<String, Citation>,
    /// Sorted citation ids: all `B#` before all `W#`, numeric ascending.
    pub references: Vec<String>,
    pub quality_metrics: QualityMetrics,
}
