//! Delivery stage: citations map, table of contents, sorted references,
//! and quality metrics.

use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use sonar_core::citations::{extract_citation_ids, sort_references, strip_markers};
use sonar_core::models::report::{
    Citation, QualityMetrics, Report, ReportMetadata, ReportSection, TocEntry,
};
use sonar_core::models::research::StudyType;
use sonar_core::models::source::Source;

/// Assemble the terminal report from the synthesized sections.
pub fn assemble_report(
    study_type: StudyType,
    query: &str,
    title_prefix: &str,
    summary: String,
    mut sections: Vec<ReportSection>,
    citation_map: &BTreeMap<String, Source>,
    total_sources: u32,
) -> Report {
    for section in &mut sections {
        drop_unbacked_markers(section, citation_map);
    }

    let mut citations: BTreeMap<String, Citation> = BTreeMap::new();
    for section in &sections {
        for id in &section.citation_ids {
            let Some(source) = citation_map.get(id) else {
                continue;
            };
            let entry = citations.entry(id.clone()).or_insert_with(|| Citation {
                source: source.clone(),
                used_in_sections: Vec::new(),
            });
            if !entry.used_in_sections.contains(&section.id) {
                entry.used_in_sections.push(section.id.clone());
            }
        }
    }

    let mut references: Vec<String> = citations.keys().cloned().collect();
    sort_references(&mut references);

    let table_of_contents = sections.iter().map(toc_entry).collect();
    let quality_metrics = quality_metrics(&sections);

    Report {
        id: Uuid::new_v4().to_string(),
        title: format!("{title_prefix}: {query}"),
        summary,
        metadata: ReportMetadata {
            study_type,
            query: query.to_string(),
            generated_at: Utc::now(),
            total_sources,
        },
        table_of_contents,
        sections,
        citations,
        references,
        quality_metrics,
    }
}

/// A marker whose id has no backing source must not survive into the
/// report: every id cited in prose is a key of the citations map. Strips
/// such markers and recomputes `citation_ids` so the list stays equal to
/// the ids extracted from the content.
fn drop_unbacked_markers(section: &mut ReportSection, citation_map: &BTreeMap<String, Source>) {
    section.content = strip_markers(&section.content, |id| citation_map.contains_key(id));
    section.citation_ids = extract_citation_ids(&section.content);
    for child in &mut section.children {
        drop_unbacked_markers(child, citation_map);
    }
}

fn toc_entry(section: &ReportSection) -> TocEntry {
    TocEntry {
        id: section.id.clone(),
        title: section.title.clone(),
        children: section.children.iter().map(toc_entry).collect(),
    }
}

fn quality_metrics(sections: &[ReportSection]) -> QualityMetrics {
    let total_sections = sections.len() as u32;
    let sections_with_citations = sections
        .iter()
        .filter(|s| !s.citation_ids.is_empty())
        .count() as u32;
    let total_citations: u32 = sections.iter().map(|s| s.citation_ids.len() as u32).sum();
    let completeness_score = if total_sections == 0 {
        0
    } else {
        (sections_with_citations * 100) / total_sections
    };
    QualityMetrics {
        total_citations,
        sections_with_citations,
        total_sections,
        completeness_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_core::models::source::SourceType;

    fn section(id: &str, content: &str, ids: &[&str]) -> ReportSection {
        ReportSection {
            id: id.to_string(),
            title: id.to_string(),
            content: content.to_string(),
            citation_ids: ids.iter().map(|s| s.to_string()).collect(),
            children: Vec::new(),
        }
    }

    fn citation_map() -> BTreeMap<String, Source> {
        let mut map = BTreeMap::new();
        for id in ["B1", "B2", "W1", "W2"] {
            let ty = if id.starts_with('B') {
                SourceType::InternalIntelligence
            } else {
                SourceType::Web
            };
            map.insert(id.to_string(), Source::new(format!("src {id}"), ty));
        }
        map
    }

    #[test]
    fn references_sort_internal_before_web() {
        let sections = vec![
            section("a", "x [W2] y [B1]", &["W2", "B1"]),
            section("b", "z [B2] [W1]", &["B2", "W1"]),
        ];
        let report = assemble_report(
            StudyType::MarketAnalysis,
            "lithium",
            "Market Analysis",
            "summary".to_string(),
            sections,
            &citation_map(),
            4,
        );
        assert_eq!(report.references, vec!["B1", "B2", "W1", "W2"]);
        assert_eq!(report.citations["B1"].used_in_sections, vec!["a"]);
    }

    #[test]
    fn completeness_reflects_cited_section_share() {
        let sections = vec![
            section("a", "x [B1]", &["B1"]),
            section("b", "no citations", &[]),
        ];
        let report = assemble_report(
            StudyType::RiskAssessment,
            "cobalt",
            "Risk Assessment",
            "summary".to_string(),
            sections,
            &citation_map(),
            1,
        );
        assert_eq!(report.quality_metrics.completeness_score, 50);
        assert_eq!(report.quality_metrics.total_citations, 1);
        assert_eq!(report.table_of_contents.len(), 2);
    }

    #[test]
    fn markers_without_pool_sources_are_stripped_from_prose() {
        let sections = vec![section("a", "x [B9]", &["B9"])];
        let report = assemble_report(
            StudyType::Custom,
            "q",
            "Research Study",
            "summary".to_string(),
            sections,
            &citation_map(),
            0,
        );
        assert!(report.citations.is_empty());
        assert!(report.references.is_empty());
        assert_eq!(report.sections[0].content, "x ");
        assert!(report.sections[0].citation_ids.is_empty());
    }

    #[test]
    fn every_cited_id_resolves_in_the_citations_map() {
        // A hallucinated id alongside a real one: the real marker stays,
        // the unbacked one leaves both the prose and the id list.
        let sections = vec![section("a", "demand grew [B1], per [B99]", &["B1", "B99"])];
        let report = assemble_report(
            StudyType::MarketAnalysis,
            "lithium",
            "Market Analysis",
            "summary".to_string(),
            sections,
            &citation_map(),
            1,
        );
        assert_eq!(report.sections[0].content, "demand grew [B1], per ");
        assert_eq!(report.sections[0].citation_ids, vec!["B1"]);
        for section in &report.sections {
            for id in extract_citation_ids(&section.content) {
                assert!(report.citations.contains_key(&id), "unresolvable id {id}");
            }
        }
    }
}
