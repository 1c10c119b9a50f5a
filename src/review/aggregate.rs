//! Merging slides, analysis and decisions into per-slide views
//!
//! The three collections are fetched and mutated independently. Merging
//! reads them without modification and tolerates any of them being partial:
//! - a slide without analysis has no suggestions and reports `NotAnalyzed`
//! - a slide without decisions shows every suggestion undecided
//! - decisions whose suggestion no longer exists are skipped

use super::decision::Decision;
use crate::models::{AnalysisDocument, DecisionsDocument, Slide, Suggestion};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Suggestion id → decision, for one slide
pub type DecisionMap = BTreeMap<String, Decision>;

/// Slide id → current suggestion set
pub type AnalysisBySlide = HashMap<String, Vec<Suggestion>>;

/// Slide id → decision map
pub type DecisionsBySlide = HashMap<String, DecisionMap>;

/// Whether a slide has been analyzed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    NotAnalyzed,
    Analyzed,
}

/// A suggestion paired with the reviewer's decision, if any
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionView<'a> {
    pub suggestion: &'a Suggestion,
    pub decision: Option<&'a Decision>,
}

impl SuggestionView<'_> {
    pub fn is_decided(&self) -> bool {
        self.decision.map(Decision::is_decided).unwrap_or(false)
    }
}

/// Merged view of one slide
#[derive(Debug, Clone, PartialEq)]
pub struct SlideAggregate<'a> {
    pub slide: &'a Slide,
    pub analysis: AnalysisState,
    pub suggestions: Vec<SuggestionView<'a>>,
    /// Decisions held for suggestions that are no longer present
    pub dangling_decisions: usize,
}

impl SlideAggregate<'_> {
    pub fn slide_id(&self) -> &str {
        &self.slide.slide_id
    }

    pub fn is_analyzed(&self) -> bool {
        self.analysis == AnalysisState::Analyzed
    }

    pub fn decided_count(&self) -> usize {
        self.suggestions.iter().filter(|s| s.is_decided()).count()
    }

    pub fn undecided_count(&self) -> usize {
        self.suggestions.len() - self.decided_count()
    }
}

/// Build the merged view for a single slide
pub fn aggregate<'a>(
    slide: &'a Slide,
    analysis: &'a AnalysisBySlide,
    decisions: &'a DecisionsBySlide,
) -> SlideAggregate<'a> {
    let suggestions = analysis.get(&slide.slide_id);
    let decision_map = decisions.get(&slide.slide_id);

    let views: Vec<SuggestionView<'a>> = suggestions
        .map(|list| {
            list.iter()
                .map(|suggestion| SuggestionView {
                    suggestion,
                    decision: decision_map.and_then(|m| m.get(&suggestion.id)),
                })
                .collect()
        })
        .unwrap_or_default();

    let dangling_decisions = decision_map
        .map(|m| {
            m.keys()
                .filter(|id| !views.iter().any(|v| &v.suggestion.id == *id))
                .count()
        })
        .unwrap_or(0);

    if dangling_decisions > 0 {
        debug!(
            "Slide {} holds {} decision(s) for suggestions no longer present",
            slide.slide_id, dangling_decisions
        );
    }

    SlideAggregate {
        slide,
        analysis: if suggestions.is_some() {
            AnalysisState::Analyzed
        } else {
            AnalysisState::NotAnalyzed
        },
        suggestions: views,
        dangling_decisions,
    }
}

/// Merge all three collections into views keyed by slide id
pub fn merge<'a>(
    slides: &'a [Slide],
    analysis: &'a AnalysisBySlide,
    decisions: &'a DecisionsBySlide,
) -> HashMap<&'a str, SlideAggregate<'a>> {
    slides
        .iter()
        .map(|slide| (slide.slide_id.as_str(), aggregate(slide, analysis, decisions)))
        .collect()
}

/// Index an analysis document by slide id; later entries for a slide win
pub fn index_analysis(doc: AnalysisDocument) -> AnalysisBySlide {
    doc.slides
        .into_iter()
        .map(|slide| (slide.slide_id, slide.suggestions))
        .collect()
}

/// Index a decisions document by slide id
pub fn index_decisions(doc: DecisionsDocument) -> DecisionsBySlide {
    doc.slides
        .into_iter()
        .map(|slide| {
            let map = slide
                .decisions
                .iter()
                .map(|entry| (entry.suggestion_id.clone(), Decision::from_entry(entry)))
                .collect();
            (slide.slide_id, map)
        })
        .collect()
}
