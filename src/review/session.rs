//! The review session store
//!
//! Holds everything known about the sermon under review: its slides, the
//! analysis and decision mappings, and the selected slide. There is exactly
//! one session per reviewer; it is owned by the caller and passed by
//! reference to the navigator and gateway.
//!
//! Results of asynchronous fetches carry the sermon id they were issued for.
//! They are discarded if the session has since moved to another sermon.

use super::aggregate::{
    aggregate, AnalysisBySlide, DecisionMap, DecisionsBySlide, SlideAggregate,
};
use super::decision::{Decision, DecisionAction};
use super::events::{ChangeKind, ChangeNotifier, StateChange};
use crate::error::{Error, Result};
use crate::models::{SaveDecisionsPayload, Slide, SlideAnalysis};
use std::collections::HashSet;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Slides, analysis and decisions fetched together for one sermon
#[derive(Debug, Clone, Default)]
pub struct ReviewData {
    pub sermon_id: String,
    pub slides: Vec<Slide>,
    pub analysis: AnalysisBySlide,
    pub decisions: DecisionsBySlide,
}

/// Whether a fetched result was applied to the session
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The session no longer addresses the sermon the result belongs to
    Discarded,
}

#[derive(Debug, Default)]
pub struct ReviewSession {
    sermon_id: Option<String>,
    slides: Vec<Slide>,
    analysis: AnalysisBySlide,
    decisions: DecisionsBySlide,
    /// Slide ids with decisions changed since the last load or save
    unsaved: HashSet<String>,
    selected: Option<u32>,
    loaded: bool,
    notifier: ChangeNotifier,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the session at a sermon, discarding all state from the previous one
    pub fn open(&mut self, sermon_id: &str) {
        self.clear();
        self.sermon_id = Some(sermon_id.to_string());
        info!("Opened review session for sermon {}", sermon_id);
        self.notifier.notify(ChangeKind::Reset);
    }

    /// Leave the current sermon; nothing is retained
    pub fn reset(&mut self) {
        self.clear();
        self.sermon_id = None;
        self.notifier.notify(ChangeKind::Reset);
    }

    fn clear(&mut self) {
        self.slides.clear();
        self.analysis.clear();
        self.decisions.clear();
        self.unsaved.clear();
        self.selected = None;
        self.loaded = false;
    }

    pub fn sermon_id(&self) -> Option<&str> {
        self.sermon_id.as_deref()
    }

    /// Whether results for `sermon_id` may be applied
    pub fn addresses(&self, sermon_id: &str) -> bool {
        self.sermon_id.as_deref() == Some(sermon_id)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Install freshly fetched review data.
    ///
    /// Decisions for slides with unsaved changes are kept from memory so a
    /// reload never drops in-progress work. The selection survives if the
    /// slide still exists, otherwise it moves to the first slide.
    pub fn apply_review_data(&mut self, data: ReviewData) -> ApplyOutcome {
        if !self.addresses(&data.sermon_id) {
            warn!(
                "Discarding review data for sermon {}; session is on {:?}",
                data.sermon_id, self.sermon_id
            );
            return ApplyOutcome::Discarded;
        }

        let ReviewData {
            mut slides,
            analysis,
            mut decisions,
            ..
        } = data;
        slides.sort_by_key(|s| s.slide_number);

        for slide_id in &self.unsaved {
            let local = self.decisions.remove(slide_id).unwrap_or_default();
            decisions.insert(slide_id.clone(), local);
        }

        debug!(
            "Loaded {} slides, {} analyzed, {} with decisions",
            slides.len(),
            analysis.len(),
            decisions.len()
        );

        self.slides = slides;
        self.analysis = analysis;
        self.decisions = decisions;
        self.unsaved.retain(|id| self.slides.iter().any(|s| &s.slide_id == id));
        self.selected = match self.selected {
            Some(n) if self.slide_by_number(n).is_some() => Some(n),
            _ => self.slides.first().map(|s| s.slide_number),
        };
        self.loaded = true;
        self.notifier.notify(ChangeKind::Loaded);
        ApplyOutcome::Applied
    }

    /// Replace one slide's suggestion set with a fresh analysis result.
    ///
    /// Decisions for that slide are left as they are, including ones keyed
    /// to suggestions the new set no longer contains.
    pub fn apply_analysis(&mut self, sermon_id: &str, analysis: SlideAnalysis) -> ApplyOutcome {
        if !self.addresses(sermon_id) {
            warn!(
                "Discarding analysis of slide {} for sermon {}",
                analysis.slide_number, sermon_id
            );
            return ApplyOutcome::Discarded;
        }

        debug!(
            "Slide {} analyzed: {} suggestion(s)",
            analysis.slide_id,
            analysis.suggestions.len()
        );
        self.analysis.insert(analysis.slide_id, analysis.suggestions);
        self.notifier.notify(ChangeKind::Analysis);
        ApplyOutcome::Applied
    }

    /// Record a reviewer action on a suggestion of the given slide
    pub fn decide(
        &mut self,
        slide_number: u32,
        suggestion_id: &str,
        action: DecisionAction,
    ) -> Result<&Decision> {
        let slide_id = self.require_slide(slide_number)?.slide_id.clone();
        let proposed = self
            .analysis
            .get(&slide_id)
            .and_then(|list| list.iter().find(|s| s.id == suggestion_id))
            .map(|s| s.proposed.clone())
            .ok_or_else(|| Error::SuggestionNotFound {
                slide_id: slide_id.clone(),
                suggestion_id: suggestion_id.to_string(),
            })?;

        let mut updated = self
            .decisions
            .get(&slide_id)
            .and_then(|m| m.get(suggestion_id))
            .cloned()
            .unwrap_or_default();
        updated.apply(action, suggestion_id, &proposed)?;

        self.unsaved.insert(slide_id.clone());
        self.notifier.notify(ChangeKind::Decision);

        let map = self.decisions.entry(slide_id).or_default();
        let slot = map.entry(suggestion_id.to_string()).or_default();
        *slot = updated;
        Ok(&*slot)
    }

    /// Save body for a slide: every held decision except undecided ones
    pub fn decision_payload(&self, slide_number: u32) -> Result<SaveDecisionsPayload> {
        let slide = self.require_slide(slide_number)?;
        let decisions = self
            .decisions
            .get(&slide.slide_id)
            .map(|map| {
                map.iter()
                    .filter_map(|(id, decision)| decision.to_entry(id))
                    .collect()
            })
            .unwrap_or_default();
        Ok(SaveDecisionsPayload { decisions })
    }

    /// Mark a slide's decisions as persisted
    pub fn mark_saved(&mut self, sermon_id: &str, slide_number: u32) -> ApplyOutcome {
        if !self.addresses(sermon_id) {
            return ApplyOutcome::Discarded;
        }
        if let Some(slide) = self.slide_by_number(slide_number) {
            let slide_id = slide.slide_id.clone();
            self.unsaved.remove(&slide_id);
        }
        self.notifier.notify(ChangeKind::Saved);
        ApplyOutcome::Applied
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.unsaved.is_empty()
    }

    /// Numbers of slides holding unsaved decisions, ascending
    pub fn unsaved_slides(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .slides
            .iter()
            .filter(|s| self.unsaved.contains(&s.slide_id))
            .map(|s| s.slide_number)
            .collect();
        numbers.sort_unstable();
        numbers
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide_by_number(&self, slide_number: u32) -> Option<&Slide> {
        self.slides.iter().find(|s| s.slide_number == slide_number)
    }

    fn require_slide(&self, slide_number: u32) -> Result<&Slide> {
        if self.sermon_id.is_none() {
            return Err(Error::NoSermonSelected);
        }
        self.slide_by_number(slide_number)
            .ok_or(Error::SlideNotFound(slide_number))
    }

    pub fn selected_number(&self) -> Option<u32> {
        self.selected
    }

    /// "Slide N of M", or "Slide - of M" with nothing selected
    pub fn counter_label(&self) -> String {
        match self.selected {
            Some(n) => format!("Slide {} of {}", n, self.slides.len()),
            None => format!("Slide - of {}", self.slides.len()),
        }
    }

    pub(crate) fn set_selected(&mut self, slide_number: u32) {
        if self.selected != Some(slide_number) {
            self.selected = Some(slide_number);
            self.notifier.notify(ChangeKind::Selection);
        }
    }

    pub fn selected_slide(&self) -> Option<&Slide> {
        self.selected.and_then(|n| self.slide_by_number(n))
    }

    /// Decision map held for a slide id, if any
    pub fn decisions_for(&self, slide_id: &str) -> Option<&DecisionMap> {
        self.decisions.get(slide_id)
    }

    /// Merged view of a slide
    pub fn aggregate(&self, slide_number: u32) -> Option<SlideAggregate<'_>> {
        self.slide_by_number(slide_number)
            .map(|slide| aggregate(slide, &self.analysis, &self.decisions))
    }

    /// Merged view of the selected slide
    pub fn current(&self) -> Option<SlideAggregate<'_>> {
        self.selected.and_then(|n| self.aggregate(n))
    }

    /// Merged views of every slide in display order
    pub fn aggregates(&self) -> Vec<SlideAggregate<'_>> {
        self.slides
            .iter()
            .map(|slide| aggregate(slide, &self.analysis, &self.decisions))
            .collect()
    }

    pub fn subscribe(&self) -> watch::Receiver<StateChange> {
        self.notifier.subscribe()
    }

    pub fn revision(&self) -> u64 {
        self.notifier.revision()
    }
}
