//! In-memory review service used by tests
//!
//! Mirrors the service's storage rules: analysis and decisions are replaced
//! per slide, and generation reads only what has been persisted.

use super::ReviewBackend;
use crate::error::{Error, Result};
use crate::models::{
    AnalysisDocument, DecisionEntry, DecisionsDocument, GenerateReceipt, SaveDecisionsPayload,
    Sermon, SermonStatus, SermonUpload, Slide, SlideAnalysis, SlideDecisions, Suggestion,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    sermons: Vec<Sermon>,
    slides: HashMap<String, Vec<Slide>>,
    analysis: HashMap<String, AnalysisDocument>,
    decisions: HashMap<String, DecisionsDocument>,
    analysis_results: HashMap<(String, u32), Vec<Suggestion>>,
    last_payload: Option<SaveDecisionsPayload>,
    generated: HashMap<String, Vec<DecisionEntry>>,
    fail_decisions_fetch: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub(crate) fn with_sermon(sermon_id: &str, slide_count: u32) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.lock();
            state.sermons.push(Sermon {
                id: sermon_id.to_string(),
                sermon_name: format!("Sermon {}", sermon_id),
                series_name: None,
                week_or_date: None,
                pastor_name: None,
                status: SermonStatus::Ready,
                file_path: None,
                original_filename: None,
                created_at: None,
            });
            let slides = (1..=slide_count)
                .map(|n| Slide {
                    slide_id: format!("{}:{}", sermon_id, n),
                    slide_number: n,
                    original_text: format!("Slide {} text", n),
                })
                .collect();
            state.slides.insert(sermon_id.to_string(), slides);
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    /// Suggestions the next analysis of this slide will produce
    pub(crate) fn set_analysis_result(&self, sermon_id: &str, slide_number: u32, suggestions: Vec<Suggestion>) {
        self.lock()
            .analysis_results
            .insert((sermon_id.to_string(), slide_number), suggestions);
    }

    pub(crate) fn fail_decisions_fetch(&self, fail: bool) {
        self.lock().fail_decisions_fetch = fail;
    }

    pub(crate) fn last_payload(&self) -> Option<SaveDecisionsPayload> {
        self.lock().last_payload.clone()
    }

    pub(crate) fn persisted_decisions(&self, sermon_id: &str) -> DecisionsDocument {
        self.lock()
            .decisions
            .get(sermon_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Decisions the most recent generation of a sermon was built from
    pub(crate) fn last_generated_from(&self, sermon_id: &str) -> Option<Vec<DecisionEntry>> {
        self.lock().generated.get(sermon_id).cloned()
    }

    fn slide(state: &MemoryState, sermon_id: &str, slide_number: u32) -> Result<Slide> {
        state
            .slides
            .get(sermon_id)
            .and_then(|slides| slides.iter().find(|s| s.slide_number == slide_number))
            .cloned()
            .ok_or_else(|| Error::from_response(404, r#"{"detail":"Not found"}"#))
    }

    fn ensure_sermon(state: &MemoryState, sermon_id: &str) -> Result<()> {
        if state.slides.contains_key(sermon_id) {
            Ok(())
        } else {
            Err(Error::from_response(404, r#"{"detail":"Not found"}"#))
        }
    }
}

#[async_trait]
impl ReviewBackend for MemoryBackend {
    async fn list_sermons(&self) -> Result<Vec<Sermon>> {
        Ok(self.lock().sermons.clone())
    }

    async fn upload_sermon(&self, upload: &SermonUpload) -> Result<Sermon> {
        let mut state = self.lock();
        let sermon = Sermon {
            id: format!("sermon-{}", state.sermons.len() + 1),
            sermon_name: upload.sermon_name.clone(),
            series_name: upload.series_name.clone(),
            week_or_date: upload.week_or_date.clone(),
            pastor_name: upload.pastor_name.clone(),
            status: SermonStatus::Uploaded,
            file_path: None,
            original_filename: None,
            created_at: None,
        };
        state.sermons.push(sermon.clone());
        state.slides.insert(sermon.id.clone(), Vec::new());
        Ok(sermon)
    }

    async fn list_slides(&self, sermon_id: &str) -> Result<Vec<Slide>> {
        let state = self.lock();
        Self::ensure_sermon(&state, sermon_id)?;
        Ok(state.slides[sermon_id].clone())
    }

    async fn get_analysis(&self, sermon_id: &str) -> Result<AnalysisDocument> {
        let state = self.lock();
        Self::ensure_sermon(&state, sermon_id)?;
        Ok(state.analysis.get(sermon_id).cloned().unwrap_or_default())
    }

    async fn get_decisions(&self, sermon_id: &str) -> Result<DecisionsDocument> {
        let state = self.lock();
        if state.fail_decisions_fetch {
            return Err(Error::from_response(500, "Internal Server Error"));
        }
        Self::ensure_sermon(&state, sermon_id)?;
        Ok(state.decisions.get(sermon_id).cloned().unwrap_or_default())
    }

    async fn analyze_slide(&self, sermon_id: &str, slide_number: u32) -> Result<SlideAnalysis> {
        let mut state = self.lock();
        let slide = Self::slide(&state, sermon_id, slide_number)?;
        let suggestions = state
            .analysis_results
            .get(&(sermon_id.to_string(), slide_number))
            .cloned()
            .unwrap_or_default();
        let analysis = SlideAnalysis {
            slide_id: slide.slide_id,
            slide_number,
            original_text: slide.original_text,
            suggestions,
        };

        let doc = state.analysis.entry(sermon_id.to_string()).or_default();
        doc.sermon_id = sermon_id.to_string();
        doc.slides.retain(|s| s.slide_id != analysis.slide_id);
        doc.slides.push(analysis.clone());
        Ok(analysis)
    }

    async fn save_decisions(
        &self,
        sermon_id: &str,
        slide_number: u32,
        payload: &SaveDecisionsPayload,
    ) -> Result<SlideDecisions> {
        let mut state = self.lock();
        let slide = Self::slide(&state, sermon_id, slide_number)?;
        let saved = SlideDecisions {
            slide_id: slide.slide_id,
            slide_number,
            decisions: payload.decisions.clone(),
        };

        state.last_payload = Some(payload.clone());
        let doc = state.decisions.entry(sermon_id.to_string()).or_default();
        doc.sermon_id = sermon_id.to_string();
        match doc.slides.iter_mut().find(|s| s.slide_id == saved.slide_id) {
            Some(existing) => *existing = saved.clone(),
            None => doc.slides.push(saved.clone()),
        }
        Ok(saved)
    }

    async fn generate_output(&self, sermon_id: &str) -> Result<GenerateReceipt> {
        let mut state = self.lock();
        Self::ensure_sermon(&state, sermon_id)?;
        let used: Vec<DecisionEntry> = state
            .decisions
            .get(sermon_id)
            .map(|doc| doc.slides.iter().flat_map(|s| s.decisions.clone()).collect())
            .unwrap_or_default();
        state.generated.insert(sermon_id.to_string(), used);
        Ok(GenerateReceipt {
            status: "ready".to_string(),
        })
    }

    async fn download_output(&self, sermon_id: &str) -> Result<Vec<u8>> {
        let state = self.lock();
        if state.generated.contains_key(sermon_id) {
            Ok(b"PK-updated".to_vec())
        } else {
            Err(Error::from_response(404, r#"{"detail":"Not found"}"#))
        }
    }
}
