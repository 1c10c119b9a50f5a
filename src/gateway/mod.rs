//! Sync gateway between the review session and the review service
//!
//! This module provides:
//! - A trait for the persistence service boundary
//! - An HTTP implementation of that boundary
//! - `SyncGateway`, which orchestrates fetches and shapes payloads
//!
//! Nothing here retries on its own. Every failure is returned to the caller,
//! and repeating the reviewer action is the retry.

mod http;
#[cfg(test)]
pub(crate) mod memory;

pub use http::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    AnalysisDocument, DecisionsDocument, GenerateReceipt, SaveDecisionsPayload, Sermon,
    SermonUpload, Slide, SlideAnalysis, SlideDecisions,
};
use crate::review::{index_analysis, index_decisions, ApplyOutcome, ReviewData, ReviewSession};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Logical operations offered by the review service
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    async fn list_sermons(&self) -> Result<Vec<Sermon>>;

    async fn upload_sermon(&self, upload: &SermonUpload) -> Result<Sermon>;

    async fn list_slides(&self, sermon_id: &str) -> Result<Vec<Slide>>;

    async fn get_analysis(&self, sermon_id: &str) -> Result<AnalysisDocument>;

    async fn get_decisions(&self, sermon_id: &str) -> Result<DecisionsDocument>;

    /// Analyze one slide; the result replaces any earlier analysis of it
    async fn analyze_slide(&self, sermon_id: &str, slide_number: u32) -> Result<SlideAnalysis>;

    /// Replace the stored decisions of one slide
    async fn save_decisions(
        &self,
        sermon_id: &str,
        slide_number: u32,
        payload: &SaveDecisionsPayload,
    ) -> Result<SlideDecisions>;

    /// Regenerate the presentation from persisted decisions
    async fn generate_output(&self, sermon_id: &str) -> Result<GenerateReceipt>;

    /// Fetch the regenerated presentation
    async fn download_output(&self, sermon_id: &str) -> Result<Vec<u8>>;
}

/// Create a backend based on configuration
pub fn create_backend(config: &Config) -> Result<Box<dyn ReviewBackend>> {
    let backend = HttpBackend::new(config)?;
    Ok(Box::new(backend))
}

pub struct SyncGateway {
    backend: Box<dyn ReviewBackend>,
}

impl SyncGateway {
    pub fn new(backend: Box<dyn ReviewBackend>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(create_backend(config)?))
    }

    pub async fn fetch_sermons(&self) -> Result<Vec<Sermon>> {
        debug!("Fetching sermons");
        self.backend.list_sermons().await
    }

    pub async fn upload_sermon(&self, upload: &SermonUpload) -> Result<Sermon> {
        upload.validate()?;
        info!("Uploading {}", upload.file.display());
        self.backend.upload_sermon(upload).await
    }

    /// Fetch slides, analysis and decisions concurrently.
    ///
    /// Fails as a whole if any of the three requests fails.
    pub async fn fetch_review_data(&self, sermon_id: &str) -> Result<ReviewData> {
        debug!("Fetching review data for sermon {}", sermon_id);
        let (slides, analysis, decisions) = tokio::try_join!(
            self.backend.list_slides(sermon_id),
            self.backend.get_analysis(sermon_id),
            self.backend.get_decisions(sermon_id),
        )?;

        Ok(ReviewData {
            sermon_id: sermon_id.to_string(),
            slides,
            analysis: index_analysis(analysis),
            decisions: index_decisions(decisions),
        })
    }

    /// Open (or refresh) `sermon_id` in the session.
    ///
    /// On failure the session keeps whatever it held before the fetch.
    pub async fn load_review(
        &self,
        session: &mut ReviewSession,
        sermon_id: &str,
    ) -> Result<ApplyOutcome> {
        if !session.addresses(sermon_id) {
            session.open(sermon_id);
        }
        let data = self.fetch_review_data(sermon_id).await?;
        Ok(session.apply_review_data(data))
    }

    /// Run analysis on one slide and return its new suggestion set.
    ///
    /// The caller applies the result with `ReviewSession::apply_analysis`.
    pub async fn analyze_slide(&self, sermon_id: &str, slide_number: u32) -> Result<SlideAnalysis> {
        if slide_number < 1 {
            return Err(Error::SlideNotFound(slide_number));
        }
        info!("Analyzing slide {} of sermon {}", slide_number, sermon_id);
        self.backend.analyze_slide(sermon_id, slide_number).await
    }

    /// Submit the held decisions of one slide, replacing what is stored.
    ///
    /// Undecided entries are never sent. On success the caller marks the
    /// slide saved with `ReviewSession::mark_saved`.
    pub async fn save_decisions(
        &self,
        session: &ReviewSession,
        slide_number: u32,
    ) -> Result<SlideDecisions> {
        let sermon_id = session.sermon_id().ok_or(Error::NoSermonSelected)?;
        let payload = session.decision_payload(slide_number)?;
        info!(
            "Saving {} decision(s) for slide {} of sermon {}",
            payload.decisions.len(),
            slide_number,
            sermon_id
        );
        self.backend
            .save_decisions(sermon_id, slide_number, &payload)
            .await
    }

    /// Regenerate the presentation from persisted decisions only.
    ///
    /// Unsaved in-memory decisions are not included.
    pub async fn generate_output(&self, sermon_id: &str) -> Result<GenerateReceipt> {
        info!("Generating updated presentation for sermon {}", sermon_id);
        self.backend.generate_output(sermon_id).await
    }

    /// Download the regenerated presentation into `dir`
    pub async fn download_output(&self, sermon_id: &str, dir: &Path) -> Result<PathBuf> {
        let bytes = self.backend.download_output(sermon_id).await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}-updated.pptx", sermon_id));
        tokio::fs::write(&path, &bytes).await?;
        info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryBackend;
    use super::*;
    use crate::models::{DecisionEntry, DecisionKind, Suggestion};
    use crate::review::{DecisionAction, Navigator};

    fn suggestion(id: &str, proposed: &str) -> Suggestion {
        Suggestion {
            id: id.to_string(),
            category: "grammar".to_string(),
            original: "Fixd text".to_string(),
            proposed: proposed.to_string(),
            explanation: None,
            confidence: None,
        }
    }

    fn gateway_for(backend: &MemoryBackend) -> SyncGateway {
        SyncGateway::new(Box::new(backend.clone()))
    }

    #[tokio::test]
    async fn test_analyze_accept_save_scenario() {
        let backend = MemoryBackend::with_sermon("abc", 3);
        backend.set_analysis_result("abc", 2, vec![suggestion("s1", "Fixed text")]);
        let gateway = gateway_for(&backend);

        let mut session = ReviewSession::new();
        let outcome = gateway.load_review(&mut session, "abc").await.unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert!(Navigator::new(&mut session).select_slide(2));

        let analysis = gateway.analyze_slide("abc", 2).await.unwrap();
        assert_eq!(session.apply_analysis("abc", analysis), ApplyOutcome::Applied);

        let current = session.current().unwrap();
        assert_eq!(current.suggestions.len(), 1);
        assert!(!current.suggestions[0].is_decided());

        session.decide(2, "s1", DecisionAction::Accept).unwrap();
        gateway.save_decisions(&session, 2).await.unwrap();

        let sent = backend.last_payload().unwrap();
        assert_eq!(
            serde_json::to_value(&sent).unwrap(),
            serde_json::json!({
                "decisions": [{"suggestionId": "s1", "decision": "accepted", "finalText": null}]
            })
        );
    }

    #[tokio::test]
    async fn test_saved_decisions_round_trip() {
        let backend = MemoryBackend::with_sermon("abc", 1);
        backend.set_analysis_result(
            "abc",
            1,
            vec![
                suggestion("a", "A"),
                suggestion("r", "R"),
                suggestion("e", "E"),
            ],
        );
        let gateway = gateway_for(&backend);

        let mut session = ReviewSession::new();
        let _ = gateway.load_review(&mut session, "abc").await.unwrap();
        let analysis = gateway.analyze_slide("abc", 1).await.unwrap();
        let _ = session.apply_analysis("abc", analysis);

        session.decide(1, "a", DecisionAction::Accept).unwrap();
        session.decide(1, "r", DecisionAction::Reject).unwrap();
        session.decide(1, "e", DecisionAction::Edit(None)).unwrap();
        session
            .decide(1, "e", DecisionAction::SetText("X".into()))
            .unwrap();
        gateway.save_decisions(&session, 1).await.unwrap();
        let _ = session.mark_saved("abc", 1);

        let data = gateway.fetch_review_data("abc").await.unwrap();
        let held = &data.decisions["abc:1"];
        assert_eq!(held.len(), 3);
        assert_eq!(held["a"].decision, Some(DecisionKind::Accepted));
        assert_eq!(held["r"].decision, Some(DecisionKind::Rejected));
        assert_eq!(held["e"].decision, Some(DecisionKind::Edited));
        assert_eq!(held["e"].final_text, "X");

        let mut fresh = ReviewSession::new();
        let _ = gateway.load_review(&mut fresh, "abc").await.unwrap();
        assert_eq!(
            fresh.decision_payload(1).unwrap(),
            session.decision_payload(1).unwrap()
        );
    }

    #[tokio::test]
    async fn test_saving_twice_is_idempotent() {
        let backend = MemoryBackend::with_sermon("abc", 2);
        backend.set_analysis_result("abc", 2, vec![suggestion("s1", "Fixed text")]);
        let gateway = gateway_for(&backend);

        let mut session = ReviewSession::new();
        let _ = gateway.load_review(&mut session, "abc").await.unwrap();
        let analysis = gateway.analyze_slide("abc", 2).await.unwrap();
        let _ = session.apply_analysis("abc", analysis);
        session.decide(2, "s1", DecisionAction::Reject).unwrap();

        gateway.save_decisions(&session, 2).await.unwrap();
        let once = backend.persisted_decisions("abc");
        gateway.save_decisions(&session, 2).await.unwrap();
        let twice = backend.persisted_decisions("abc");

        assert_eq!(once, twice);
        assert_eq!(twice.slides.len(), 1);
        assert_eq!(twice.slides[0].decisions.len(), 1);
    }

    #[tokio::test]
    async fn test_save_only_touches_requested_slide() {
        let backend = MemoryBackend::with_sermon("abc", 2);
        backend.set_analysis_result("abc", 1, vec![suggestion("a", "A")]);
        backend.set_analysis_result("abc", 2, vec![suggestion("b", "B")]);
        let gateway = gateway_for(&backend);

        let mut session = ReviewSession::new();
        let _ = gateway.load_review(&mut session, "abc").await.unwrap();
        for n in 1..=2 {
            let analysis = gateway.analyze_slide("abc", n).await.unwrap();
            let _ = session.apply_analysis("abc", analysis);
        }
        session.decide(1, "a", DecisionAction::Accept).unwrap();
        session.decide(2, "b", DecisionAction::Accept).unwrap();

        gateway.save_decisions(&session, 2).await.unwrap();
        let persisted = backend.persisted_decisions("abc");
        assert_eq!(persisted.slides.len(), 1);
        assert_eq!(persisted.slides[0].slide_id, "abc:2");
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_session_untouched() {
        let backend = MemoryBackend::with_sermon("abc", 3);
        let gateway = gateway_for(&backend);

        let mut session = ReviewSession::new();
        let _ = gateway.load_review(&mut session, "abc").await.unwrap();
        Navigator::new(&mut session).select_slide(3);
        let revision = session.revision();

        backend.fail_decisions_fetch(true);
        let err = gateway.load_review(&mut session, "abc").await.unwrap_err();
        assert!(err.is_remote());
        assert_eq!(session.slide_count(), 3);
        assert_eq!(session.selected_number(), Some(3));
        assert_eq!(session.revision(), revision);
    }

    #[tokio::test]
    async fn test_generate_uses_persisted_decisions_only() {
        let backend = MemoryBackend::with_sermon("abc", 1);
        backend.set_analysis_result("abc", 1, vec![suggestion("s1", "Fixed text")]);
        let gateway = gateway_for(&backend);

        let mut session = ReviewSession::new();
        let _ = gateway.load_review(&mut session, "abc").await.unwrap();
        let analysis = gateway.analyze_slide("abc", 1).await.unwrap();
        let _ = session.apply_analysis("abc", analysis);
        session.decide(1, "s1", DecisionAction::Accept).unwrap();

        gateway.generate_output("abc").await.unwrap();
        assert_eq!(backend.last_generated_from("abc"), Some(Vec::new()));

        gateway.save_decisions(&session, 1).await.unwrap();
        gateway.generate_output("abc").await.unwrap();
        assert_eq!(
            backend.last_generated_from("abc"),
            Some(vec![DecisionEntry {
                suggestion_id: "s1".into(),
                decision: DecisionKind::Accepted,
                final_text: None,
            }])
        );
    }

    #[tokio::test]
    async fn test_save_without_sermon() {
        let backend = MemoryBackend::default();
        let gateway = gateway_for(&backend);
        let session = ReviewSession::new();
        assert!(matches!(
            gateway.save_decisions(&session, 1).await,
            Err(Error::NoSermonSelected)
        ));
        assert!(backend.last_payload().is_none());
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pptx_before_sending() {
        let backend = MemoryBackend::default();
        let gateway = gateway_for(&backend);
        let upload = SermonUpload {
            sermon_name: "Hope".into(),
            series_name: None,
            week_or_date: None,
            pastor_name: None,
            file: PathBuf::from("notes.pdf"),
        };
        assert!(matches!(
            gateway.upload_sermon(&upload).await,
            Err(Error::UnsupportedFile(_))
        ));
        assert!(gateway.fetch_sermons().await.unwrap().is_empty());
    }
}
