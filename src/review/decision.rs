//! Per-suggestion decision lifecycle
//!
//! A decision starts undecided and moves to accepted, rejected or edited.
//! Decided states move freely between each other but never back to
//! undecided. Typing replacement text is only possible while edited.

use crate::error::{Error, Result};
use crate::models::{DecisionEntry, DecisionKind};

/// Reviewer verdict held in memory for one suggestion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    /// `None` means no decision yet; such records are never persisted
    pub decision: Option<DecisionKind>,
    /// Replacement text, only meaningful while `decision` is `Edited`
    pub final_text: String,
}

/// A reviewer action on a suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionAction {
    Accept,
    Reject,
    /// Enter (or stay in) the edited state, optionally with text
    Edit(Option<String>),
    /// Overwrite the replacement text of an edited suggestion
    SetText(String),
}

impl Decision {
    pub fn is_decided(&self) -> bool {
        self.decision.is_some()
    }

    /// Apply a reviewer action.
    ///
    /// `proposed` is the suggestion's proposed text, used as the default
    /// replacement when entering the edited state without explicit text.
    pub fn apply(&mut self, action: DecisionAction, suggestion_id: &str, proposed: &str) -> Result<()> {
        match action {
            DecisionAction::Accept => {
                self.decision = Some(DecisionKind::Accepted);
                self.final_text.clear();
            }
            DecisionAction::Reject => {
                self.decision = Some(DecisionKind::Rejected);
                self.final_text.clear();
            }
            DecisionAction::Edit(Some(text)) => {
                self.decision = Some(DecisionKind::Edited);
                self.final_text = text;
            }
            DecisionAction::Edit(None) => {
                // Re-entering edit keeps whatever the reviewer already typed
                if self.decision != Some(DecisionKind::Edited) {
                    self.decision = Some(DecisionKind::Edited);
                    self.final_text = proposed.to_string();
                }
            }
            DecisionAction::SetText(text) => {
                if self.decision != Some(DecisionKind::Edited) {
                    return Err(Error::NotEditing(suggestion_id.to_string()));
                }
                self.final_text = text;
            }
        }
        Ok(())
    }

    /// Wire entry for this decision, or `None` while undecided.
    ///
    /// Text is only sent for edited decisions; empty text is sent as null.
    pub fn to_entry(&self, suggestion_id: &str) -> Option<DecisionEntry> {
        let decision = self.decision?;
        let final_text = match decision {
            DecisionKind::Edited if !self.final_text.is_empty() => Some(self.final_text.clone()),
            _ => None,
        };
        Some(DecisionEntry {
            suggestion_id: suggestion_id.to_string(),
            decision,
            final_text,
        })
    }

    pub fn from_entry(entry: &DecisionEntry) -> Self {
        Self {
            decision: Some(entry.decision),
            final_text: entry.final_text.clone().unwrap_or_default(),
        }
    }

    /// Short label used when rendering a suggestion
    pub fn label(&self) -> String {
        match self.decision {
            None => "undecided".to_string(),
            Some(DecisionKind::Edited) => format!("edited → \"{}\"", self.final_text),
            Some(kind) => kind.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undecided_is_not_transmitted() {
        let decision = Decision::default();
        assert!(!decision.is_decided());
        assert_eq!(decision.to_entry("s1"), None);
    }

    #[test]
    fn test_edit_defaults_to_proposed() {
        let mut decision = Decision::default();
        decision
            .apply(DecisionAction::Edit(None), "s1", "Fixed text")
            .unwrap();
        assert_eq!(decision.decision, Some(DecisionKind::Edited));
        assert_eq!(decision.final_text, "Fixed text");
    }

    #[test]
    fn test_set_text_stays_edited() {
        let mut decision = Decision::default();
        decision.apply(DecisionAction::Edit(None), "s1", "Fixed").unwrap();
        decision
            .apply(DecisionAction::SetText("Fixed!".into()), "s1", "Fixed")
            .unwrap();
        assert_eq!(decision.decision, Some(DecisionKind::Edited));
        assert_eq!(decision.final_text, "Fixed!");

        // Re-entering edit does not discard typed text
        decision.apply(DecisionAction::Edit(None), "s1", "Fixed").unwrap();
        assert_eq!(decision.final_text, "Fixed!");
    }

    #[test]
    fn test_set_text_requires_edited() {
        let mut decision = Decision::default();
        let err = decision
            .apply(DecisionAction::SetText("x".into()), "s1", "p")
            .unwrap_err();
        assert!(matches!(err, Error::NotEditing(id) if id == "s1"));
        assert!(!decision.is_decided());

        decision.apply(DecisionAction::Accept, "s1", "p").unwrap();
        assert!(decision
            .apply(DecisionAction::SetText("x".into()), "s1", "p")
            .is_err());
        assert_eq!(decision.decision, Some(DecisionKind::Accepted));
    }

    #[test]
    fn test_decided_states_interchange() {
        let mut decision = Decision::default();
        decision.apply(DecisionAction::Edit(Some("X".into())), "s1", "p").unwrap();
        decision.apply(DecisionAction::Reject, "s1", "p").unwrap();
        assert_eq!(decision.decision, Some(DecisionKind::Rejected));
        assert!(decision.final_text.is_empty());
        decision.apply(DecisionAction::Accept, "s1", "p").unwrap();
        assert_eq!(decision.decision, Some(DecisionKind::Accepted));
    }

    #[test]
    fn test_to_entry_text_rules() {
        let mut decision = Decision::default();
        decision.apply(DecisionAction::Edit(Some("X".into())), "s1", "p").unwrap();
        assert_eq!(
            decision.to_entry("s1").unwrap().final_text,
            Some("X".to_string())
        );

        decision.apply(DecisionAction::SetText(String::new()), "s1", "p").unwrap();
        assert_eq!(decision.to_entry("s1").unwrap().final_text, None);

        decision.apply(DecisionAction::Accept, "s1", "p").unwrap();
        assert_eq!(decision.to_entry("s1").unwrap().final_text, None);
    }

    #[test]
    fn test_from_entry_null_text_is_empty() {
        let entry = DecisionEntry {
            suggestion_id: "s1".into(),
            decision: DecisionKind::Rejected,
            final_text: None,
        };
        let decision = Decision::from_entry(&entry);
        assert_eq!(decision.decision, Some(DecisionKind::Rejected));
        assert_eq!(decision.final_text, "");
    }
}
