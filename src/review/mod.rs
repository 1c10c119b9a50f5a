//! Review decision state engine
//!
//! This module provides:
//! - The per-suggestion decision lifecycle
//! - Merging slides, analysis and decisions into per-slide views
//! - The review session store with stale-result guarding
//! - Slide navigation
//! - State-change notification for observers

pub mod aggregate;
pub mod decision;
pub mod events;
pub mod navigation;
pub mod session;

pub use aggregate::*;
pub use decision::*;
pub use events::*;
pub use navigation::*;
pub use session::{ApplyOutcome, ReviewData, ReviewSession};
