//! Slide selection over a review session
//!
//! Out-of-range requests are ignored rather than reported; callers are
//! expected to disable the corresponding controls at the bounds.

use super::aggregate::SlideAggregate;
use super::session::ReviewSession;

pub struct Navigator<'a> {
    session: &'a mut ReviewSession,
}

impl<'a> Navigator<'a> {
    pub fn new(session: &'a mut ReviewSession) -> Self {
        Self { session }
    }

    /// Select slide `number` if `1 <= number <= slide count`.
    ///
    /// Returns whether the selection is now `number`.
    pub fn select_slide(&mut self, number: u32) -> bool {
        let count = self.session.slide_count() as u32;
        if number < 1 || number > count {
            return false;
        }
        self.session.set_selected(number);
        true
    }

    /// Move to the following slide; no-op on the last one
    pub fn next(&mut self) -> bool {
        match self.session.selected_number() {
            Some(n) if self.has_next() => self.select_slide(n + 1),
            _ => false,
        }
    }

    /// Move to the preceding slide; no-op on the first one
    pub fn previous(&mut self) -> bool {
        match self.session.selected_number() {
            Some(n) if self.has_previous() => self.select_slide(n - 1),
            _ => false,
        }
    }

    pub fn has_next(&self) -> bool {
        self.session
            .selected_number()
            .map(|n| (n as usize) < self.session.slide_count())
            .unwrap_or(false)
    }

    pub fn has_previous(&self) -> bool {
        self.session.selected_number().map(|n| n > 1).unwrap_or(false)
    }

    pub fn current(&self) -> Option<SlideAggregate<'_>> {
        self.session.current()
    }

    pub fn counter_label(&self) -> String {
        self.session.counter_label()
    }
}
