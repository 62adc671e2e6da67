//! Exclusive page rendering
//!
//! PDF.js renders into a single canvas, so two renders must never overlap.
//! One render runs at a time and one page may wait behind it; a newer request
//! replaces the waiting page instead of queueing behind it.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderScheduler {
    in_flight: Option<u32>,
    pending: Option<u32>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `page` to be drawn. Returns the page to start now, or `None`
    /// if a render is busy and the page was parked in the pending slot.
    pub fn request(&mut self, page: u32) -> Option<u32> {
        if self.in_flight.is_some() {
            self.pending = Some(page);
            return None;
        }
        self.in_flight = Some(page);
        Some(page)
    }

    /// Mark the in-flight render as settled. Returns the pending page, which
    /// is now in flight, if there was one.
    pub fn finish(&mut self) -> Option<u32> {
        self.in_flight = self.pending.take();
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}
