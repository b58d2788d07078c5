//! Scroll-completion gate for the service agreement.
//!
//! Three detectors race to flip one flag: debounced scroll position checks,
//! a sentinel observed at the end of the document, and a fallback timer.
//! Whichever fires first wins; later hits are no-ops.

/// Slack (in CSS pixels) allowed between the viewport bottom and the content end.
pub const BOTTOM_THRESHOLD: f64 = 100.0;
/// Share of the sentinel that must be visible before it counts.
pub const SENTINEL_RATIO: f64 = 0.8;
pub const SCROLL_DEBOUNCE_MS: u32 = 100;
pub const FALLBACK_UNLOCK_MS: u32 = 30_000;
pub const SCROLL_RESET_DELAY_MS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateConfig {
    pub bottom_threshold: f64,
    pub sentinel_ratio: f64,
    pub scroll_debounce_ms: u32,
    pub fallback_unlock_ms: u32,
    pub scroll_reset_delay_ms: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            bottom_threshold: BOTTOM_THRESHOLD,
            sentinel_ratio: SENTINEL_RATIO,
            scroll_debounce_ms: SCROLL_DEBOUNCE_MS,
            fallback_unlock_ms: FALLBACK_UNLOCK_MS,
            scroll_reset_delay_ms: SCROLL_RESET_DELAY_MS,
        }
    }
}

/// Snapshot of the scroll container, read straight off the element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollGeometry {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollGeometry {
    pub fn is_at_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - threshold
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detector {
    ScrollPosition,
    Sentinel,
    Fallback,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollGate {
    unlocked_by: Option<Detector>,
}

impl ScrollGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reviewed(&self) -> bool {
        self.unlocked_by.is_some()
    }

    pub fn unlocked_by(&self) -> Option<Detector> {
        self.unlocked_by
    }

    /// Returns true only for the hit that actually flips the flag.
    pub fn mark(&mut self, detector: Detector) -> bool {
        if self.unlocked_by.is_some() {
            return false;
        }
        self.unlocked_by = Some(detector);
        true
    }

    /// Only called when a new agreement session starts.
    pub fn reset(&mut self) {
        self.unlocked_by = None;
    }

    pub fn accept_label(&self) -> &'static str {
        if self.is_reviewed() {
            "✅ Accept Agreement & Continue"
        } else {
            "Scroll to Review All Terms"
        }
    }

    pub fn progress_caption(&self) -> &'static str {
        if self.is_reviewed() {
            "All terms reviewed"
        } else {
            "Scroll to review all terms"
        }
    }

    pub fn progress_status(&self) -> &'static str {
        if self.is_reviewed() {
            "✓ Ready to Accept"
        } else {
            "Scroll to Continue"
        }
    }

    pub fn footnote(&self) -> &'static str {
        if self.is_reviewed() {
            "By clicking \"Accept\", you acknowledge reading and understanding all terms and agree to be legally bound"
        } else {
            "Please scroll through all terms before accepting"
        }
    }

    pub fn mobile_tip(&self) -> Option<&'static str> {
        (!self.is_reviewed()).then_some("💡 Tip: Swipe up to scroll through all terms")
    }
}
