//! Simulated host for driving `TermsFlow` in tests.
//!
//! Mirrors what the package card does in the browser: one pending timer per
//! kind (re-scheduling replaces it), gate attachment reported after the
//! current batch of effects, and a simulated millisecond clock.

use std::collections::HashMap;

use super::flow::TransitionError;
use super::gate::{GateConfig, ScrollGeometry};
use super::session::{Effect, TermsFlow, TimerKind, TimerTicket};

pub struct VirtualHost {
    pub flow: TermsFlow,
    pub geometry: Option<ScrollGeometry>,
    pub attached: bool,
    pub scroll_resets: usize,
    pub acceptances_started: Vec<String>,
    now: u64,
    timers: HashMap<TimerKind, (u64, TimerTicket)>,
}

impl VirtualHost {
    pub fn new(package: &str, geometry: Option<ScrollGeometry>) -> Self {
        Self::with_config(package, geometry, GateConfig::default())
    }

    pub fn with_config(package: &str, geometry: Option<ScrollGeometry>, config: GateConfig) -> Self {
        Self {
            flow: TermsFlow::new(package, config),
            geometry,
            attached: false,
            scroll_resets: 0,
            acceptances_started: Vec::new(),
            now: 0,
            timers: HashMap::new(),
        }
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.timers.contains_key(&kind)
    }

    pub fn apply(&mut self, effects: Vec<Effect>) {
        let mut attach = false;
        for effect in effects {
            match effect {
                Effect::Schedule { ticket, delay_ms } => {
                    self.timers
                        .insert(ticket.kind, (self.now + u64::from(delay_ms), ticket));
                }
                Effect::Cancel(kind) => {
                    self.timers.remove(&kind);
                }
                Effect::AttachGate => {
                    self.attached = true;
                    attach = true;
                }
                Effect::DetachGate => {
                    self.attached = false;
                    attach = false;
                }
                Effect::ScrollToTop => {
                    self.scroll_resets += 1;
                    if let Some(geometry) = self.geometry.as_mut() {
                        geometry.scroll_top = 0.0;
                    }
                }
                Effect::BeginAcceptance { package } => self.acceptances_started.push(package),
            }
        }
        if attach {
            let effects = self.flow.gate_attached(self.geometry);
            self.apply(effects);
        }
    }

    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        if let Some(geometry) = self.geometry.as_mut() {
            geometry.scroll_top = scroll_top;
        }
    }

    /// Moves the container and fires a scroll event if the listener is attached.
    pub fn scroll_to(&mut self, scroll_top: f64) {
        self.set_scroll_top(scroll_top);
        if self.attached {
            let effects = self.flow.scrolled();
            self.apply(effects);
        }
    }

    pub fn sentinel(&mut self, ratio: f64) {
        if self.attached {
            let effects = self.flow.sentinel_visible(ratio);
            self.apply(effects);
        }
    }

    /// Advances the clock, firing due timers in deadline order.
    pub fn advance(&mut self, ms: u64) {
        let target = self.now + ms;
        loop {
            let due = self
                .timers
                .iter()
                .filter(|(_, (deadline, _))| *deadline <= target)
                .min_by_key(|(_, (deadline, _))| *deadline)
                .map(|(kind, (deadline, ticket))| (*kind, *deadline, *ticket));
            let Some((kind, deadline, ticket)) = due else {
                break;
            };
            self.timers.remove(&kind);
            self.now = deadline;
            let effects = self.flow.timer_fired(ticket, self.geometry);
            self.apply(effects);
        }
        self.now = target;
    }

    pub fn select(&mut self) {
        let effects = self.flow.select();
        self.apply(effects);
    }

    pub fn accept(&mut self) -> Result<(), TransitionError> {
        let effects = self.flow.accept()?;
        self.apply(effects);
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), TransitionError> {
        let effects = self.flow.back()?;
        self.apply(effects);
        Ok(())
    }

    pub fn close(&mut self) {
        let effects = self.flow.close();
        self.apply(effects);
    }

    pub fn complete(&mut self, acceptance_id: &str) {
        let effects = self.flow.acceptance_completed(acceptance_id);
        self.apply(effects);
    }
}
