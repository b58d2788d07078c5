//! Controller for the terms modal of a single package card.
//!
//! `TermsFlow` never touches the DOM or the clock. Every input returns the
//! effects the host has to carry out: timers, listeners and scrolling.

use log::{debug, info};

use super::flow::{FlowAction, FlowStep, TransitionError};
use super::gate::{Detector, GateConfig, ScrollGate, ScrollGeometry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    ScrollCheck,
    Fallback,
    ScrollReset,
}

/// Identifies one scheduled timer. Tickets from a view that has since been
/// left, or scroll checks superseded by a later scroll, are ignored on fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerTicket {
    pub kind: TimerKind,
    epoch: u32,
    seq: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Start a timer, replacing any pending timer of the same kind.
    Schedule { ticket: TimerTicket, delay_ms: u32 },
    Cancel(TimerKind),
    /// Install the scroll listener and the sentinel observer, then report the
    /// current geometry through `gate_attached`.
    AttachGate,
    DetachGate,
    ScrollToTop,
    /// Hand over to the acceptance collaborator.
    BeginAcceptance { package: String },
}

#[derive(Clone, Debug)]
pub struct TermsFlow {
    package: String,
    config: GateConfig,
    open: bool,
    step: FlowStep,
    gate: ScrollGate,
    epoch: u32,
    scroll_seq: u32,
}

impl TermsFlow {
    pub fn new(package: impl Into<String>, config: GateConfig) -> Self {
        Self {
            package: package.into(),
            config,
            open: false,
            step: FlowStep::ServiceAgreement,
            gate: ScrollGate::new(),
            epoch: 0,
            scroll_seq: 0,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn gate(&self) -> &ScrollGate {
        &self.gate
    }

    pub fn is_reviewed(&self) -> bool {
        self.gate.is_reviewed()
    }

    pub fn accept_enabled(&self) -> bool {
        self.gate_active() && self.gate.is_reviewed()
    }

    fn gate_active(&self) -> bool {
        self.open && self.step == FlowStep::ServiceAgreement
    }

    fn ticket(&self, kind: TimerKind) -> TimerTicket {
        TimerTicket {
            kind,
            epoch: self.epoch,
            seq: self.scroll_seq,
        }
    }

    fn schedule(&self, kind: TimerKind, delay_ms: u32) -> Effect {
        Effect::Schedule {
            ticket: self.ticket(kind),
            delay_ms,
        }
    }

    fn enter_agreement(&mut self, fresh: bool) -> Vec<Effect> {
        self.epoch = self.epoch.wrapping_add(1);
        self.scroll_seq = 0;

        let mut effects = vec![Effect::AttachGate];
        if fresh {
            self.gate.reset();
            effects.push(self.schedule(TimerKind::ScrollReset, self.config.scroll_reset_delay_ms));
        }
        if !self.gate.is_reviewed() {
            effects.push(self.schedule(TimerKind::Fallback, self.config.fallback_unlock_ms));
        }
        effects
    }

    fn leave_agreement(&mut self) -> Vec<Effect> {
        self.epoch = self.epoch.wrapping_add(1);
        vec![
            Effect::DetachGate,
            Effect::Cancel(TimerKind::ScrollCheck),
            Effect::Cancel(TimerKind::Fallback),
            Effect::Cancel(TimerKind::ScrollReset),
        ]
    }

    fn unlock(&mut self, detector: Detector) -> Vec<Effect> {
        if !self.gate.mark(detector) {
            return Vec::new();
        }
        info!("Terms for {} reviewed ({:?})", self.package, detector);
        vec![Effect::Cancel(TimerKind::Fallback)]
    }

    fn evaluate(&mut self, geometry: ScrollGeometry) -> Vec<Effect> {
        if geometry.is_at_bottom(self.config.bottom_threshold) {
            self.unlock(Detector::ScrollPosition)
        } else {
            Vec::new()
        }
    }

    /// Opens the modal on the service agreement with a fresh review session.
    pub fn select(&mut self) -> Vec<Effect> {
        info!("Package selected: {}", self.package);
        let mut effects = if self.open {
            self.leave_agreement()
        } else {
            Vec::new()
        };
        self.open = true;
        self.step = FlowStep::ServiceAgreement;
        effects.extend(self.enter_agreement(true));
        effects
    }

    /// Initial check once the listeners are in place. `None` means the
    /// container is not mounted; the fallback timer still covers that case.
    pub fn gate_attached(&mut self, geometry: Option<ScrollGeometry>) -> Vec<Effect> {
        if !self.gate_active() {
            return Vec::new();
        }
        match geometry {
            Some(geometry) => self.evaluate(geometry),
            None => {
                debug!("Terms container not mounted, relying on fallback");
                Vec::new()
            }
        }
    }

    pub fn scrolled(&mut self) -> Vec<Effect> {
        if !self.gate_active() || self.gate.is_reviewed() {
            return Vec::new();
        }
        self.scroll_seq = self.scroll_seq.wrapping_add(1);
        vec![self.schedule(TimerKind::ScrollCheck, self.config.scroll_debounce_ms)]
    }

    pub fn sentinel_visible(&mut self, ratio: f64) -> Vec<Effect> {
        if !self.gate_active() || ratio < self.config.sentinel_ratio {
            return Vec::new();
        }
        self.unlock(Detector::Sentinel)
    }

    pub fn timer_fired(&mut self, ticket: TimerTicket, geometry: Option<ScrollGeometry>) -> Vec<Effect> {
        if !self.gate_active() || ticket.epoch != self.epoch {
            debug!("Ignoring stale {:?} timer", ticket.kind);
            return Vec::new();
        }
        match ticket.kind {
            TimerKind::ScrollCheck => {
                if ticket.seq != self.scroll_seq {
                    debug!("Ignoring superseded scroll check");
                    return Vec::new();
                }
                geometry.map(|g| self.evaluate(g)).unwrap_or_default()
            }
            TimerKind::Fallback => self.unlock(Detector::Fallback),
            TimerKind::ScrollReset => vec![Effect::ScrollToTop],
        }
    }

    pub fn accept(&mut self) -> Result<Vec<Effect>, TransitionError> {
        if !self.open {
            return Err(TransitionError::Closed);
        }
        self.step = self.step.apply(FlowAction::Accept, self.gate.is_reviewed())?;
        let mut effects = self.leave_agreement();
        effects.push(Effect::BeginAcceptance {
            package: self.package.clone(),
        });
        Ok(effects)
    }

    /// Returns to the agreement without starting a new review session.
    pub fn back(&mut self) -> Result<Vec<Effect>, TransitionError> {
        if !self.open {
            return Err(TransitionError::Closed);
        }
        self.step = self.step.apply(FlowAction::Back, self.gate.is_reviewed())?;
        Ok(self.enter_agreement(false))
    }

    pub fn close(&mut self) -> Vec<Effect> {
        if !self.open {
            return Vec::new();
        }
        let effects = self.leave_agreement();
        self.open = false;
        self.step = FlowStep::ServiceAgreement;
        effects
    }

    /// Completion signal from the acceptance collaborator. The identifier is
    /// opaque to this controller.
    pub fn acceptance_completed(&mut self, acceptance_id: &str) -> Vec<Effect> {
        info!("Terms for {} accepted with ID: {}", self.package, acceptance_id);
        self.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::testing::VirtualHost;

    fn long_document() -> ScrollGeometry {
        ScrollGeometry {
            scroll_top: 0.0,
            client_height: 600.0,
            scroll_height: 4000.0,
        }
    }

    fn host() -> VirtualHost {
        VirtualHost::new("Growth Partnership", Some(long_document()))
    }

    fn reviewed_host() -> VirtualHost {
        let mut host = host();
        host.select();
        host.sentinel(1.0);
        assert!(host.flow.is_reviewed());
        host
    }

    #[test]
    fn select_starts_clean_session() {
        let mut host = host();
        host.select();

        assert!(host.flow.is_open());
        assert_eq!(host.flow.step(), FlowStep::ServiceAgreement);
        assert!(!host.flow.is_reviewed());
        assert!(!host.flow.accept_enabled());
        assert!(host.attached);
        assert!(host.is_pending(TimerKind::Fallback));
        assert!(host.is_pending(TimerKind::ScrollReset));
    }

    #[test]
    fn scroll_position_resets_to_top_after_delay() {
        let mut host = host();
        host.set_scroll_top(900.0);
        host.select();

        host.advance(99);
        assert_eq!(host.scroll_resets, 0);
        host.advance(1);
        assert_eq!(host.scroll_resets, 1);
        assert_eq!(host.geometry.map(|g| g.scroll_top), Some(0.0));
    }

    #[test]
    fn scroll_to_exact_bottom_unlocks_within_debounce() {
        let mut host = host();
        host.select();
        host.advance(200);

        host.scroll_to(3400.0);
        host.advance(99);
        assert!(!host.flow.is_reviewed());

        host.advance(1);
        assert!(host.flow.is_reviewed());
        assert_eq!(host.flow.gate().unlocked_by(), Some(Detector::ScrollPosition));
        assert!(host.flow.accept_enabled());
        assert_eq!(host.flow.gate().accept_label(), "✅ Accept Agreement & Continue");
        assert!(!host.is_pending(TimerKind::Fallback));
    }

    #[test]
    fn within_threshold_counts_as_bottom() {
        let mut host = host();
        host.select();
        host.advance(200);

        // 3300 + 600 = 3900 = 4000 - 100
        host.scroll_to(3300.0);
        host.advance(100);
        assert!(host.flow.is_reviewed());
    }

    #[test]
    fn only_last_scroll_in_window_is_checked() {
        let mut host = host();
        host.select();
        host.advance(200);

        host.scroll_to(3400.0);
        host.advance(50);
        host.scroll_to(1200.0);
        host.advance(60);
        // the check scheduled for the bottom position was replaced
        assert!(!host.flow.is_reviewed());
        host.advance(40);
        assert!(!host.flow.is_reviewed());
        assert!(!host.is_pending(TimerKind::ScrollCheck));
    }

    #[test]
    fn superseded_scroll_check_is_ignored() {
        let mut flow = TermsFlow::new("Essential Support", GateConfig::default());
        flow.select();

        let first = match flow.scrolled().as_slice() {
            [Effect::Schedule { ticket, .. }] => *ticket,
            other => panic!("unexpected effects: {:?}", other),
        };
        flow.scrolled();

        let bottom = ScrollGeometry {
            scroll_top: 3400.0,
            ..long_document()
        };
        assert!(flow.timer_fired(first, Some(bottom)).is_empty());
        assert!(!flow.is_reviewed());
    }

    #[test]
    fn fallback_unlocks_at_exactly_thirty_seconds() {
        let mut host = host();
        host.select();

        host.advance(29_999);
        assert!(!host.flow.is_reviewed());

        host.advance(1);
        assert!(host.flow.is_reviewed());
        assert_eq!(host.flow.gate().unlocked_by(), Some(Detector::Fallback));
    }

    #[test]
    fn fallback_after_thirty_seconds_without_scrolling() {
        let mut host = host();
        host.select();
        host.advance(30_001);
        assert!(host.flow.is_reviewed());
        assert!(host.flow.accept_enabled());
    }

    #[test]
    fn short_document_unlocks_on_attach() {
        let short = ScrollGeometry {
            scroll_top: 0.0,
            client_height: 600.0,
            scroll_height: 500.0,
        };
        let mut host = VirtualHost::new("Essential Support", Some(short));
        host.select();
        assert!(host.flow.is_reviewed());
        assert_eq!(host.flow.gate().unlocked_by(), Some(Detector::ScrollPosition));
    }

    #[test]
    fn unmounted_container_still_unlocks_by_fallback() {
        let mut host = VirtualHost::new("Essential Support", None);
        host.select();
        host.scroll_to(3400.0);
        host.advance(1_000);
        assert!(!host.flow.is_reviewed());

        host.advance(29_000);
        assert!(host.flow.is_reviewed());
    }

    #[test]
    fn sentinel_needs_enough_visibility() {
        let mut host = host();
        host.select();

        host.sentinel(0.5);
        assert!(!host.flow.is_reviewed());
        host.sentinel(0.8);
        assert!(host.flow.is_reviewed());
        assert_eq!(host.flow.gate().unlocked_by(), Some(Detector::Sentinel));
    }

    #[test]
    fn accept_is_noop_until_reviewed() {
        let mut host = host();
        host.select();

        assert_eq!(host.flow.accept(), Err(TransitionError::NotReviewed));
        assert_eq!(host.flow.step(), FlowStep::ServiceAgreement);
        assert!(host.flow.is_open());
        assert!(host.attached);
    }

    #[test]
    fn accept_moves_to_terms_acceptance() {
        let mut host = reviewed_host();
        host.accept().unwrap();

        assert_eq!(host.flow.step(), FlowStep::TermsAcceptance);
        assert!(host.flow.is_open());
        assert!(!host.attached);
        assert!(!host.is_pending(TimerKind::Fallback));
        assert!(!host.is_pending(TimerKind::ScrollReset));
        assert_eq!(host.acceptances_started, vec!["Growth Partnership".to_string()]);
    }

    #[test]
    fn back_keeps_review_and_modal_open() {
        let mut host = reviewed_host();
        host.accept().unwrap();
        host.back().unwrap();

        assert_eq!(host.flow.step(), FlowStep::ServiceAgreement);
        assert!(host.flow.is_open());
        assert!(host.flow.is_reviewed());
        assert!(host.attached);
        assert!(!host.is_pending(TimerKind::ScrollReset));
        assert!(!host.is_pending(TimerKind::Fallback));
    }

    #[test]
    fn back_only_from_terms_acceptance() {
        let mut host = host();
        host.select();
        assert!(matches!(
            host.flow.back(),
            Err(TransitionError::Invalid { .. })
        ));
    }

    #[test]
    fn review_is_monotonic_within_session() {
        let mut host = reviewed_host();

        host.scroll_to(0.0);
        host.advance(31_000);
        host.sentinel(0.0);
        assert!(host.flow.is_reviewed());

        host.close();
        assert!(host.flow.is_reviewed());

        host.select();
        assert!(!host.flow.is_reviewed());
    }

    #[test]
    fn close_resets_from_any_state() {
        let mut host = host();
        host.select();
        host.close();
        assert!(!host.flow.is_open());
        assert_eq!(host.flow.step(), FlowStep::ServiceAgreement);
        assert!(!host.attached);
        assert!(!host.is_pending(TimerKind::Fallback));

        let mut host = reviewed_host();
        host.accept().unwrap();
        host.close();
        assert!(!host.flow.is_open());
        assert_eq!(host.flow.step(), FlowStep::ServiceAgreement);
    }

    #[test]
    fn nothing_changes_after_close() {
        let mut flow = TermsFlow::new("Essential Support", GateConfig::default());
        let fallback = flow
            .select()
            .into_iter()
            .find_map(|e| match e {
                Effect::Schedule { ticket, .. } if ticket.kind == TimerKind::Fallback => Some(ticket),
                _ => None,
            })
            .unwrap();
        flow.close();

        assert!(flow.timer_fired(fallback, None).is_empty());
        assert!(flow.sentinel_visible(1.0).is_empty());
        assert!(flow.scrolled().is_empty());
        assert!(!flow.is_reviewed());
        assert_eq!(flow.accept(), Err(TransitionError::Closed));
        assert!(flow.close().is_empty());
    }

    #[test]
    fn timers_from_previous_session_are_ignored() {
        let mut flow = TermsFlow::new("Essential Support", GateConfig::default());
        let old = flow
            .select()
            .into_iter()
            .find_map(|e| match e {
                Effect::Schedule { ticket, .. } if ticket.kind == TimerKind::Fallback => Some(ticket),
                _ => None,
            })
            .unwrap();
        flow.close();
        flow.select();

        assert!(flow.timer_fired(old, None).is_empty());
        assert!(!flow.is_reviewed());
    }

    #[test]
    fn acceptance_completion_closes_modal() {
        let mut host = reviewed_host();
        host.accept().unwrap();
        host.complete("abc123");

        assert!(!host.flow.is_open());
        assert_eq!(host.flow.step(), FlowStep::ServiceAgreement);
    }

    #[test]
    fn reselect_while_open_starts_over() {
        let mut host = host();
        host.select();
        host.advance(20_000);
        host.select();

        host.advance(10_000);
        assert!(!host.flow.is_reviewed());
        host.advance(20_000);
        assert!(host.flow.is_reviewed());
    }

    #[test]
    fn custom_config_is_honoured() {
        let config = GateConfig {
            fallback_unlock_ms: 5_000,
            sentinel_ratio: 0.5,
            ..GateConfig::default()
        };
        let mut flow = TermsFlow::new("Essential Support", config);
        flow.select();
        assert!(!flow.sentinel_visible(0.5).is_empty());

        let mut host = VirtualHost::with_config("Essential Support", Some(long_document()), config);
        host.select();
        host.advance(5_000);
        assert!(host.flow.is_reviewed());
    }
}
