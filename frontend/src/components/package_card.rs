use std::collections::HashMap;

use gloo_timers::callback::Timeout;
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};
use yew::prelude::*;

use crate::components::agreement::{AgreementText, SelectedPlan};
use crate::components::terms_acceptance::TermsAcceptanceFlow;
use crate::config;
use crate::packages::flow::FlowStep;
use crate::packages::gate::ScrollGeometry;
use crate::packages::models::Package;
use crate::packages::session::{Effect, TermsFlow, TimerKind, TimerTicket};

#[derive(Properties, PartialEq)]
pub struct PackageCardProps {
    pub pkg: Package,
    #[prop_or_default]
    pub index: usize,
}

pub enum PackageCardMsg {
    Select,
    GateAttached,
    Scrolled,
    SentinelVisible(f64),
    TimerFired(TimerTicket),
    Accept,
    Back,
    Close,
    AcceptanceCompleted(String),
}

/// Scroll listener and sentinel observer for one agreement view. Dropping it
/// detaches both.
struct GateListeners {
    container: Element,
    on_scroll: Closure<dyn FnMut()>,
    observer: Option<(IntersectionObserver, Closure<dyn FnMut(Array, IntersectionObserver)>)>,
}

impl Drop for GateListeners {
    fn drop(&mut self) {
        let _ = self
            .container
            .remove_event_listener_with_callback("scroll", self.on_scroll.as_ref().unchecked_ref());
        if let Some((observer, _)) = &self.observer {
            observer.disconnect();
        }
    }
}

pub struct PackageCard {
    flow: TermsFlow,
    timers: HashMap<TimerKind, Timeout>,
    listeners: Option<GateListeners>,
    attach_pending: bool,
    terms_ref: NodeRef,
    sentinel_ref: NodeRef,
}

impl PackageCard {
    fn geometry(&self) -> Option<ScrollGeometry> {
        self.terms_ref.cast::<Element>().map(|container| ScrollGeometry {
            scroll_top: f64::from(container.scroll_top()),
            client_height: f64::from(container.client_height()),
            scroll_height: f64::from(container.scroll_height()),
        })
    }

    fn run(&mut self, ctx: &Context<Self>, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule { ticket, delay_ms } => {
                    let link = ctx.link().clone();
                    let timeout = Timeout::new(delay_ms, move || {
                        link.send_message(PackageCardMsg::TimerFired(ticket));
                    });
                    // replacing the old handle cancels it
                    self.timers.insert(ticket.kind, timeout);
                }
                Effect::Cancel(kind) => {
                    self.timers.remove(&kind);
                }
                Effect::AttachGate => self.attach_pending = true,
                Effect::DetachGate => {
                    self.attach_pending = false;
                    self.listeners = None;
                }
                Effect::ScrollToTop => {
                    if let Some(container) = self.terms_ref.cast::<Element>() {
                        container.set_scroll_top(0);
                    }
                }
                Effect::BeginAcceptance { package } => {
                    debug!("Handing {} over to terms acceptance", package);
                }
            }
        }
    }

    fn attach(&self, ctx: &Context<Self>) -> Option<GateListeners> {
        let container = self.terms_ref.cast::<Element>()?;

        let link = ctx.link().clone();
        let on_scroll = Closure::wrap(Box::new(move || {
            link.send_message(PackageCardMsg::Scrolled);
        }) as Box<dyn FnMut()>);
        if container
            .add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())
            .is_err()
        {
            warn!("Could not attach scroll listener to terms container");
        }

        let observer = self.sentinel_ref.cast::<Element>().and_then(|sentinel| {
            let link = ctx.link().clone();
            let on_intersect = Closure::wrap(Box::new(move |entries: Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    if entry.is_intersecting() {
                        link.send_message(PackageCardMsg::SentinelVisible(entry.intersection_ratio()));
                    }
                }
            }) as Box<dyn FnMut(Array, IntersectionObserver)>);

            let init = IntersectionObserverInit::new();
            init.set_root(Some(container.as_ref()));
            init.set_threshold(&JsValue::from_f64(config::gate_config().sentinel_ratio));

            match IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &init) {
                Ok(observer) => {
                    observer.observe(&sentinel);
                    Some((observer, on_intersect))
                }
                Err(_) => {
                    warn!("IntersectionObserver unavailable, sentinel disabled");
                    None
                }
            }
        });

        Some(GateListeners {
            container,
            on_scroll,
            observer,
        })
    }

    fn view_card(&self, ctx: &Context<Self>) -> Html {
        let pkg = &ctx.props().pkg;
        let delay = format!("animation-delay: {:.1}s;", ctx.props().index as f64 * 0.1);

        html! {
            <div class={classes!("package-card", pkg.featured.then(|| "featured"))} style={delay}>
                {
                    if let Some(ribbon) = pkg.ribbon() {
                        html! { <div class="package-ribbon">{ribbon}</div> }
                    } else {
                        html! {}
                    }
                }
                <div class="card-header">
                    <h3>{&pkg.name}</h3>
                    <div class="price">
                        <span class="amount">{&pkg.price}</span>
                        <span class="period">{&pkg.period}</span>
                    </div>
                    <p class="billing-note">{&pkg.billing_note}</p>
                </div>
                <ul>
                    {
                        pkg.features.iter().map(|feature| html! {
                            <li>{"✓ "}{feature}</li>
                        }).collect::<Html>()
                    }
                </ul>
                <button
                    class={classes!("iq-button", "select-package", pkg.featured.then(|| "pro-signup"))}
                    onclick={ctx.link().callback(|_| PackageCardMsg::Select)}
                >
                    <b>{&pkg.cta}</b>
                </button>
                <p class="secure-note">{"🔒 Secure payment • 30-day guarantee"}</p>
            </div>
        }
    }

    fn view_agreement(&self, ctx: &Context<Self>) -> Html {
        let pkg = &ctx.props().pkg;
        let gate = self.flow.gate();
        let reviewed = gate.is_reviewed();
        let close = ctx.link().callback(|_| PackageCardMsg::Close);

        html! {
            <>
                <div class="modal-header">
                    <div class="modal-title">
                        <div>
                            <h2>{"Service Agreement"}</h2>
                            <p>{"Please read through all terms carefully"}</p>
                        </div>
                        <button class="modal-close" onclick={close.clone()}>{"×"}</button>
                    </div>
                    <div class="review-progress">
                        <div class="review-progress-labels">
                            <span>{gate.progress_caption()}</span>
                            <span class={if reviewed { "status-ready" } else { "status-pending" }}>
                                {gate.progress_status()}
                            </span>
                        </div>
                        <div class="review-progress-track">
                            <div
                                class={classes!("review-progress-bar", reviewed.then(|| "complete"))}
                                style={if reviewed { "width: 100%;" } else { "width: 0%;" }}
                            />
                        </div>
                    </div>
                </div>

                <div class="terms-content" ref={self.terms_ref.clone()}>
                    <SelectedPlan headline={pkg.headline()} />
                    <AgreementText />
                    {
                        if reviewed {
                            html! {
                                <div class="review-panel reviewed">
                                    <span>{"✓ All Terms Reviewed ✓"}</span>
                                    <p>{"You may now proceed to accept the agreement and continue to client information"}</p>
                                </div>
                            }
                        } else {
                            html! {
                                <div class="review-panel">
                                    <span>{"↓ Keep scrolling to review all terms ↓"}</span>
                                    <p>{"Please read through all sections above before proceeding"}</p>
                                </div>
                            }
                        }
                    }
                    <div class="terms-sentinel" ref={self.sentinel_ref.clone()} />
                </div>

                <div class="modal-footer">
                    <div class="modal-actions">
                        <button class="cancel-button" onclick={close}>{"Cancel"}</button>
                        <button
                            class={classes!("accept-button", reviewed.then(|| "enabled"))}
                            disabled={!self.flow.accept_enabled()}
                            onclick={ctx.link().callback(|_| PackageCardMsg::Accept)}
                        >
                            {gate.accept_label()}
                        </button>
                    </div>
                    <p class="footnote">{gate.footnote()}</p>
                    {
                        if let Some(tip) = gate.mobile_tip() {
                            html! { <p class="mobile-tip">{tip}</p> }
                        } else {
                            html! {}
                        }
                    }
                </div>
            </>
        }
    }

    fn view_acceptance(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="acceptance-view">
                <div class="modal-header">
                    <div class="modal-title">
                        <div>
                            <h2>{"Client Information & Terms"}</h2>
                            <p>{"Complete your details to proceed"}</p>
                        </div>
                        <button class="modal-back" onclick={ctx.link().callback(|_| PackageCardMsg::Back)}>
                            {"← Back"}
                        </button>
                    </div>
                </div>
                <div class="acceptance-body">
                    <TermsAcceptanceFlow
                        package={self.flow.package().to_string()}
                        on_accept={ctx.link().callback(PackageCardMsg::AcceptanceCompleted)}
                    />
                </div>
            </div>
        }
    }

    fn view_modal(&self, ctx: &Context<Self>) -> Html {
        if !self.flow.is_open() {
            return html! {};
        }
        html! {
            <div class="modal-overlay" onclick={ctx.link().callback(|_| PackageCardMsg::Close)}>
                <div class="terms-modal" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
                    {
                        match self.flow.step() {
                            FlowStep::ServiceAgreement => self.view_agreement(ctx),
                            FlowStep::TermsAcceptance => self.view_acceptance(ctx),
                        }
                    }
                </div>
            </div>
        }
    }
}

impl Component for PackageCard {
    type Message = PackageCardMsg;
    type Properties = PackageCardProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            flow: TermsFlow::new(ctx.props().pkg.name.clone(), config::gate_config()),
            timers: HashMap::new(),
            listeners: None,
            attach_pending: false,
            terms_ref: NodeRef::default(),
            sentinel_ref: NodeRef::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let before = (self.flow.is_open(), self.flow.step(), self.flow.is_reviewed());

        let effects = match msg {
            PackageCardMsg::Select => self.flow.select(),
            PackageCardMsg::GateAttached => {
                let geometry = self.geometry();
                self.flow.gate_attached(geometry)
            }
            PackageCardMsg::Scrolled => self.flow.scrolled(),
            PackageCardMsg::SentinelVisible(ratio) => self.flow.sentinel_visible(ratio),
            PackageCardMsg::TimerFired(ticket) => {
                self.timers.remove(&ticket.kind);
                let geometry = self.geometry();
                self.flow.timer_fired(ticket, geometry)
            }
            PackageCardMsg::Accept => self.flow.accept().unwrap_or_else(|e| {
                debug!("Accept ignored: {}", e);
                Vec::new()
            }),
            PackageCardMsg::Back => self.flow.back().unwrap_or_else(|e| {
                debug!("Back ignored: {}", e);
                Vec::new()
            }),
            PackageCardMsg::Close => self.flow.close(),
            PackageCardMsg::AcceptanceCompleted(acceptance_id) => {
                self.flow.acceptance_completed(&acceptance_id)
            }
        };
        self.run(ctx, effects);

        let after = (self.flow.is_open(), self.flow.step(), self.flow.is_reviewed());
        before != after || self.attach_pending
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if old_props.pkg.name != ctx.props().pkg.name {
            let effects = self.flow.close();
            self.run(ctx, effects);
            self.flow = TermsFlow::new(ctx.props().pkg.name.clone(), config::gate_config());
        }
        true
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        if self.attach_pending {
            self.attach_pending = false;
            self.listeners = self.attach(ctx);
            ctx.link().send_message(PackageCardMsg::GateAttached);
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.timers.clear();
        self.listeners = None;
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <>
                {self.view_card(ctx)}
                {self.view_modal(ctx)}
                <style>
                    {r#"
                    .package-card {
                        position: relative;
                        background: linear-gradient(135deg, #1a1a1a, #000);
                        border: 1px solid #2a2a2a;
                        border-radius: 16px;
                        padding: 2rem;
                        color: #fff;
                        animation: fadeInUp 0.5s ease-out both;
                    }
                    .package-card.featured {
                        border-color: #1e90ff;
                        box-shadow: 0 0 40px rgba(30, 144, 255, 0.2);
                    }
                    .package-ribbon {
                        position: absolute;
                        top: -14px;
                        left: 50%;
                        transform: translateX(-50%);
                        background: linear-gradient(90deg, #1e90ff, #7b2ff7);
                        padding: 0.4rem 1.2rem;
                        border-radius: 999px;
                        font-size: 0.85rem;
                        font-weight: bold;
                        white-space: nowrap;
                    }
                    .package-card ul {
                        list-style: none;
                        padding: 0;
                        margin: 1.5rem 0;
                    }
                    .package-card li {
                        color: #ccc;
                        margin-bottom: 0.75rem;
                    }
                    .billing-note, .secure-note {
                        color: #888;
                        font-size: 0.8rem;
                        text-align: center;
                    }
                    .select-package {
                        width: 100%;
                    }
                    .modal-overlay {
                        position: fixed;
                        inset: 0;
                        background: rgba(0, 0, 0, 0.8);
                        display: flex;
                        align-items: center;
                        justify-content: center;
                        z-index: 50;
                        padding: 1rem;
                    }
                    .terms-modal {
                        background: #111;
                        border: 1px solid #2a2a2a;
                        border-radius: 16px;
                        max-width: 56rem;
                        width: 100%;
                        max-height: 95vh;
                        overflow: hidden;
                        color: #ddd;
                    }
                    .modal-header, .modal-footer {
                        padding: 1.5rem;
                        background: #151515;
                    }
                    .modal-title {
                        display: flex;
                        justify-content: space-between;
                        align-items: center;
                    }
                    .review-progress-labels {
                        display: flex;
                        justify-content: space-between;
                        margin: 1rem 0 0.5rem;
                        font-size: 0.85rem;
                    }
                    .status-ready { color: #4caf50; }
                    .status-pending { color: #1e90ff; }
                    .review-progress-track {
                        background: #2a2a2a;
                        border-radius: 999px;
                        height: 8px;
                    }
                    .review-progress-bar {
                        height: 8px;
                        border-radius: 999px;
                        background: #1e90ff;
                        transition: width 0.5s;
                    }
                    .review-progress-bar.complete { background: #4caf50; }
                    .terms-content {
                        padding: 1.5rem;
                        overflow-y: auto;
                        max-height: 60vh;
                        -webkit-overflow-scrolling: touch;
                    }
                    .terms-sentinel {
                        height: 0;
                    }
                    .review-panel {
                        text-align: center;
                        padding: 1.5rem;
                        border-radius: 12px;
                        border: 1px solid rgba(30, 144, 255, 0.2);
                        color: #1e90ff;
                    }
                    .review-panel.reviewed {
                        border-color: rgba(76, 175, 80, 0.2);
                        color: #4caf50;
                    }
                    .modal-actions {
                        display: flex;
                        gap: 0.75rem;
                    }
                    .modal-actions button {
                        flex: 1;
                        padding: 0.75rem 1.5rem;
                        border-radius: 12px;
                    }
                    .accept-button {
                        background: #333;
                        color: #888;
                        cursor: not-allowed;
                    }
                    .accept-button.enabled {
                        background: linear-gradient(90deg, #1e90ff, #7b2ff7);
                        color: #fff;
                        cursor: pointer;
                    }
                    .footnote {
                        text-align: center;
                        color: #777;
                        font-size: 0.75rem;
                    }
                    .mobile-tip {
                        display: none;
                        text-align: center;
                        color: #1e90ff;
                        font-size: 0.75rem;
                    }
                    @media (max-width: 640px) {
                        .modal-actions { flex-direction: column; }
                        .mobile-tip { display: block; }
                    }
                    .acceptance-body {
                        padding: 1.5rem;
                        max-height: calc(95vh - 200px);
                        overflow-y: auto;
                    }
                    .terms-acceptance-form {
                        display: flex;
                        flex-direction: column;
                        gap: 0.5rem;
                    }
                    .acceptance-error {
                        color: #ff6b6b;
                    }
                    @keyframes fadeInUp {
                        from { opacity: 0; transform: translateY(20px); }
                        to { opacity: 1; transform: translateY(0); }
                    }
                    "#}
                </style>
            </>
        }
    }
}
