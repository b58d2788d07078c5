use yew::prelude::*;

pub struct AgreementSection {
    pub icon: &'static str,
    pub title: &'static str,
    pub clauses: &'static [(&'static str, &'static str)],
}

pub const AGREEMENT_SECTIONS: &[AgreementSection] = &[
    AgreementSection {
        icon: "📋",
        title: "Scope of Services",
        clauses: &[
            ("Deliverables", "We provide the services listed in your selected plan. Work outside that list is quoted separately and only starts after written approval."),
            ("Scheduling", "Recurring calls are booked at least 48 hours in advance. Missed sessions without notice are not rescheduled."),
        ],
    },
    AgreementSection {
        icon: "💳",
        title: "Billing & Payment",
        clauses: &[
            ("Recurring charges", "Your plan is billed in advance at the start of each billing period through our payment processor."),
            ("Failed payments", "If a payment fails, services are paused after 7 days until the balance is settled."),
            ("Price changes", "We give at least 30 days notice before changing the price of an active plan."),
        ],
    },
    AgreementSection {
        icon: "🔄",
        title: "Cancellation & Refunds",
        clauses: &[
            ("Cancel anytime", "You may cancel before the next billing date. Cancellation takes effect at the end of the current period."),
            ("30-day guarantee", "First-time clients may request a full refund within 30 days of the first payment."),
        ],
    },
    AgreementSection {
        icon: "🔐",
        title: "Confidentiality & Data",
        clauses: &[
            ("Confidential information", "Both parties keep non-public business information confidential during and after the engagement."),
            ("Account access", "Credentials you share are used only to perform the services and are removed when the engagement ends."),
        ],
    },
    AgreementSection {
        icon: "🎨",
        title: "Intellectual Property",
        clauses: &[
            ("Your materials", "You keep ownership of everything you provide to us."),
            ("Work product", "Ownership of deliverables transfers to you once the related period has been paid in full."),
        ],
    },
    AgreementSection {
        icon: "⚖️",
        title: "Liability & General Terms",
        clauses: &[
            ("Limitation of liability", "Our total liability is limited to the fees paid in the three months before the claim."),
            ("Entire agreement", "This document is the complete understanding between us regarding the services and supersedes prior discussions."),
            ("Severability", "If any part of this agreement is found unenforceable, the remainder continues in full force."),
        ],
    },
];

#[derive(Properties, PartialEq)]
pub struct SelectedPlanProps {
    pub headline: String,
}

#[function_component(SelectedPlan)]
pub fn selected_plan(props: &SelectedPlanProps) -> Html {
    html! {
        <div class="selected-plan">
            <h3>{"📦 Selected Plan"}</h3>
            <p>{&props.headline}</p>
        </div>
    }
}

#[function_component(AgreementText)]
pub fn agreement_text() -> Html {
    html! {
        <>
            {
                AGREEMENT_SECTIONS.iter().enumerate().map(|(idx, section)| {
                    html! {
                        <section class="agreement-section" key={idx}>
                            <h4>{format!("{} {}. {}", section.icon, idx + 1, section.title)}</h4>
                            {
                                section.clauses.iter().map(|(heading, body)| html! {
                                    <div class="agreement-clause">
                                        <h5>{*heading}</h5>
                                        <p>{*body}</p>
                                    </div>
                                }).collect::<Html>()
                            }
                        </section>
                    }
                }).collect::<Html>()
            }
        </>
    }
}
