use chrono::{DateTime, Utc};
use log::{info, warn};
use thiserror::Error;
use web_sys::{window, HtmlInputElement};
use yew::prelude::*;

use crate::config;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientDetails {
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub read_agreement: bool,
    pub authorised: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetailsError {
    #[error("Please enter your full name")]
    MissingName,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please confirm you have read the service agreement")]
    AgreementNotConfirmed,

    #[error("Please confirm you are authorized to accept these terms")]
    NotAuthorised,
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

impl ClientDetails {
    pub fn validate(&self) -> Result<(), DetailsError> {
        if self.full_name.trim().is_empty() {
            return Err(DetailsError::MissingName);
        }
        if !is_valid_email(&self.email) {
            return Err(DetailsError::InvalidEmail);
        }
        if !self.read_agreement {
            return Err(DetailsError::AgreementNotConfirmed);
        }
        if !self.authorised {
            return Err(DetailsError::NotAuthorised);
        }
        Ok(())
    }
}

pub fn acceptance_id(at: DateTime<Utc>, entropy: u32) -> String {
    format!("TA-{}-{:06x}", at.format("%Y%m%d%H%M%S"), entropy & 0xff_ffff)
}

/// Payment link with the client's email and acceptance id attached, so the
/// checkout can be matched back to the accepted terms.
pub fn checkout_url(payment_link: &str, email: &str, acceptance_id: &str) -> String {
    let separator = if payment_link.contains('?') { '&' } else { '?' };
    format!(
        "{}{}prefilled_email={}&client_reference_id={}",
        payment_link,
        separator,
        urlencoding::encode(email.trim()),
        urlencoding::encode(acceptance_id)
    )
}

fn redirect_to_checkout(package: &str, email: &str, acceptance_id: &str) {
    let payment_link = match config::package_catalog() {
        Ok(catalog) => catalog.find(package).map(|p| p.payment_link.clone()),
        Err(e) => {
            warn!("Package catalog unavailable: {}", e);
            None
        }
    };
    let Some(payment_link) = payment_link else {
        warn!("No payment link for package {}", package);
        return;
    };
    if let Some(window) = window() {
        let _ = window
            .location()
            .set_href(&checkout_url(&payment_link, email, acceptance_id));
    }
}

fn on_field<E: TargetCast + 'static>(
    details: &UseStateHandle<ClientDetails>,
    apply: fn(&mut ClientDetails, &HtmlInputElement),
) -> Callback<E> {
    let details = details.clone();
    Callback::from(move |e: E| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let mut next = (*details).clone();
        apply(&mut next, &input);
        details.set(next);
    })
}

#[derive(Properties, PartialEq)]
pub struct TermsAcceptanceFlowProps {
    pub package: String,
    pub on_accept: Callback<String>,
}

#[function_component(TermsAcceptanceFlow)]
pub fn terms_acceptance_flow(props: &TermsAcceptanceFlowProps) -> Html {
    let details = use_state(ClientDetails::default);
    let error = use_state(|| None::<String>);
    let submitted = use_state(|| false);

    let onsubmit = {
        let details = details.clone();
        let error = error.clone();
        let submitted = submitted.clone();
        let package = props.package.clone();
        let on_accept = props.on_accept.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitted {
                return;
            }
            if let Err(err) = details.validate() {
                error.set(Some(err.to_string()));
                return;
            }

            let entropy = (web_sys::js_sys::Math::random() * f64::from(0xff_ffffu32)) as u32;
            let id = acceptance_id(Utc::now(), entropy);
            info!("Client {} accepted terms for {}", details.email.trim(), package);
            submitted.set(true);
            error.set(None);
            on_accept.emit(id.clone());
            redirect_to_checkout(&package, &details.email, &id);
        })
    };

    html! {
        <form class="terms-acceptance-form" {onsubmit}>
            <p class="acceptance-package">{format!("Accepting terms for {}", props.package)}</p>

            <label for="client-name">{"Full name"}</label>
            <input
                id="client-name"
                type="text"
                value={details.full_name.clone()}
                oninput={on_field::<InputEvent>(&details, |d, input| d.full_name = input.value())}
            />

            <label for="client-email">{"Email"}</label>
            <input
                id="client-email"
                type="email"
                value={details.email.clone()}
                oninput={on_field::<InputEvent>(&details, |d, input| d.email = input.value())}
            />

            <label for="client-company">{"Company (optional)"}</label>
            <input
                id="client-company"
                type="text"
                value={details.company.clone()}
                oninput={on_field::<InputEvent>(&details, |d, input| d.company = input.value())}
            />

            <label class="acceptance-check">
                <input
                    type="checkbox"
                    checked={details.read_agreement}
                    onchange={on_field::<Event>(&details, |d, input| d.read_agreement = input.checked())}
                />
                {"I have read and agree to the Service Agreement"}
            </label>
            <label class="acceptance-check">
                <input
                    type="checkbox"
                    checked={details.authorised}
                    onchange={on_field::<Event>(&details, |d, input| d.authorised = input.checked())}
                />
                {"I am authorized to accept these terms for myself or my business"}
            </label>

            {
                if let Some(message) = (*error).as_ref() {
                    html! { <p class="acceptance-error">{message}</p> }
                } else {
                    html! {}
                }
            }

            <button type="submit" class="accept-button enabled" disabled={*submitted}>
                {if *submitted { "Redirecting to secure checkout..." } else { "Accept & Continue to Payment" }}
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn complete() -> ClientDetails {
        ClientDetails {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            company: String::new(),
            read_agreement: true,
            authorised: true,
        }
    }

    #[test]
    fn complete_details_are_valid() {
        assert_eq!(complete().validate(), Ok(()));
    }

    #[test]
    fn validation_reports_first_problem() {
        let mut details = complete();
        details.full_name = "   ".to_string();
        assert_eq!(details.validate(), Err(DetailsError::MissingName));

        let mut details = complete();
        details.read_agreement = false;
        details.authorised = false;
        assert_eq!(details.validate(), Err(DetailsError::AgreementNotConfirmed));

        let mut details = complete();
        details.authorised = false;
        assert_eq!(details.validate(), Err(DetailsError::NotAuthorised));
    }

    #[test]
    fn email_shapes() {
        for bad in ["", "ada", "@example.com", "ada@", "ada@example", "ada@.com", "ada@example.", "a@b@c.com"] {
            let details = ClientDetails {
                email: bad.to_string(),
                ..complete()
            };
            assert_eq!(details.validate(), Err(DetailsError::InvalidEmail), "{}", bad);
        }
        let details = ClientDetails {
            email: "  ada+billing@mail.example.com ".to_string(),
            ..complete()
        };
        assert_eq!(details.validate(), Ok(()));
    }

    #[test]
    fn acceptance_id_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(acceptance_id(at, 0xabc), "TA-20260309140507-000abc");
        assert_eq!(acceptance_id(at, 0x1ff_ffff), "TA-20260309140507-ffffff");
    }

    #[test]
    fn checkout_url_appends_reference() {
        assert_eq!(
            checkout_url("https://buy.example.com/plan", " ada+billing@example.com", "TA-1-abc"),
            "https://buy.example.com/plan?prefilled_email=ada%2Bbilling%40example.com&client_reference_id=TA-1-abc"
        );
        assert_eq!(
            checkout_url("https://buy.example.com/plan?locale=en", "ada@example.com", "TA-1"),
            "https://buy.example.com/plan?locale=en&prefilled_email=ada%40example.com&client_reference_id=TA-1"
        );
    }
}
