use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowStep {
    #[default]
    ServiceAgreement,
    TermsAcceptance,
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStep::ServiceAgreement => write!(f, "service-agreement"),
            FlowStep::TermsAcceptance => write!(f, "terms-acceptance"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowAction {
    Accept,
    Back,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("the agreement has not been reviewed yet")]
    NotReviewed,

    #[error("the terms modal is not open")]
    Closed,

    #[error("{action:?} is not allowed from {from}")]
    Invalid { from: FlowStep, action: FlowAction },
}

impl FlowStep {
    /// The only transitions between the two views. Closing is handled by the
    /// controller since it is valid from every step.
    pub fn apply(self, action: FlowAction, reviewed: bool) -> Result<FlowStep, TransitionError> {
        match (self, action) {
            (FlowStep::ServiceAgreement, FlowAction::Accept) if reviewed => {
                Ok(FlowStep::TermsAcceptance)
            }
            (FlowStep::ServiceAgreement, FlowAction::Accept) => Err(TransitionError::NotReviewed),
            (FlowStep::TermsAcceptance, FlowAction::Back) => Ok(FlowStep::ServiceAgreement),
            (from, action) => Err(TransitionError::Invalid { from, action }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_requires_review() {
        assert_eq!(
            FlowStep::ServiceAgreement.apply(FlowAction::Accept, false),
            Err(TransitionError::NotReviewed)
        );
        assert_eq!(
            FlowStep::ServiceAgreement.apply(FlowAction::Accept, true),
            Ok(FlowStep::TermsAcceptance)
        );
    }

    #[test]
    fn back_is_unconditional() {
        assert_eq!(
            FlowStep::TermsAcceptance.apply(FlowAction::Back, false),
            Ok(FlowStep::ServiceAgreement)
        );
        assert_eq!(
            FlowStep::TermsAcceptance.apply(FlowAction::Back, true),
            Ok(FlowStep::ServiceAgreement)
        );
    }

    #[test]
    fn everything_else_is_rejected() {
        assert_eq!(
            FlowStep::ServiceAgreement.apply(FlowAction::Back, true),
            Err(TransitionError::Invalid {
                from: FlowStep::ServiceAgreement,
                action: FlowAction::Back
            })
        );
        assert_eq!(
            FlowStep::TermsAcceptance.apply(FlowAction::Accept, true),
            Err(TransitionError::Invalid {
                from: FlowStep::TermsAcceptance,
                action: FlowAction::Accept
            })
        );
    }

    #[test]
    fn error_messages() {
        let err = FlowStep::TermsAcceptance
            .apply(FlowAction::Accept, true)
            .unwrap_err();
        assert_eq!(err.to_string(), "Accept is not allowed from terms-acceptance");
        assert_eq!(
            TransitionError::NotReviewed.to_string(),
            "the agreement has not been reviewed yet"
        );
    }
}
