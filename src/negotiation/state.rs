use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::negotiation_sessions::{AgreementStatus, Model as Session};
use crate::models::offers::Model as Offer;
use crate::models::users::Role;

/// Display phase of a negotiation from one participant's point of view.
///
/// Derived, never stored: the agreement flags and the offer log are the
/// source of truth, and this function is re-run on every fetch (including
/// reconnects), so client state cannot drift from server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The offer log is empty; someone has to open.
    NoOfferYet,
    /// The caller sent the latest offer and is waiting for a response.
    AwaitingCounterparty,
    /// It is the caller's turn to accept or counter.
    CanAccept,
    /// The caller has agreed to the latest offer; the counterpart has not.
    SelfAgreedAwaitingOther,
    /// Both sides agreed; the job is closed and the application accepted.
    Finalized,
}

/// Derive the caller's display phase from a session and its latest offer.
pub fn derive_phase(session: &Session, latest_offer: Option<&Offer>, caller: Role) -> Phase {
    if session.both_agreed() {
        return Phase::Finalized;
    }

    let Some(latest) = latest_offer else {
        return Phase::NoOfferYet;
    };

    if session.agreement_for(caller) == AgreementStatus::Agreed {
        return Phase::SelfAgreedAwaitingOther;
    }

    // The counterpart already agreed, so it is the caller's move either
    // way, no matter who sent the latest offer.
    if session.agreement_for(caller.counterpart()) == AgreementStatus::Agreed {
        return Phase::CanAccept;
    }

    if latest.sender_role == caller {
        Phase::AwaitingCounterparty
    } else {
        Phase::CanAccept
    }
}

/// Proposed terms as submitted by a participant, before validation.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OfferTerms {
    pub price: i64,
    pub hours_per_day: i32,
    pub days_per_week: i32,
}

/// Validation failure for offer terms, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermsError {
    #[error("{0} must be a positive integer")]
    NonPositive(&'static str),
    #[error("days_per_week must be between 1 and 7")]
    DaysOutOfRange,
}

impl OfferTerms {
    /// All three terms must be positive; a week has at most seven days.
    pub fn validate(&self) -> Result<(), TermsError> {
        if self.price <= 0 {
            return Err(TermsError::NonPositive("price"));
        }
        if self.hours_per_day <= 0 {
            return Err(TermsError::NonPositive("hours_per_day"));
        }
        if self.days_per_week <= 0 {
            return Err(TermsError::DaysOutOfRange);
        }
        if self.days_per_week > 7 {
            return Err(TermsError::DaysOutOfRange);
        }
        Ok(())
    }
}
