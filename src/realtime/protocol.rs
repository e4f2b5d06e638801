use serde::Serialize;
use uuid::Uuid;

use crate::models::negotiation_sessions::AgreementFlags;
use crate::models::offers::OfferResponse;

/// Events the server pushes over a negotiation channel.
///
/// The channel is one-way: participants act through the REST endpoints and
/// the resulting events fan out here after the durable write commits.
/// Clients that miss events (disconnect, dropped broadcast) reconcile by
/// re-fetching the negotiation view, which re-derives the same state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A participant proposed new terms.
    NewOffer { offer: OfferResponse },
    /// One side's agreement flag changed (agreed, or reset by a counter-offer).
    StatusUpdated { flags: AgreementFlags },
    /// Both sides agreed; the job is closed and the application accepted.
    NegotiationComplete { message: String },
    /// A participant came online or went offline on this channel.
    Presence { user_id: Uuid, online: bool },
    /// An error occurred.
    Error { message: String },
}
