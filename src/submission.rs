//! The order form's submit/clear cycle.
//!
//! ```text
//! Idle --submit--> Submitting --+--> Success(confirmation)
//!                               +--> Failure(reason)
//! any --clear--> Idle
//! ```
//!
//! A submit always sends exactly one request. `submit` borrows the flow
//! mutably, so one form cannot have two submissions in flight.

use chrono::{DateTime, FixedOffset};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    client::ApiClient,
    clock::Clock,
    expiry::{self, ExpiryWindow, PeriodEnd},
    orders::{OrderDraft, OrderPayload, Session, build_payload},
};

pub const CONFIRMATION_TITLE: &str = "Order Successful placed";

/// Shown when the orders API cannot be reached or answers with something that isn't JSON.
pub const UNREACHABLE_MESSAGE: &str = "Failed to place order. Check console for details.";

/// Proof of an accepted order, stamped when the acceptance was seen.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub title: &'static str,
    pub placed_at: DateTime<FixedOffset>,
    pub order: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// The orders API answered but did not accept the order.
    Rejected {
        code: Option<String>,
        message: String,
    },
    /// No usable answer. The detail is logged, not shown.
    Unreachable,
}

impl SubmissionFailure {
    /// Text for the user.
    pub fn message(&self) -> &str {
        match self {
            SubmissionFailure::Rejected { message, .. } => message,
            SubmissionFailure::Unreachable => UNREACHABLE_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success(Confirmation),
    Failure(SubmissionFailure),
}

/// Holds the order form and drives it against the orders API.
pub struct OrderSubmissionFlow<C: Clock> {
    client: ApiClient,
    clock: C,
    session: Session,
    period_end: PeriodEnd,
    draft: OrderDraft,
    state: SubmissionState,
}

impl<C: Clock> OrderSubmissionFlow<C> {
    pub fn new(client: ApiClient, clock: C, session: Session) -> Self {
        Self {
            client,
            clock,
            session,
            period_end: PeriodEnd::default(),
            draft: OrderDraft::default(),
            state: SubmissionState::Idle,
        }
    }

    pub fn with_period_end(mut self, period_end: PeriodEnd) -> Self {
        self.period_end = period_end;
        self
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut OrderDraft {
        &mut self.draft
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Window and payload the next submit would send right now.
    pub fn preview(&self) -> (ExpiryWindow, OrderPayload) {
        let window = expiry::resolve(
            self.draft.expiry_mode,
            self.draft.period_from,
            self.draft.period_to,
            self.clock.now(),
            self.period_end,
        );
        let payload = build_payload(&self.draft, &window, &self.session);
        (window, payload)
    }

    /// Sends the current draft as one order.
    pub async fn submit(&mut self) -> &SubmissionState {
        self.state = SubmissionState::Submitting;
        let request_id = Uuid::new_v4();
        let (_, payload) = self.preview();

        self.state = match self.client.place_order(&payload).await {
            Err(e) => {
                error!(%request_id, error = %e, "order request failed");
                SubmissionState::Failure(SubmissionFailure::Unreachable)
            }
            Ok(resp) if resp.is_success() => {
                info!(%request_id, order = ?resp.order, "order placed");
                SubmissionState::Success(Confirmation {
                    title: CONFIRMATION_TITLE,
                    placed_at: self.clock.now().fixed_offset(),
                    order: resp.order,
                })
            }
            Ok(resp) => {
                let message = resp.message.unwrap_or_default();
                warn!(%request_id, code = ?resp.code, %message, "order rejected");
                SubmissionState::Failure(SubmissionFailure::Rejected {
                    code: resp.code,
                    message,
                })
            }
        };
        &self.state
    }

    /// Resets the form to its defaults. Local only.
    pub fn clear(&mut self) {
        self.draft = OrderDraft::default();
        self.state = SubmissionState::Idle;
    }
}
