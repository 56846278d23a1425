//! Payment form controller.
//!
//! [`PaymentForm`] holds the submit flow of a prebuilt payment form without
//! touching any UI toolkit. The host supplies a [`FormRenderer`] that draws
//! field markers, the error banner and the busy state; the controller decides
//! when each of those changes.
//!
//! At most one submission is outstanding per form. A submit issued while
//! another is in flight returns [`SubmitOutcome::Ignored`] and never reaches
//! the gateway. At most one error is visible at a time: showing a new error
//! always clears the previous one first.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::assemble::{TransactionDetails, assemble_payment_request};
use crate::brand::{CardBrand, detect_brand};
use crate::error::ErrorRecord;
use crate::gateway::PaymentGateway;
use crate::luhn::is_valid_luhn;
use crate::normalize::{format_card_number, normalize_digits};
use crate::proto::PaymentResponse;
use crate::validation::{CardField, CardInput, validate_card};

/// Drawing surface supplied by the host environment.
pub trait FormRenderer: Send + Sync {
    /// Marks `field` as invalid with a short message.
    fn mark_field_invalid(&self, field: CardField, message: &str);

    /// Removes the invalid marker from `field`.
    fn clear_field(&self, field: CardField);

    /// Shows `error` as the form's single error banner.
    fn show_error(&self, error: &ErrorRecord);

    /// Removes the error banner.
    fn clear_error(&self);

    /// Toggles the busy state of the submit control.
    fn set_submitting(&self, submitting: bool);
}

/// Keystroke feedback for the card number field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardNumberFeedback {
    /// Digits grouped by four, for redisplay in the field.
    pub formatted: String,
    /// Brand detected so far.
    pub brand: CardBrand,
    /// `true` once the number has a valid length and checksum.
    pub complete: bool,
}

/// Result of [`PaymentForm::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The gateway accepted the request.
    Completed(PaymentResponse),
    /// Input was rejected locally; the gateway was not called.
    Rejected(ErrorRecord),
    /// The gateway call failed.
    Failed(ErrorRecord),
    /// Another submission was already in flight.
    Ignored,
}

type SuccessHandler = Box<dyn Fn(&PaymentResponse) + Send + Sync>;
type ErrorHandler = Box<dyn Fn(&ErrorRecord) + Send + Sync>;

#[derive(Default)]
struct FormState {
    visible_error: Option<ErrorRecord>,
    invalid_field: Option<CardField>,
}

/// Submit controller for a payment form.
pub struct PaymentForm<G, R> {
    gateway: G,
    renderer: R,
    in_flight: AtomicBool,
    state: Mutex<FormState>,
    on_success: Option<SuccessHandler>,
    on_error: Option<ErrorHandler>,
}

impl<G, R> fmt::Debug for PaymentForm<G, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentForm")
            .field("in_flight", &self.in_flight.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<G: PaymentGateway, R: FormRenderer> PaymentForm<G, R> {
    /// Creates a form that submits through `gateway` and draws on `renderer`.
    pub fn new(gateway: G, renderer: R) -> Self {
        Self {
            gateway,
            renderer,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(FormState::default()),
            on_success: None,
            on_error: None,
        }
    }

    /// Registers a callback for successful payments.
    #[must_use]
    pub fn on_success(mut self, handler: impl Fn(&PaymentResponse) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(handler));
        self
    }

    /// Registers a callback for every error the form shows.
    #[must_use]
    pub fn on_error(mut self, handler: impl Fn(&ErrorRecord) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// The gateway this form submits through.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The host renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns `true` while a submission is outstanding.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The error currently shown, if any.
    #[must_use]
    pub fn visible_error(&self) -> Option<ErrorRecord> {
        self.state().visible_error.clone()
    }

    /// Computes feedback for a keystroke in the card number field.
    #[must_use]
    pub fn card_number_input(&self, raw: &str) -> CardNumberFeedback {
        let digits = normalize_digits(raw);
        CardNumberFeedback {
            formatted: format_card_number(&digits),
            brand: detect_brand(&digits),
            complete: is_valid_luhn(&digits),
        }
    }

    /// Validates `input`, assembles a payment and submits it.
    ///
    /// Returns [`SubmitOutcome::Ignored`] without side effects if another
    /// submission is in flight. The in-flight flag is cleared on every path
    /// out of this method, including cancellation of the returned future.
    pub async fn submit(&self, details: &TransactionDetails, input: &CardInput) -> SubmitOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &self.renderer) else {
            #[cfg(feature = "telemetry")]
            tracing::debug!("submit ignored: another submission is in flight");
            return SubmitOutcome::Ignored;
        };

        let card = match validate_card(input) {
            Ok(card) => card,
            Err(err) => {
                let field = err.field();
                let record = ErrorRecord::from(err);
                self.mark_invalid(field, record.message());
                self.present_error(&record);
                return SubmitOutcome::Rejected(record);
            }
        };
        self.clear_invalid();

        let request = match assemble_payment_request(details, &card) {
            Ok(request) => request,
            Err(record) => {
                self.present_error(&record);
                return SubmitOutcome::Rejected(record);
            }
        };

        match self.gateway.process_payment(&request).await {
            Ok(response) => {
                self.dismiss_error();
                if let Some(handler) = &self.on_success {
                    handler(&response);
                }
                SubmitOutcome::Completed(response)
            }
            Err(record) => {
                self.present_error(&record);
                SubmitOutcome::Failed(record)
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_invalid(&self, field: CardField, message: &str) {
        let previous = self.state().invalid_field.replace(field);
        if let Some(previous) = previous.filter(|previous| *previous != field) {
            self.renderer.clear_field(previous);
        }
        self.renderer.mark_field_invalid(field, message);
    }

    fn clear_invalid(&self) {
        let previous = self.state().invalid_field.take();
        if let Some(field) = previous {
            self.renderer.clear_field(field);
        }
    }

    /// Evicts the visible error, if any, then shows `record`.
    fn present_error(&self, record: &ErrorRecord) {
        let previous = self.state().visible_error.replace(record.clone());
        if previous.is_some() {
            self.renderer.clear_error();
        }
        self.renderer.show_error(record);
        if let Some(handler) = &self.on_error {
            handler(record);
        }
    }

    fn dismiss_error(&self) {
        let previous = self.state().visible_error.take();
        if previous.is_some() {
            self.renderer.clear_error();
        }
    }
}

/// Holds the in-flight flag for the duration of one submission.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    renderer: &'a dyn FormRenderer,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool, renderer: &'a dyn FormRenderer) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        renderer.set_submitting(true);
        Some(Self { flag, renderer })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.renderer.set_submitting(false);
    }
}
