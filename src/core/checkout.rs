//! Order placement flow - Composes balance, duplicate, reference, and draft
//! handling into the two purchase paths.
//!
//! The flow is an explicit state machine. Re-entrancy is rejected at this
//! boundary (a second confirmation attempt while one is in flight fails with
//! [`Error::SubmissionInProgress`]) rather than with a UI flag. On the wallet
//! path the affordability check and both writes ride a single store
//! transaction: the ledger deduction is appended strictly before the order
//! row, so an order can never exist without its payment recorded, and a
//! failed commit leaves neither.

use crate::{
    core::{
        balance::{self, CommissionAggregator},
        draft::{self, CheckoutDraft, OrderPayload},
        duplicate, ledger, phone, reference,
    },
    entities::{
        data_bundle, data_order,
        data_order::{OrderStatus, PaymentMethod},
        wallet_transaction::{TransactionStatus, TransactionType},
    },
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Correlation kind linking a deduction to the order it paid for
const ORDER_SOURCE_TYPE: &str = "data_order";

/// Delivery expectation included in every success receipt
pub const DELIVERY_NOTE: &str =
    "Data bundles are typically delivered within 5 to 15 minutes of confirmation.";

/// Renders the manual-payment instructions shown at the instructions step and
/// repeated on the success receipt.
#[must_use]
pub fn manual_payment_instructions(reference_code: &str, amount: f64) -> String {
    format!(
        "Send {amount:.2} by mobile money and quote reference {reference_code}. \
         Your order remains pending until the payment is confirmed."
    )
}

/// Position of a checkout in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Nothing selected yet
    Idle,
    /// A bundle has been chosen
    BundleSelected,
    /// Recipient phone and payment method captured
    DetailsEntered,
    /// Manual path: instructions shown, awaiting the agent's payment
    ManualPaymentPending,
    /// Manual path: agent has declared "I have paid"
    ManualPaymentAcknowledged,
    /// Wallet path: awaiting final confirmation
    WalletConfirmPending,
    /// A confirmation is in flight; further submissions are rejected
    Confirming,
    /// Order placed; the flow is finished
    Completed,
    /// The last confirmation failed; `confirm` may be retried
    Failed,
}

impl CheckoutState {
    const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::BundleSelected => "bundle_selected",
            Self::DetailsEntered => "details_entered",
            Self::ManualPaymentPending => "manual_payment_pending",
            Self::ManualPaymentAcknowledged => "manual_payment_acknowledged",
            Self::WalletConfirmPending => "wallet_confirm_pending",
            Self::Confirming => "confirming",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// What the agent sees after submitting the order form.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentPrompt {
    /// The reference code allocated to this purchase
    pub reference_code: String,
    /// Amount due at currency scale
    pub amount: f64,
    /// Manual-payment instructions; `None` on the wallet path
    pub instructions: Option<String>,
}

/// Success notification for a placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    /// The inserted order row
    pub order: data_order::Model,
    /// The reference code quoted to the agent
    pub reference_code: String,
    /// Delivery-time expectation
    pub delivery_note: &'static str,
    /// Manual-payment instructions repeated for reference; `None` on the
    /// wallet path
    pub payment_instructions: Option<String>,
}

/// One agent's checkout, driven from the UI as an explicit state machine.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    agent_id: i64,
    state: CheckoutState,
    bundle: Option<data_bundle::Model>,
    recipient_phone: Option<String>,
    payment_method: Option<PaymentMethod>,
    reference_code: Option<String>,
}

impl CheckoutFlow {
    /// Starts an empty checkout for an agent.
    #[must_use]
    pub const fn new(agent_id: i64) -> Self {
        Self {
            agent_id,
            state: CheckoutState::Idle,
            bundle: None,
            recipient_phone: None,
            payment_method: None,
            reference_code: None,
        }
    }

    /// Rebuilds a checkout from a persisted draft, if one exists.
    ///
    /// The flow resumes at the waiting state for its payment path with the
    /// *same* reference code - the agent may already have quoted it to a
    /// payment provider, so it is never regenerated. Callers should surface
    /// an "order in flight" notice when this returns `Some`. The draft is
    /// advisory and local to this store; a manual acknowledgment must be
    /// repeated on the manual path.
    pub async fn resume(db: &DatabaseConnection, agent_id: i64) -> Result<Option<Self>> {
        let Some(saved) = draft::load_draft(db, agent_id).await? else {
            return Ok(None);
        };

        let state = match saved.payment_method {
            PaymentMethod::Manual => CheckoutState::ManualPaymentPending,
            PaymentMethod::Wallet => CheckoutState::WalletConfirmPending,
        };

        info!(agent_id, reference = %saved.reference_code, "resuming in-flight checkout");
        Ok(Some(Self {
            agent_id,
            state,
            bundle: Some(saved.bundle),
            recipient_phone: Some(saved.recipient_phone),
            payment_method: Some(saved.payment_method),
            reference_code: Some(saved.reference_code),
        }))
    }

    /// Current state of the flow.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// Agent this flow belongs to.
    #[must_use]
    pub const fn agent_id(&self) -> i64 {
        self.agent_id
    }

    /// Reference code allocated for this purchase, once one exists.
    #[must_use]
    pub fn reference_code(&self) -> Option<&str> {
        self.reference_code.as_deref()
    }

    /// Chooses the bundle to purchase. Inactive bundles are rejected.
    pub fn select_bundle(&mut self, bundle: data_bundle::Model) -> Result<()> {
        if !matches!(
            self.state,
            CheckoutState::Idle | CheckoutState::BundleSelected
        ) {
            return Err(Error::InvalidTransition {
                state: self.state.name(),
                action: "select a bundle",
            });
        }
        if !bundle.is_active {
            return Err(Error::BundleUnavailable { id: bundle.id });
        }

        self.bundle = Some(bundle);
        self.state = CheckoutState::BundleSelected;
        Ok(())
    }

    /// Captures the recipient phone and payment method.
    ///
    /// The phone must contain exactly 10 digits after stripping formatting;
    /// it is stored normalized so every later comparison agrees.
    pub fn enter_details(
        &mut self,
        recipient_phone: &str,
        payment_method: PaymentMethod,
    ) -> Result<()> {
        if !matches!(
            self.state,
            CheckoutState::BundleSelected | CheckoutState::DetailsEntered
        ) {
            return Err(Error::InvalidTransition {
                state: self.state.name(),
                action: "enter recipient details",
            });
        }
        if !phone::is_valid_recipient_phone(recipient_phone) {
            return Err(Error::InvalidPhone {
                phone: recipient_phone.to_string(),
            });
        }

        self.recipient_phone = Some(phone::normalize_phone(recipient_phone));
        self.payment_method = Some(payment_method);
        self.state = CheckoutState::DetailsEntered;
        Ok(())
    }

    /// Runs the validation gate and moves the flow to its payment step.
    ///
    /// Order of checks: wallet affordability (wallet path only), then the
    /// duplicate guard - a match halts the flow with the remaining cooldown
    /// and nothing is persisted. Only then is a reference allocated and the
    /// draft snapshot written, so an interrupted flow can be resumed from
    /// here on.
    pub async fn begin_payment(
        &mut self,
        db: &DatabaseConnection,
        aggregator: Option<&dyn CommissionAggregator>,
    ) -> Result<PaymentPrompt> {
        if self.state != CheckoutState::DetailsEntered {
            return Err(Error::InvalidTransition {
                state: self.state.name(),
                action: "begin payment",
            });
        }
        let bundle = self.require_bundle()?.clone();
        let recipient = self.require_recipient_phone()?.to_string();
        let method = self.require_payment_method()?;

        if method == PaymentMethod::Wallet {
            let spendable = balance::get_spendable_balance(db, aggregator, self.agent_id).await;
            if spendable.amount < bundle.price {
                return Err(Error::InsufficientFunds {
                    available: spendable.amount,
                    required: bundle.price,
                });
            }
        }

        if let Some(found) =
            duplicate::check_duplicate(db, bundle.id, &recipient, method, &bundle.display_name())
                .await?
        {
            return Err(Error::DuplicateOrder {
                bundle_name: found.bundle_name,
                minutes_until_allowed: found.minutes_until_allowed,
            });
        }

        let reference_code = reference::generate_reference_code();
        let snapshot = CheckoutDraft {
            bundle: bundle.clone(),
            recipient_phone: recipient.clone(),
            payment_method: method,
            reference_code: reference_code.clone(),
            order_payload: OrderPayload {
                agent_id: self.agent_id,
                bundle_id: bundle.id,
                recipient_phone: recipient,
                payment_method: method,
                payment_reference: reference_code.clone(),
                amount: bundle.price,
            },
        };
        draft::save_draft(db, self.agent_id, &snapshot).await?;

        self.reference_code = Some(reference_code.clone());
        let instructions = (method == PaymentMethod::Manual)
            .then(|| manual_payment_instructions(&reference_code, bundle.price));
        self.state = match method {
            PaymentMethod::Manual => CheckoutState::ManualPaymentPending,
            PaymentMethod::Wallet => CheckoutState::WalletConfirmPending,
        };

        Ok(PaymentPrompt {
            reference_code,
            amount: bundle.price,
            instructions,
        })
    }

    /// Records the agent's explicit "I have paid" declaration on the manual
    /// path.
    pub fn acknowledge_manual_payment(&mut self) -> Result<()> {
        if self.state != CheckoutState::ManualPaymentPending {
            return Err(Error::InvalidTransition {
                state: self.state.name(),
                action: "acknowledge payment",
            });
        }
        self.state = CheckoutState::ManualPaymentAcknowledged;
        Ok(())
    }

    /// Finalizes the order.
    ///
    /// Manual path: inserts the order as `pending`; no ledger mutation - the
    /// payment is reconciled by an admin process out of band. Wallet path:
    /// re-checks the balance fresh (not the value cached at selection time),
    /// then appends the approved deduction and inserts the `processing`
    /// order inside one store transaction. On any failure the flow lands in
    /// [`CheckoutState::Failed`] and `confirm` may be called again.
    pub async fn confirm(
        &mut self,
        db: &DatabaseConnection,
        aggregator: Option<&dyn CommissionAggregator>,
    ) -> Result<CheckoutReceipt> {
        match self.state {
            CheckoutState::ManualPaymentAcknowledged
            | CheckoutState::WalletConfirmPending
            | CheckoutState::Failed => {}
            CheckoutState::Confirming => return Err(Error::SubmissionInProgress),
            _ => {
                return Err(Error::InvalidTransition {
                    state: self.state.name(),
                    action: "confirm the order",
                });
            }
        }

        let bundle = self.require_bundle()?.clone();
        let recipient = self.require_recipient_phone()?.to_string();
        let method = self.require_payment_method()?;
        let reference_code = self
            .reference_code
            .clone()
            .ok_or(Error::InvalidTransition {
                state: self.state.name(),
                action: "confirm the order",
            })?;

        self.state = CheckoutState::Confirming;

        let result = match method {
            PaymentMethod::Manual => {
                Self::place_manual_order(db, self.agent_id, &bundle, &recipient, &reference_code)
                    .await
            }
            PaymentMethod::Wallet => {
                Self::place_wallet_order(
                    db,
                    aggregator,
                    self.agent_id,
                    &bundle,
                    &recipient,
                    &reference_code,
                )
                .await
            }
        };

        match result {
            Ok(order) => {
                self.state = CheckoutState::Completed;
                info!(
                    agent_id = self.agent_id,
                    order_id = order.id,
                    reference = %reference_code,
                    "order placed"
                );
                let payment_instructions = (method == PaymentMethod::Manual)
                    .then(|| manual_payment_instructions(&reference_code, bundle.price));
                Ok(CheckoutReceipt {
                    order,
                    reference_code,
                    delivery_note: DELIVERY_NOTE,
                    payment_instructions,
                })
            }
            Err(e) => {
                self.state = CheckoutState::Failed;
                warn!(agent_id = self.agent_id, error = %e, "order confirmation failed");
                Err(e)
            }
        }
    }

    /// Abandons the checkout before confirmation and clears the draft.
    ///
    /// Allowed at the instruction and confirmation steps, where nothing has
    /// been mutated yet. Not allowed while a confirmation is in flight.
    pub async fn cancel(&mut self, db: &DatabaseConnection) -> Result<()> {
        match self.state {
            CheckoutState::Confirming => Err(Error::SubmissionInProgress),
            CheckoutState::Completed => Err(Error::InvalidTransition {
                state: self.state.name(),
                action: "cancel the checkout",
            }),
            _ => {
                draft::clear_draft(db, self.agent_id).await?;
                *self = Self::new(self.agent_id);
                Ok(())
            }
        }
    }

    /// Manual path: record the order as `pending`; the payment moves outside
    /// the system and is only recorded, never moved, here.
    async fn place_manual_order(
        db: &DatabaseConnection,
        agent_id: i64,
        bundle: &data_bundle::Model,
        recipient: &str,
        reference_code: &str,
    ) -> Result<data_order::Model> {
        let txn = db.begin().await?;

        let order = Self::insert_order(
            &txn,
            agent_id,
            bundle,
            recipient,
            PaymentMethod::Manual,
            reference_code,
            OrderStatus::Pending,
        )
        .await?;
        duplicate::record_order_attempt(&txn, bundle.id, recipient, PaymentMethod::Manual).await?;
        draft::clear_draft(&txn, agent_id).await?;

        txn.commit().await?;
        Ok(order)
    }

    /// Wallet path: one store transaction around the authoritative balance
    /// check, the deduction append, and the order insert.
    ///
    /// The deduction is self-authorized (`approved`) because it spends the
    /// agent's own wallet; a top-up by contrast stays `pending` until an
    /// admin approves it. The deduction append is ordered strictly before
    /// the order insert.
    async fn place_wallet_order(
        db: &DatabaseConnection,
        aggregator: Option<&dyn CommissionAggregator>,
        agent_id: i64,
        bundle: &data_bundle::Model,
        recipient: &str,
        reference_code: &str,
    ) -> Result<data_order::Model> {
        // Fresh advisory check: other spending may have happened since the
        // bundle was selected
        let spendable = balance::get_spendable_balance(db, aggregator, agent_id).await;
        if spendable.amount < bundle.price {
            return Err(Error::InsufficientFunds {
                available: spendable.amount,
                required: bundle.price,
            });
        }

        let txn = db.begin().await?;

        // Authoritative check: the ledger itself, read inside the same store
        // transaction as the writes it guards
        let ledger_balance = balance::replay_ledger_balance(&txn, agent_id).await?;
        if ledger_balance < bundle.price {
            return Err(Error::InsufficientFunds {
                available: ledger_balance,
                required: bundle.price,
            });
        }

        let deduction = ledger::append_transaction(
            &txn,
            agent_id,
            TransactionType::Deduction,
            bundle.price,
            format!("Wallet payment for {}", bundle.display_name()),
            reference_code.to_string(),
            TransactionStatus::Approved,
            Some((ORDER_SOURCE_TYPE.to_string(), reference_code.to_string())),
        )
        .await?;

        let order = Self::insert_order(
            &txn,
            agent_id,
            bundle,
            recipient,
            PaymentMethod::Wallet,
            reference_code,
            OrderStatus::Processing,
        )
        .await?;
        duplicate::record_order_attempt(&txn, bundle.id, recipient, PaymentMethod::Wallet).await?;
        draft::clear_draft(&txn, agent_id).await?;

        txn.commit().await?;
        info!(
            agent_id,
            deduction_id = deduction.id,
            order_id = order.id,
            "wallet charged and order recorded"
        );
        Ok(order)
    }

    async fn insert_order<C>(
        db: &C,
        agent_id: i64,
        bundle: &data_bundle::Model,
        recipient: &str,
        payment_method: PaymentMethod,
        reference_code: &str,
        status: OrderStatus,
    ) -> Result<data_order::Model>
    where
        C: ConnectionTrait,
    {
        let order = data_order::ActiveModel {
            agent_id: Set(agent_id),
            bundle_id: Set(bundle.id),
            recipient_phone: Set(recipient.to_string()),
            payment_method: Set(payment_method),
            payment_reference: Set(reference_code.to_string()),
            amount: Set(bundle.price),
            status: Set(status),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        order.insert(db).await.map_err(Into::into)
    }

    fn require_bundle(&self) -> Result<&data_bundle::Model> {
        self.bundle.as_ref().ok_or(Error::InvalidTransition {
            state: self.state.name(),
            action: "read the selected bundle",
        })
    }

    fn require_recipient_phone(&self) -> Result<&str> {
        self.recipient_phone
            .as_deref()
            .ok_or(Error::InvalidTransition {
                state: self.state.name(),
                action: "read the recipient phone",
            })
    }

    fn require_payment_method(&self) -> Result<PaymentMethod> {
        self.payment_method.ok_or(Error::InvalidTransition {
            state: self.state.name(),
            action: "read the payment method",
        })
    }
}
