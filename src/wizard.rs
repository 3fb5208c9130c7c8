//! Checkout state machine. `WizardState` is a plain value with pure
//! transitions; `Wizard` owns the step list, pricing and back-navigation
//! policy, and hands the finished order to an `OrderSink`.

use tracing::{debug, info};

use crate::fmt::mask_card;
use crate::models::{OrderDraft, StepKey, StepSlice};
use crate::pricing::{OrderSummary, PricingConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardStep {
    pub index: usize,
    pub label: &'static str,
    pub key: StepKey,
}

pub fn default_steps() -> Vec<WizardStep> {
    [
        ("Subscription details", StepKey::Subscription),
        ("Personal details", StepKey::Shipping),
        ("Payment details", StepKey::Payment),
        ("Confirmation", StepKey::Confirmation),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (label, key))| WizardStep { index, label, key })
    .collect()
}

/// What happens to the slice of the step being left when the user goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackPolicy {
    /// Keep everything entered so far.
    Keep,
    /// Reset the slice of the step being left to its defaults.
    #[default]
    ClearLeft,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub active_step: usize,
    pub draft: OrderDraft,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `slice` into its draft slot and move forward, never past `last_index`.
    pub fn advance(&self, slice: StepSlice, last_index: usize) -> WizardState {
        let mut next = self.clone();
        next.draft.merge(slice);
        next.active_step = (self.active_step + 1).min(last_index);
        next
    }

    /// Move back to `target`, optionally resetting one slice. Targets at or
    /// beyond the active step leave the state unchanged.
    pub fn retreat(&self, target: usize, clear: Option<StepKey>) -> WizardState {
        if target >= self.active_step {
            return self.clone();
        }
        let mut next = self.clone();
        next.active_step = target;
        if let Some(key) = clear {
            next.draft.reset_slice(key);
        }
        next
    }
}

/// Receives the full draft once the user confirms the order.
pub trait OrderSink {
    fn order_confirmed(&mut self, draft: &OrderDraft);
}

impl<F: FnMut(&OrderDraft)> OrderSink for F {
    fn order_confirmed(&mut self, draft: &OrderDraft) {
        self(draft)
    }
}

pub struct Wizard {
    steps: Vec<WizardStep>,
    state: WizardState,
    pricing: PricingConfig,
    policy: BackPolicy,
    sink: Box<dyn OrderSink>,
    confirmed: bool,
}

impl Wizard {
    pub fn new(
        steps: Vec<WizardStep>,
        pricing: PricingConfig,
        policy: BackPolicy,
        sink: Box<dyn OrderSink>,
    ) -> Self {
        Self {
            steps,
            state: WizardState::new(),
            pricing,
            policy,
            sink,
            confirmed: false,
        }
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.state.draft
    }

    pub fn current_step(&self) -> &WizardStep {
        &self.steps[self.state.active_step]
    }

    pub fn is_last_step(&self) -> bool {
        self.state.active_step + 1 == self.steps.len()
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn advance(&mut self, slice: StepSlice) -> &WizardState {
        let key = slice.key();
        self.state = self.state.advance(slice, self.last_index());
        debug!(slice = %key, step = self.state.active_step, "advanced");
        &self.state
    }

    pub fn retreat(&mut self, target: usize, clear: Option<StepKey>) -> &WizardState {
        if target >= self.state.active_step {
            debug!(target, active = self.state.active_step, "ignored forward retreat");
            return &self.state;
        }
        self.state = self.state.retreat(target, clear);
        debug!(step = target, cleared = ?clear, "retreated");
        &self.state
    }

    /// Go back one step, applying the configured back policy to the step being left.
    pub fn back(&mut self) -> &WizardState {
        let active = self.state.active_step;
        if active == 0 {
            return &self.state;
        }
        let clear = match self.policy {
            BackPolicy::Keep => None,
            BackPolicy::ClearLeft => Some(self.steps[active].key),
        };
        self.retreat(active - 1, clear)
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary::compute(&self.state.draft.subscription, &self.pricing)
    }

    pub fn order_lines(&self) -> Vec<String> {
        order_lines(&self.state.draft, &self.pricing)
    }

    /// Hand the order to the sink. Only possible on the final step; returns
    /// whether the order was confirmed.
    pub fn confirm(&mut self) -> bool {
        if !self.is_last_step() {
            return false;
        }
        let draft = &self.state.draft;
        info!(
            size_gb = draft.subscription.size_gb.gigabytes(),
            months = draft.subscription.duration_months.months(),
            upfront = draft.subscription.upfront_payment,
            card = %mask_card(&draft.payment.card_number),
            "order confirmed"
        );
        self.sink.order_confirmed(draft);
        self.confirmed = true;
        true
    }
}

/// Human-readable order summary shown on the confirmation step.
pub fn order_lines(draft: &OrderDraft, pricing: &PricingConfig) -> Vec<String> {
    let sub = &draft.subscription;
    let mut lines = vec![
        format!(
            "Plan: {} for {}",
            sub.size_gb.label(),
            sub.duration_months.label()
        ),
        format!(
            "Upfront payment: {}",
            if sub.upfront_payment { "Yes" } else { "No" }
        ),
    ];
    lines.extend(OrderSummary::compute(sub, pricing).lines());

    let ship = &draft.shipping;
    lines.push(format!("Name: {} {}", ship.first_name, ship.last_name));
    lines.push(format!("Email: {}", ship.email));
    lines.push(format!("Address: {}", ship.street_address));

    let pay = &draft.payment;
    lines.push(format!(
        "Card: {} (exp {}/{})",
        mask_card(&pay.card_number),
        pay.exp_month,
        pay.exp_year
    ));
    lines
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::models::{
        DurationMonths, PaymentInfo, ShippingInfo, SizeGb, SubscriptionSelection,
    };

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            last_name: "Doe".into(),
            first_name: "Jane".into(),
            email: "jane@x.com".into(),
            street_address: "1 Main St".into(),
        }
    }

    fn payment() -> PaymentInfo {
        PaymentInfo {
            card_number: "1234567812345678".into(),
            exp_month: "01".into(),
            exp_year: "2030".into(),
            cvv: "123".into(),
        }
    }

    fn wizard(policy: BackPolicy) -> (Wizard, Rc<RefCell<Vec<OrderDraft>>>) {
        let orders = Rc::new(RefCell::new(Vec::new()));
        let sink_orders = Rc::clone(&orders);
        let sink = move |draft: &OrderDraft| sink_orders.borrow_mut().push(draft.clone());
        let w = Wizard::new(
            default_steps(),
            PricingConfig::default(),
            policy,
            Box::new(sink),
        );
        (w, orders)
    }

    #[test]
    fn default_steps_are_indexed_in_order() {
        let steps = default_steps();
        assert_eq!(steps.len(), 4);
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.index, i);
        }
        assert_eq!(steps[3].key, StepKey::Confirmation);
    }

    #[test]
    fn advance_never_passes_last_step() {
        let mut state = WizardState::new();
        for _ in 0..10 {
            let before = state.active_step;
            state = state.advance(StepSlice::Shipping(shipping()), 3);
            assert!(state.active_step >= before);
            assert!(state.active_step <= 3);
        }
        assert_eq!(state.active_step, 3);
    }

    #[test]
    fn advance_mutates_only_named_slice() {
        let mut state = WizardState::new();
        state.draft.payment = payment();
        let before = state.clone();
        let next = state.advance(StepSlice::Shipping(shipping()), 3);
        assert_eq!(next.draft.subscription, before.draft.subscription);
        assert_eq!(next.draft.payment, before.draft.payment);
        assert_eq!(next.draft.shipping, shipping());
    }

    #[test]
    fn retreat_forward_is_a_no_op() {
        let state = WizardState {
            active_step: 2,
            draft: OrderDraft::default(),
        };
        assert_eq!(state.retreat(2, None), state);
        assert_eq!(state.retreat(3, Some(StepKey::Shipping)), state);
        assert_eq!(state.retreat(1, None).active_step, 1);
    }

    #[test]
    fn retreat_clears_requested_slice() {
        let mut state = WizardState {
            active_step: 2,
            draft: OrderDraft::default(),
        };
        state.draft.shipping = shipping();
        let next = state.retreat(1, Some(StepKey::Shipping));
        assert_eq!(next.draft.shipping, ShippingInfo::default());
    }

    #[test]
    fn back_with_keep_policy_preserves_data() {
        let (mut w, _) = wizard(BackPolicy::Keep);
        w.advance(StepSlice::Subscription(SubscriptionSelection::default()));
        w.advance(StepSlice::Shipping(shipping()));
        w.advance(StepSlice::Payment(payment()));
        w.back();
        assert_eq!(w.state().active_step, 2);
        assert_eq!(w.draft().payment, payment());
        w.back();
        assert_eq!(w.draft().payment, payment());
    }

    #[test]
    fn back_with_clear_policy_discards_left_step() {
        let (mut w, _) = wizard(BackPolicy::ClearLeft);
        w.advance(StepSlice::Subscription(SubscriptionSelection::default()));
        w.advance(StepSlice::Shipping(shipping()));
        w.advance(StepSlice::Payment(payment()));
        // Leaving confirmation owns no slice.
        w.back();
        assert_eq!(w.draft().payment, payment());
        // Leaving payment discards the card.
        w.back();
        assert_eq!(w.state().active_step, 1);
        assert!(w.draft().payment.card_number.is_empty());
        assert_eq!(w.draft().shipping, shipping());
    }

    #[test]
    fn back_at_first_step_stays_put() {
        let (mut w, _) = wizard(BackPolicy::ClearLeft);
        w.back();
        assert_eq!(w.state().active_step, 0);
    }

    #[test]
    fn summary_is_idempotent() {
        let (mut w, _) = wizard(BackPolicy::Keep);
        w.advance(StepSlice::Subscription(SubscriptionSelection {
            duration_months: DurationMonths::Six,
            size_gb: SizeGb::Gb20,
            upfront_payment: true,
        }));
        assert_eq!(w.summary(), w.summary());
    }

    #[test]
    fn confirm_only_on_last_step() {
        let (mut w, orders) = wizard(BackPolicy::Keep);
        assert!(!w.confirm());
        assert!(orders.borrow().is_empty());

        w.advance(StepSlice::Subscription(SubscriptionSelection::default()));
        w.advance(StepSlice::Shipping(shipping()));
        w.advance(StepSlice::Payment(payment()));
        assert!(w.confirm());
        assert!(w.is_confirmed());
        assert_eq!(orders.borrow().len(), 1);
        assert_eq!(orders.borrow()[0].shipping.first_name, "Jane");
        // Terminal step does not auto-advance.
        assert_eq!(w.state().active_step, 3);
    }

    #[test]
    fn full_scenario_shows_masked_card_and_price() {
        let (mut w, _) = wizard(BackPolicy::ClearLeft);
        let defaults = SubscriptionSelection::default();
        w.advance(StepSlice::Subscription(defaults.clone()));
        assert_eq!(w.state().active_step, 1);
        assert_eq!(w.draft().subscription, defaults);

        w.advance(StepSlice::Shipping(shipping()));
        assert_eq!(w.state().active_step, 2);

        w.advance(StepSlice::Payment(payment()));
        assert_eq!(w.state().active_step, 3);

        let text = w.order_lines().join("\n");
        assert!(text.contains("5678"));
        assert!(!text.contains("1234567812345678"));
        assert!(text.contains("$120.00"));
        assert!(text.contains("Plan: 5 GB for 12 Months"));
    }
}
