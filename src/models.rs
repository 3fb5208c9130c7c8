use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CheckoutError;
use crate::fmt::mask_card;

/// Identifies one wizard step and, for data-entry steps, its draft slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    Subscription,
    Shipping,
    Payment,
    Confirmation,
}

impl StepKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKey::Subscription => "subscription",
            StepKey::Shipping => "shipping",
            StepKey::Payment => "payment",
            StepKey::Confirmation => "confirmation",
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum DurationMonths {
    Three,
    Six,
    Twelve,
}

impl DurationMonths {
    pub const ALL: [DurationMonths; 3] = [Self::Three, Self::Six, Self::Twelve];

    pub fn months(self) -> u32 {
        match self {
            Self::Three => 3,
            Self::Six => 6,
            Self::Twelve => 12,
        }
    }

    pub fn label(self) -> String {
        format!("{} Months", self.months())
    }
}

impl TryFrom<u32> for DurationMonths {
    type Error = CheckoutError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.months() == value)
            .ok_or_else(|| {
                CheckoutError::InvalidOption(format!("duration must be 3, 6 or 12 months, got {value}"))
            })
    }
}

impl From<DurationMonths> for u32 {
    fn from(value: DurationMonths) -> Self {
        value.months()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SizeGb {
    Gb3,
    Gb5,
    Gb10,
    Gb20,
    Gb30,
    Gb50,
}

impl SizeGb {
    pub const ALL: [SizeGb; 6] = [
        Self::Gb3,
        Self::Gb5,
        Self::Gb10,
        Self::Gb20,
        Self::Gb30,
        Self::Gb50,
    ];

    pub fn gigabytes(self) -> u32 {
        match self {
            Self::Gb3 => 3,
            Self::Gb5 => 5,
            Self::Gb10 => 10,
            Self::Gb20 => 20,
            Self::Gb30 => 30,
            Self::Gb50 => 50,
        }
    }

    pub fn label(self) -> String {
        format!("{} GB", self.gigabytes())
    }
}

impl TryFrom<u32> for SizeGb {
    type Error = CheckoutError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.gigabytes() == value)
            .ok_or_else(|| {
                CheckoutError::InvalidOption(format!(
                    "size must be one of 3, 5, 10, 20, 30, 50 GB, got {value}"
                ))
            })
    }
}

impl From<SizeGb> for u32 {
    fn from(value: SizeGb) -> Self {
        value.gigabytes()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSelection {
    pub duration_months: DurationMonths,
    pub size_gb: SizeGb,
    #[serde(default)]
    pub upfront_payment: bool,
}

impl Default for SubscriptionSelection {
    fn default() -> Self {
        Self {
            duration_months: DurationMonths::Twelve,
            size_gb: SizeGb::Gb5,
            upfront_payment: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingInfo {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub street_address: String,
}

/// Card details. Wiped from memory on drop; `Debug` never prints the number or CVV.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub exp_month: String,
    #[serde(default)]
    pub exp_year: String,
    #[serde(default)]
    pub cvv: String,
}

impl PaymentInfo {
    pub fn clear(&mut self) {
        self.card_number.zeroize();
        self.exp_month.clear();
        self.exp_year.clear();
        self.cvv.zeroize();
    }
}

impl fmt::Debug for PaymentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentInfo")
            .field("card_number", &mask_card(&self.card_number))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvv", &"***")
            .finish()
    }
}

impl Drop for PaymentInfo {
    fn drop(&mut self) {
        self.card_number.zeroize();
        self.cvv.zeroize();
    }
}

/// Validated data for one step, tagged with the slice it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum StepSlice {
    Subscription(SubscriptionSelection),
    Shipping(ShippingInfo),
    Payment(PaymentInfo),
}

impl StepSlice {
    pub fn key(&self) -> StepKey {
        match self {
            StepSlice::Subscription(_) => StepKey::Subscription,
            StepSlice::Shipping(_) => StepKey::Shipping,
            StepSlice::Payment(_) => StepKey::Payment,
        }
    }
}

/// The accumulated order: one slice per data-entry step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub subscription: SubscriptionSelection,
    #[serde(default)]
    pub shipping: ShippingInfo,
    #[serde(default)]
    pub payment: PaymentInfo,
}

impl OrderDraft {
    /// Replace the slice named by `slice` and leave every other slice alone.
    pub fn merge(&mut self, slice: StepSlice) {
        match slice {
            StepSlice::Subscription(s) => self.subscription = s,
            StepSlice::Shipping(s) => self.shipping = s,
            StepSlice::Payment(p) => self.payment = p,
        }
    }

    /// Reset one slice to its default. The confirmation step owns no slice.
    pub fn reset_slice(&mut self, key: StepKey) {
        match key {
            StepKey::Subscription => self.subscription = SubscriptionSelection::default(),
            StepKey::Shipping => self.shipping = ShippingInfo::default(),
            StepKey::Payment => self.payment.clear(),
            StepKey::Confirmation => {}
        }
    }
}
