//! One generic step form. Each wizard step is described by a `StepDescriptor`
//! (its fields and validation schema); `StepForm` handles editing, touched
//! tracking and submission identically for all of them.

use chrono::Month;
use crossterm::event::KeyCode;
use regex::Regex;

use crate::error::Result;
use crate::models::{
    DurationMonths, PaymentInfo, ShippingInfo, SizeGb, StepKey, StepSlice, SubscriptionSelection,
};
use crate::validation::{
    visible_error, FieldErrors, FieldValues, Rule, Schema, Touched, EMAIL_PATTERN,
};

pub const DURATION: &str = "duration_months";
pub const SIZE: &str = "size_gb";
pub const UPFRONT: &str = "upfront_payment";
pub const LAST_NAME: &str = "last_name";
pub const FIRST_NAME: &str = "first_name";
pub const EMAIL: &str = "email";
pub const STREET: &str = "street_address";
pub const CARD_NUMBER: &str = "card_number";
pub const EXP_MONTH: &str = "exp_month";
pub const EXP_YEAR: &str = "exp_year";
pub const CVV: &str = "cvv";
pub const AGREE: &str = "agree_to_terms";

/// Inputs for option lists and date-dependent rules.
#[derive(Debug, Clone, Copy)]
pub struct FormConfig {
    pub current_year: i32,
    /// Number of years offered in the expiry-year selector, starting at `current_year`.
    pub expiry_years_ahead: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    /// Text input rendered as bullets.
    Masked,
    Select(Vec<SelectOption>),
    Toggle,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind }
    }
}

#[derive(Clone)]
pub struct StepDescriptor {
    pub key: StepKey,
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
    pub schema: Schema,
}

impl StepDescriptor {
    pub fn for_step(key: StepKey, config: &FormConfig) -> Result<Self> {
        match key {
            StepKey::Subscription => Ok(subscription_descriptor()),
            StepKey::Shipping => shipping_descriptor(),
            StepKey::Payment => payment_descriptor(config),
            StepKey::Confirmation => Ok(confirmation_descriptor()),
        }
    }
}

fn subscription_descriptor() -> StepDescriptor {
    let durations = DurationMonths::ALL
        .iter()
        .map(|d| SelectOption::new(d.months().to_string(), d.label()))
        .collect();
    let sizes = SizeGb::ALL
        .iter()
        .map(|s| SelectOption::new(s.gigabytes().to_string(), s.label()))
        .collect();
    let upfront = vec![SelectOption::new("yes", "Yes"), SelectOption::new("no", "No")];

    StepDescriptor {
        key: StepKey::Subscription,
        title: "Select Your Subscription",
        fields: vec![
            FieldSpec::new(DURATION, "Duration", FieldKind::Select(durations)),
            FieldSpec::new(SIZE, "Size", FieldKind::Select(sizes)),
            FieldSpec::new(UPFRONT, "Upfront payment", FieldKind::Select(upfront)),
        ],
        schema: Schema::new()
            .field(DURATION, vec![Rule::Required("Required")])
            .field(SIZE, vec![Rule::Required("Required")])
            .field(UPFRONT, vec![Rule::Required("Required")]),
    }
}

fn shipping_descriptor() -> Result<StepDescriptor> {
    Ok(StepDescriptor {
        key: StepKey::Shipping,
        title: "Shipping Details",
        fields: vec![
            FieldSpec::new(LAST_NAME, "Last name", FieldKind::Text),
            FieldSpec::new(FIRST_NAME, "First name", FieldKind::Text),
            FieldSpec::new(EMAIL, "Email", FieldKind::Text),
            FieldSpec::new(STREET, "Street address", FieldKind::Text),
        ],
        schema: Schema::new()
            .field(LAST_NAME, vec![Rule::Required("Required")])
            .field(FIRST_NAME, vec![Rule::Required("Required")])
            .field(
                EMAIL,
                vec![
                    Rule::Required("Required"),
                    Rule::Matches(Regex::new(EMAIL_PATTERN)?, "Invalid email"),
                ],
            )
            .field(STREET, vec![Rule::Required("Required")]),
    })
}

fn payment_descriptor(config: &FormConfig) -> Result<StepDescriptor> {
    let months = (1..=12u8)
        .filter_map(|m| {
            let name = Month::try_from(m).ok()?.name();
            Some(SelectOption::new(format!("{m:02}"), format!("{name}({m:02})")))
        })
        .collect();
    let years = (0..config.expiry_years_ahead)
        .map(|offset| {
            let year = (config.current_year + offset as i32).to_string();
            SelectOption::new(year.clone(), year)
        })
        .collect();

    Ok(StepDescriptor {
        key: StepKey::Payment,
        title: "Payment Details",
        fields: vec![
            FieldSpec::new(CARD_NUMBER, "Card number", FieldKind::Text),
            FieldSpec::new(EXP_MONTH, "Month", FieldKind::Select(months)),
            FieldSpec::new(EXP_YEAR, "Year", FieldKind::Select(years)),
            FieldSpec::new(CVV, "CVV", FieldKind::Masked),
        ],
        schema: Schema::new()
            .field(
                CARD_NUMBER,
                vec![
                    Rule::Required("Required"),
                    Rule::Matches(Regex::new(r"^\d{16}$")?, "16 digits required"),
                ],
            )
            .field(
                EXP_MONTH,
                vec![
                    Rule::Required("Required"),
                    Rule::Matches(Regex::new(r"^(0[1-9]|1[0-2])$")?, "Invalid month"),
                ],
            )
            .field(
                EXP_YEAR,
                vec![
                    Rule::Required("Required"),
                    Rule::Matches(Regex::new(r"^\d{4}$")?, "Invalid year"),
                    Rule::AtLeast(i64::from(config.current_year), "Card has expired"),
                ],
            )
            .field(
                CVV,
                vec![
                    Rule::Required("Required"),
                    Rule::MinLen(3, "Min. 3 characters"),
                    Rule::MaxLen(4, "Max. 4 characters"),
                    Rule::Matches(Regex::new(r"^\S*$")?, "No white spaces"),
                    Rule::Digits("Digits only"),
                ],
            ),
    })
}

fn confirmation_descriptor() -> StepDescriptor {
    StepDescriptor {
        key: StepKey::Confirmation,
        title: "Confirm your order",
        fields: vec![FieldSpec::new(
            AGREE,
            "Agree to Terms and Conditions",
            FieldKind::Toggle,
        )],
        schema: Schema::new().field(AGREE, vec![Rule::Checked("You must agree to the terms")]),
    }
}

/// Conversion between a draft slice and the raw value bag a form edits.
pub trait FormData: Sized {
    fn to_values(&self) -> FieldValues;
    /// Build the slice from values that already passed validation.
    fn from_values(values: &FieldValues) -> Option<Self>;
}

fn value<'a>(values: &'a FieldValues, name: &str) -> &'a str {
    values.get(name).map(String::as_str).unwrap_or("")
}

impl FormData for SubscriptionSelection {
    fn to_values(&self) -> FieldValues {
        FieldValues::from([
            (DURATION, self.duration_months.months().to_string()),
            (SIZE, self.size_gb.gigabytes().to_string()),
            (UPFRONT, if self.upfront_payment { "yes" } else { "no" }.to_string()),
        ])
    }

    fn from_values(values: &FieldValues) -> Option<Self> {
        let months: u32 = value(values, DURATION).parse().ok()?;
        let size: u32 = value(values, SIZE).parse().ok()?;
        Some(Self {
            duration_months: DurationMonths::try_from(months).ok()?,
            size_gb: SizeGb::try_from(size).ok()?,
            upfront_payment: value(values, UPFRONT) == "yes",
        })
    }
}

impl FormData for ShippingInfo {
    fn to_values(&self) -> FieldValues {
        FieldValues::from([
            (LAST_NAME, self.last_name.clone()),
            (FIRST_NAME, self.first_name.clone()),
            (EMAIL, self.email.clone()),
            (STREET, self.street_address.clone()),
        ])
    }

    fn from_values(values: &FieldValues) -> Option<Self> {
        Some(Self {
            last_name: value(values, LAST_NAME).trim().to_string(),
            first_name: value(values, FIRST_NAME).trim().to_string(),
            email: value(values, EMAIL).trim().to_string(),
            street_address: value(values, STREET).trim().to_string(),
        })
    }
}

impl FormData for PaymentInfo {
    fn to_values(&self) -> FieldValues {
        FieldValues::from([
            (CARD_NUMBER, self.card_number.clone()),
            (EXP_MONTH, self.exp_month.clone()),
            (EXP_YEAR, self.exp_year.clone()),
            (CVV, self.cvv.clone()),
        ])
    }

    fn from_values(values: &FieldValues) -> Option<Self> {
        Some(Self {
            card_number: value(values, CARD_NUMBER).to_string(),
            exp_month: value(values, EXP_MONTH).to_string(),
            exp_year: value(values, EXP_YEAR).to_string(),
            cvv: value(values, CVV).to_string(),
        })
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Advance(StepSlice),
    Confirm,
}

fn outcome(key: StepKey, values: &FieldValues) -> Option<StepOutcome> {
    let slice = match key {
        StepKey::Subscription => StepSlice::Subscription(SubscriptionSelection::from_values(values)?),
        StepKey::Shipping => StepSlice::Shipping(ShippingInfo::from_values(values)?),
        StepKey::Payment => StepSlice::Payment(PaymentInfo::from_values(values)?),
        StepKey::Confirmation => return Some(StepOutcome::Confirm),
    };
    Some(StepOutcome::Advance(slice))
}

pub enum FormAction {
    Continue,
    Submitted(StepOutcome),
    Back,
}

pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    /// Selected option index for `Select` fields.
    pub selected: Option<usize>,
}

impl FormField {
    pub fn display_value(&self) -> String {
        match &self.kind {
            FieldKind::Text => self.value.clone(),
            FieldKind::Masked => "\u{25cf}".repeat(self.value.chars().count()),
            FieldKind::Select(options) => self
                .selected
                .and_then(|i| options.get(i))
                .map(|o| o.label.clone())
                .unwrap_or_else(|| "Select...".to_string()),
            FieldKind::Toggle => {
                if self.value == "true" {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
        }
    }

    fn is_editable_text(&self) -> bool {
        matches!(self.kind, FieldKind::Text | FieldKind::Masked)
    }
}

pub struct StepForm {
    key: StepKey,
    title: &'static str,
    schema: Schema,
    fields: Vec<FormField>,
    focused: usize,
    touched: Touched,
    errors: FieldErrors,
}

impl StepForm {
    /// Build a form for `descriptor`, pre-filled from `values` (a slice snapshot).
    pub fn new(descriptor: StepDescriptor, values: &FieldValues) -> Self {
        let fields = descriptor
            .fields
            .into_iter()
            .map(|spec| {
                let raw = value(values, spec.name).to_string();
                let (value, selected) = match &spec.kind {
                    FieldKind::Select(options) => {
                        match options.iter().position(|o| o.value == raw) {
                            Some(i) => (raw, Some(i)),
                            None => (String::new(), None),
                        }
                    }
                    FieldKind::Toggle => {
                        let on = raw == "true";
                        (on.to_string(), None)
                    }
                    FieldKind::Text | FieldKind::Masked => (raw, None),
                };
                FormField {
                    name: spec.name,
                    label: spec.label,
                    kind: spec.kind,
                    value,
                    selected,
                }
            })
            .collect();

        let mut form = Self {
            key: descriptor.key,
            title: descriptor.title,
            schema: descriptor.schema,
            fields,
            focused: 0,
            touched: Touched::default(),
            errors: FieldErrors::new(),
        };
        form.revalidate();
        form
    }

    pub fn key(&self) -> StepKey {
        self.key
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn values(&self) -> FieldValues {
        self.fields.iter().map(|f| (f.name, f.value.clone())).collect()
    }

    /// The message to show under `field`, gated on the field being touched.
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        visible_error(&self.errors, &self.touched, field)
    }

    fn revalidate(&mut self) {
        self.errors = self.schema.validate(&self.values());
    }

    fn touch_focused(&mut self) {
        if let Some(field) = self.fields.get(self.focused) {
            self.touched.touch(field.name);
        }
    }

    pub fn focus_next(&mut self) {
        self.touch_focused();
        self.focused = (self.focused + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.touch_focused();
        self.focused = if self.focused == 0 {
            self.fields.len() - 1
        } else {
            self.focused - 1
        };
    }

    /// Replace a field's raw value, as if the user had edited it.
    pub fn set_value(&mut self, name: &str, raw: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            match &field.kind {
                FieldKind::Select(options) => {
                    field.selected = options.iter().position(|o| o.value == raw);
                    field.value = if field.selected.is_some() {
                        raw.to_string()
                    } else {
                        String::new()
                    };
                }
                _ => field.value = raw.to_string(),
            }
            self.touched.touch(field.name);
        }
        self.revalidate();
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut FormField)) {
        let field = &mut self.fields[self.focused];
        edit(field);
        self.touched.touch(field.name);
        self.revalidate();
    }

    pub fn input_char(&mut self, c: char) {
        if self.fields[self.focused].is_editable_text() {
            self.edit_focused(|f| f.value.push(c));
        }
    }

    pub fn backspace(&mut self) {
        if self.fields[self.focused].is_editable_text() {
            self.edit_focused(|f| {
                f.value.pop();
            });
        }
    }

    /// Step a selector forward or backward, wrapping around.
    pub fn cycle(&mut self, forward: bool) {
        self.edit_focused(|f| {
            if let FieldKind::Select(options) = &f.kind {
                if options.is_empty() {
                    return;
                }
                let next = match (f.selected, forward) {
                    (None, true) => 0,
                    (None, false) => options.len() - 1,
                    (Some(i), true) => (i + 1) % options.len(),
                    (Some(i), false) => (i + options.len() - 1) % options.len(),
                };
                f.selected = Some(next);
                f.value = options[next].value.clone();
            }
        });
    }

    pub fn toggle(&mut self) {
        if matches!(self.fields[self.focused].kind, FieldKind::Toggle) {
            self.edit_focused(|f| {
                let on = f.value == "true";
                f.value = (!on).to_string();
            });
        }
    }

    /// Attempt submission. Marks every field touched so all errors become visible;
    /// returns `None` while any rule fails.
    pub fn submit(&mut self) -> Option<StepOutcome> {
        let names: Vec<&'static str> = self.fields.iter().map(|f| f.name).collect();
        self.touched.touch_all(&names);
        self.revalidate();
        if !self.errors.is_empty() {
            return None;
        }
        outcome(self.key, &self.values())
    }

    pub fn handle_key(&mut self, code: KeyCode) -> FormAction {
        match code {
            KeyCode::Enter => {
                if let Some(outcome) = self.submit() {
                    return FormAction::Submitted(outcome);
                }
            }
            KeyCode::Esc => return FormAction::Back,
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Left => self.cycle(false),
            KeyCode::Right => self.cycle(true),
            KeyCode::Char(' ') if matches!(self.fields[self.focused].kind, FieldKind::Toggle) => {
                self.toggle();
            }
            KeyCode::Char(c) => self.input_char(c),
            KeyCode::Backspace => self.backspace(),
            _ => {}
        }
        FormAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FormConfig {
        FormConfig {
            current_year: 2026,
            expiry_years_ahead: 50,
        }
    }

    fn form(key: StepKey, values: &FieldValues) -> StepForm {
        StepForm::new(StepDescriptor::for_step(key, &config()).unwrap(), values)
    }

    fn payment_form(card: &str) -> StepForm {
        let payment = PaymentInfo {
            card_number: card.into(),
            exp_month: "01".into(),
            exp_year: "2030".into(),
            cvv: "123".into(),
        };
        form(StepKey::Payment, &payment.to_values())
    }

    #[test]
    fn default_subscription_submits_unchanged() {
        let selection = SubscriptionSelection::default();
        let mut f = form(StepKey::Subscription, &selection.to_values());
        assert_eq!(
            f.submit(),
            Some(StepOutcome::Advance(StepSlice::Subscription(selection)))
        );
    }

    #[test]
    fn year_options_start_at_current_year() {
        let d = StepDescriptor::for_step(StepKey::Payment, &config()).unwrap();
        let FieldKind::Select(years) = &d.fields[2].kind else {
            panic!("expiry year should be a selector");
        };
        assert_eq!(years.len(), 50);
        assert_eq!(years[0].value, "2026");
        assert_eq!(years[49].value, "2075");
    }

    #[test]
    fn month_options_are_labelled() {
        let d = StepDescriptor::for_step(StepKey::Payment, &config()).unwrap();
        let FieldKind::Select(months) = &d.fields[1].kind else {
            panic!("expiry month should be a selector");
        };
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], SelectOption::new("01", "January(01)"));
        assert_eq!(months[11], SelectOption::new("12", "December(12)"));
    }

    #[test]
    fn fifteen_digit_card_blocks_submission() {
        let mut f = payment_form("123456781234567");
        assert!(f.submit().is_none());
        assert_eq!(f.visible_error(CARD_NUMBER), Some("16 digits required"));
    }

    #[test]
    fn valid_payment_submits() {
        let mut f = payment_form("1234567812345678");
        match f.submit() {
            Some(StepOutcome::Advance(StepSlice::Payment(p))) => {
                assert_eq!(p.card_number, "1234567812345678");
                assert_eq!(p.exp_year, "2030");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn errors_stay_hidden_until_blur_or_submit() {
        let mut f = form(StepKey::Shipping, &ShippingInfo::default().to_values());
        assert!(!f.errors().is_empty());
        assert_eq!(f.visible_error(LAST_NAME), None);
        f.focus_next();
        assert_eq!(f.visible_error(LAST_NAME), Some("Required"));
        assert_eq!(f.visible_error(FIRST_NAME), None);
        assert!(f.submit().is_none());
        assert_eq!(f.visible_error(STREET), Some("Required"));
    }

    #[test]
    fn typing_updates_value_and_errors() {
        let mut f = form(StepKey::Shipping, &ShippingInfo::default().to_values());
        f.focused = 2;
        for c in "jane@x".chars() {
            f.handle_key(KeyCode::Char(c));
        }
        assert_eq!(f.visible_error(EMAIL), Some("Invalid email"));
        for c in ".com".chars() {
            f.handle_key(KeyCode::Char(c));
        }
        assert_eq!(f.visible_error(EMAIL), None);
        f.handle_key(KeyCode::Backspace);
        assert_eq!(f.values()[EMAIL], "jane@x.co");
    }

    #[test]
    fn malformed_email_blocks_shipping() {
        let mut f = form(StepKey::Shipping, &ShippingInfo::default().to_values());
        f.set_value(LAST_NAME, "Doe");
        f.set_value(FIRST_NAME, "Jane");
        f.set_value(STREET, "1 Main St");
        for bad in ["jane@x_y.com", "<jane>@x.com", "a,b@x.com"] {
            f.set_value(EMAIL, bad);
            assert!(f.submit().is_none(), "{bad} should be rejected");
            assert_eq!(f.visible_error(EMAIL), Some("Invalid email"));
        }
        f.set_value(EMAIL, "jane@x.com");
        assert!(f.submit().is_some());
    }

    #[test]
    fn shipping_submission_trims_values() {
        let mut f = form(StepKey::Shipping, &ShippingInfo::default().to_values());
        f.set_value(LAST_NAME, " Doe ");
        f.set_value(FIRST_NAME, "Jane");
        f.set_value(EMAIL, "jane@x.com");
        f.set_value(STREET, "1 Main St");
        match f.submit() {
            Some(StepOutcome::Advance(StepSlice::Shipping(s))) => assert_eq!(s.last_name, "Doe"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn selector_cycles_and_wraps() {
        let mut f = form(StepKey::Subscription, &SubscriptionSelection::default().to_values());
        // Duration starts at 12 months, the last option.
        f.handle_key(KeyCode::Right);
        assert_eq!(f.values()[DURATION], "3");
        f.handle_key(KeyCode::Left);
        assert_eq!(f.values()[DURATION], "12");
    }

    #[test]
    fn empty_selector_starts_unselected() {
        let f = form(StepKey::Payment, &PaymentInfo::default().to_values());
        assert_eq!(f.fields()[1].display_value(), "Select...");
        assert_eq!(f.errors().get(EXP_MONTH).map(String::as_str), Some("Required"));
    }

    #[test]
    fn typing_is_ignored_on_selectors() {
        let mut f = form(StepKey::Subscription, &SubscriptionSelection::default().to_values());
        f.handle_key(KeyCode::Char('9'));
        assert_eq!(f.values()[DURATION], "12");
    }

    #[test]
    fn cvv_is_masked() {
        let f = payment_form("1234567812345678");
        assert_eq!(f.fields()[3].display_value(), "\u{25cf}\u{25cf}\u{25cf}");
    }

    #[test]
    fn confirmation_requires_agreement() {
        let mut f = form(StepKey::Confirmation, &FieldValues::new());
        assert!(f.submit().is_none());
        assert_eq!(f.visible_error(AGREE), Some("You must agree to the terms"));
        f.handle_key(KeyCode::Char(' '));
        assert!(matches!(f.handle_key(KeyCode::Enter), FormAction::Submitted(StepOutcome::Confirm)));
    }

    #[test]
    fn esc_requests_back() {
        let mut f = form(StepKey::Shipping, &ShippingInfo::default().to_values());
        assert!(matches!(f.handle_key(KeyCode::Esc), FormAction::Back));
    }

    #[test]
    fn focus_wraps_both_directions() {
        let mut f = form(StepKey::Shipping, &ShippingInfo::default().to_values());
        f.handle_key(KeyCode::Up);
        assert_eq!(f.focused(), 3);
        f.handle_key(KeyCode::Tab);
        assert_eq!(f.focused(), 0);
    }
}
