use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;

use crate::cli::checkout::slice_values;
use crate::error::{CheckoutError, Result};
use crate::models::{OrderDraft, StepKey};
use crate::settings::Settings;
use crate::steps::{StepDescriptor, StepForm, StepOutcome, AGREE};
use crate::validation::FieldErrors;
use crate::wizard::{default_steps, order_lines, Wizard};

/// A complete order as JSON: the draft slices plus the terms agreement.
#[derive(Debug, Deserialize)]
pub struct Submission {
    #[serde(flatten)]
    pub draft: OrderDraft,
    #[serde(default)]
    pub agree_to_terms: bool,
}

pub fn run(path: &Path, settings: &Settings) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let submission: Submission = serde_json::from_str(&content)?;
    let order = drive(&submission, settings)?;

    println!("Order confirmed");
    for line in order_lines(&order, &settings.pricing()) {
        println!("  {line}");
    }
    Ok(())
}

fn format_errors(label: &str, errors: &FieldErrors) -> String {
    let mut out = format!("{label}:");
    for (field, msg) in errors {
        out.push_str(&format!("\n  {field}: {msg}"));
    }
    out
}

/// Push the submission through every step exactly as the interactive wizard
/// would. Stops at the first step whose schema rejects its slice.
pub fn drive(submission: &Submission, settings: &Settings) -> Result<OrderDraft> {
    let confirmed: Rc<RefCell<Option<OrderDraft>>> = Rc::new(RefCell::new(None));
    let sink_slot = Rc::clone(&confirmed);
    let sink = move |draft: &OrderDraft| {
        *sink_slot.borrow_mut() = Some(draft.clone());
    };

    let config = settings.form_config();
    let mut wizard = Wizard::new(
        default_steps(),
        settings.pricing(),
        settings.back_policy(),
        Box::new(sink),
    );

    while !wizard.is_confirmed() {
        let step = wizard.current_step().clone();
        let mut form = StepForm::new(
            StepDescriptor::for_step(step.key, &config)?,
            &slice_values(&submission.draft, step.key),
        );
        if step.key == StepKey::Confirmation {
            form.set_value(AGREE, &submission.agree_to_terms.to_string());
        }
        match form.submit() {
            Some(StepOutcome::Advance(slice)) => {
                wizard.advance(slice);
            }
            Some(StepOutcome::Confirm) => {
                wizard.confirm();
            }
            None => {
                return Err(CheckoutError::Validation(format_errors(
                    step.label,
                    form.errors(),
                )))
            }
        }
    }

    let order = confirmed.borrow_mut().take();
    order.ok_or_else(|| CheckoutError::Other("order was not confirmed".into()))
}
