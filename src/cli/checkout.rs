use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::error::Result;
use crate::models::{OrderDraft, StepKey, SubscriptionSelection};
use crate::pricing::OrderSummary;
use crate::settings::Settings;
use crate::steps::{FieldKind, FormAction, FormData, StepDescriptor, StepForm, StepOutcome};
use crate::tui::{
    price_spans, run_view, stepper_line, wrap_text, TuiView, ViewAction, ERROR_STYLE,
    FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE,
};
use crate::validation::FieldValues;
use crate::wizard::{default_steps, OrderSink, Wizard};

/// Snapshot of the draft slice a step edits.
pub fn slice_values(draft: &OrderDraft, key: StepKey) -> FieldValues {
    match key {
        StepKey::Subscription => draft.subscription.to_values(),
        StepKey::Shipping => draft.shipping.to_values(),
        StepKey::Payment => draft.payment.to_values(),
        StepKey::Confirmation => FieldValues::new(),
    }
}

pub struct CheckoutApp {
    wizard: Wizard,
    descriptors: Vec<StepDescriptor>,
    form: StepForm,
    terms_link: String,
}

impl CheckoutApp {
    pub fn new(settings: &Settings, sink: Box<dyn OrderSink>) -> Result<Self> {
        let steps = default_steps();
        let config = settings.form_config();
        let descriptors = steps
            .iter()
            .map(|s| StepDescriptor::for_step(s.key, &config))
            .collect::<Result<Vec<_>>>()?;
        let wizard = Wizard::new(steps, settings.pricing(), settings.back_policy(), sink);
        let form = StepForm::new(
            descriptors[0].clone(),
            &slice_values(wizard.draft(), descriptors[0].key),
        );
        Ok(Self {
            wizard,
            descriptors,
            form,
            terms_link: settings.terms_link(),
        })
    }

    fn load_form(&mut self) {
        let descriptor = self.descriptors[self.wizard.state().active_step].clone();
        let values = slice_values(self.wizard.draft(), descriptor.key);
        self.form = StepForm::new(descriptor, &values);
    }

    fn draw_form_lines(&self, lines: &mut Vec<Line<'static>>) {
        for (i, field) in self.form.fields().iter().enumerate() {
            let is_focused = i == self.form.focused();
            let label_style = if is_focused {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let value_style = if is_focused {
                SELECTED_STYLE
            } else {
                Style::default().fg(Color::Cyan)
            };
            let shown = match (&field.kind, is_focused) {
                (FieldKind::Select(_), true) => format!("< {} >", field.display_value()),
                (FieldKind::Text | FieldKind::Masked, true) => format!("{}_", field.display_value()),
                _ => field.display_value(),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("   {:<30} ", field.label), label_style),
                Span::styled(shown, value_style),
            ]));
            if let Some(err) = self.form.visible_error(field.name) {
                lines.push(Line::from(Span::styled(
                    format!("   {:<30} {err}", ""),
                    ERROR_STYLE,
                )));
            }
        }
    }

    /// Price of the selection currently on screen, not the committed one.
    fn live_summary(&self) -> OrderSummary {
        match SubscriptionSelection::from_values(&self.form.values()) {
            Some(selection) => OrderSummary::compute(&selection, self.wizard.pricing()),
            None => self.wizard.summary(),
        }
    }

    fn draw_price(&self, lines: &mut Vec<Line<'static>>) {
        let summary = self.live_summary();
        let mut spans = vec![Span::styled(
            format!("   {:<30} ", "Price"),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        spans.extend(price_spans(
            summary.discounted_price,
            summary.total_price,
            summary.savings,
            summary.upfront_payment,
        ));
        lines.push(Line::from(spans));
    }

    fn draw_order(&self, lines: &mut Vec<Line<'static>>, width: usize) {
        for line in self.wizard.order_lines() {
            lines.push(Line::from(format!("   {line}")));
        }
        lines.push(Line::from(""));
        let (wrapped, _) = wrap_text(
            &format!("Terms and Conditions: {}", self.terms_link),
            width.saturating_sub(3),
        );
        for line in wrapped.lines() {
            lines.push(Line::from(Span::styled(format!("   {line}"), FOOTER_STYLE)));
        }
        lines.push(Line::from(""));
    }

    fn draw_confirmed(&self, frame: &mut Frame) {
        let area = frame.area();
        let [_top, msg_area, hint_area, _bottom] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);
        frame.render_widget(
            Paragraph::new(Span::styled("Thank you! Your order is confirmed.", HEADER_STYLE))
                .alignment(ratatui::layout::Alignment::Center),
            msg_area,
        );
        frame.render_widget(
            Paragraph::new("Press any key to exit")
                .style(FOOTER_STYLE)
                .alignment(ratatui::layout::Alignment::Center),
            hint_area,
        );
    }
}

impl TuiView for CheckoutApp {
    fn draw(&mut self, frame: &mut Frame) {
        if self.wizard.is_confirmed() {
            self.draw_confirmed(frame);
            return;
        }

        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep, stepper_area, content_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(" Checkout").style(HEADER_STYLE),
            header_area,
        );

        let sep_line = "━".repeat(area.width as usize);
        frame.render_widget(Paragraph::new(sep_line.as_str()).style(border_style), sep);

        frame.render_widget(
            Paragraph::new(stepper_line(
                self.wizard.steps(),
                self.wizard.state().active_step,
            )),
            stepper_area,
        );

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(" {}", self.form.title()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        match self.form.key() {
            StepKey::Subscription => {
                self.draw_form_lines(&mut lines);
                lines.push(Line::from(""));
                self.draw_price(&mut lines);
            }
            StepKey::Confirmation => {
                self.draw_order(&mut lines, content_area.width as usize);
                self.draw_form_lines(&mut lines);
            }
            StepKey::Shipping | StepKey::Payment => self.draw_form_lines(&mut lines),
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), content_area);

        let hints = if self.wizard.is_last_step() {
            " Space=agree  Enter=confirm  Esc=back  Ctrl+C=quit"
        } else {
            " Tab=next field  \u{2190}/\u{2192}=choose  Enter=next  Esc=back  Ctrl+C=quit"
        };
        frame.render_widget(Paragraph::new(hints).style(FOOTER_STYLE), hints_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        if self.wizard.is_confirmed() {
            return ViewAction::Close;
        }

        match self.form.handle_key(code) {
            FormAction::Continue => {}
            FormAction::Submitted(StepOutcome::Advance(slice)) => {
                self.wizard.advance(slice);
                self.load_form();
            }
            FormAction::Submitted(StepOutcome::Confirm) => {
                self.wizard.confirm();
            }
            FormAction::Back => {
                if self.wizard.state().active_step > 0 {
                    self.wizard.back();
                    self.load_form();
                }
            }
        }
        ViewAction::Continue
    }
}

/// Run the interactive checkout. Returns the confirmed order, or `None` if the
/// user quit before confirming.
pub fn run(settings: &Settings) -> Result<Option<OrderDraft>> {
    let confirmed: Rc<RefCell<Option<OrderDraft>>> = Rc::new(RefCell::new(None));
    let sink_slot = Rc::clone(&confirmed);
    let sink = move |draft: &OrderDraft| {
        *sink_slot.borrow_mut() = Some(draft.clone());
    };

    let mut app = CheckoutApp::new(settings, Box::new(sink))?;
    run_view(&mut app)?;
    drop(app);

    let order = confirmed.borrow_mut().take();
    Ok(order)
}
