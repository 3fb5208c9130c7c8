use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::Frame;

use crate::error::Result;
use crate::fmt::money;
use crate::wizard::WizardStep;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const ERROR_STYLE: Style = Style::new().fg(Color::Red);

pub const SAVINGS_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));

pub const STRUCK_STYLE: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::CROSSED_OUT);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Price display: the payable amount, plus the struck-through original and the
/// savings when paying upfront.
pub fn price_spans(discounted: f64, total: f64, savings: f64, upfront: bool) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(
        money(discounted),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if upfront {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(money(total), STRUCK_STYLE));
        spans.push(Span::styled(format!("  you save {}", money(savings)), SAVINGS_STYLE));
    }
    spans
}

/// Progress indicator: completed steps ticked, the active step highlighted.
pub fn stepper_line(steps: &[WizardStep], active: usize) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for step in steps {
        if step.index > 0 {
            spans.push(Span::styled(" ── ", FOOTER_STYLE));
        }
        let (marker, style) = if step.index < active {
            ("\u{2713}", Style::default().fg(Color::Green))
        } else if step.index == active {
            ("\u{25cf}", HEADER_STYLE)
        } else {
            ("\u{25cb}", FOOTER_STYLE)
        };
        spans.push(Span::styled(format!("{marker} {}", step.label), style));
    }
    Line::from(spans)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

pub enum ViewAction {
    Continue,
    Close,
}

pub trait TuiView {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ViewAction;
}

/// Run an interactive ratatui view. Sets up the terminal, event loop,
/// and panic hook, then restores the terminal on exit.
pub fn run_view(view: &mut dyn TuiView) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| view.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match view.handle_key(key.code) {
                    ViewAction::Close => break Ok(()),
                    ViewAction::Continue => {}
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}
