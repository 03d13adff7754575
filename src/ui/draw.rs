use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Focus};
use crate::tip::TipTier;
use super::theme::Theme;

/// Drawn before the cost text
const INPUT_PREFIX: &str = "❯ ";

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = f.area();
    let bg_block = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Cost field
            Constraint::Length(5), // Tip options
            Constraint::Length(1), // Round up switch
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Calculate button
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Result
            Constraint::Min(0),
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_cost_field(f, app, chunks[0], theme);
    draw_tip_options(f, app, chunks[1], theme);
    draw_round_up(f, app, chunks[2], theme);
    draw_calculate_button(f, app, chunks[4], theme);
    draw_result(f, app, chunks[6], theme);
    draw_status_bar(f, app, chunks[8], theme);
}

/// Style for a control line, inverted when it has focus
fn control_style(focused: bool, theme: &Theme) -> Style {
    if focused {
        Style::default().fg(theme.selection_fg).bg(theme.selection_bg)
    } else {
        Style::default().fg(theme.foreground).bg(theme.background)
    }
}

fn border_style(focused: bool, theme: &Theme) -> Style {
    if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.dimmed_alt)
    }
}

/// Draw the cost of service input
fn draw_cost_field(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let focused = app.focus() == Focus::Cost;

    let (text, style) = if app.is_editing() {
        (
            format!("{}{}", INPUT_PREFIX, app.cost_text()),
            Style::default().fg(theme.input_highlight).bg(theme.background),
        )
    } else if app.cost_text().is_empty() {
        (
            format!("{}Type the bill amount...", INPUT_PREFIX),
            Style::default().fg(theme.dimmed).bg(theme.background),
        )
    } else {
        (
            format!("{}{}", INPUT_PREFIX, app.cost_text()),
            Style::default().fg(theme.foreground).bg(theme.background),
        )
    };

    let title = format!(" Cost of service ({}) ", app.currency_symbol());
    let field = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused, theme))
            .title(title)
            .style(Style::default().bg(theme.background)),
    );
    f.render_widget(field, area);

    if app.is_editing() {
        // +1 for the border on the left side of the block
        let prefix_width = INPUT_PREFIX.width() as u16;
        let input_width = app.cost_before_cursor().width() as u16;
        let cursor_x = area.x + 1 + prefix_width + input_width;
        let cursor_y = area.y + 1;
        f.set_cursor_position((cursor_x, cursor_y));
    }
}

/// Draw the tip percentage radio group
fn draw_tip_options(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let focused = app.focus() == Focus::TipOptions;

    let lines: Vec<Line> = TipTier::ALL
        .iter()
        .enumerate()
        .map(|(i, &tier)| {
            let selected = tier == app.tier();
            let (marker, style) = if selected {
                (
                    "(•) ",
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                )
            } else {
                ("( ) ", Style::default().fg(theme.dimmed))
            };
            Line::from(vec![
                Span::styled(marker, style),
                Span::styled(tier.label(), style),
                Span::styled(format!("  [{}]", i + 1), Style::default().fg(theme.dimmed_alt)),
            ])
        })
        .collect();

    let options = Paragraph::new(lines)
        .style(Style::default().bg(theme.background))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused, theme))
                .title(" How was the service? ")
                .style(Style::default().bg(theme.background)),
        );
    f.render_widget(options, area);
}

/// Draw the round up switch
fn draw_round_up(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let focused = app.focus() == Focus::RoundUp;
    let (state, state_style) = if app.round_up() {
        ("[ ON]", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    } else {
        ("[OFF]", Style::default().fg(theme.dimmed))
    };

    let line = Line::from(vec![
        Span::styled(" Round up tip? ", control_style(focused, theme)),
        Span::raw(" "),
        Span::styled(state, state_style),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme.background)),
        area,
    );
}

/// Draw the calculate button
fn draw_calculate_button(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let focused = app.focus() == Focus::Calculate;
    let style = if focused {
        Style::default()
            .fg(theme.background)
            .bg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.accent).bg(theme.selection_bg)
    };
    let button = Paragraph::new(Line::from(Span::styled(" CALCULATE ", style)))
        .style(Style::default().bg(theme.background));
    f.render_widget(button, area);
}

/// Draw the tip result, empty when there is nothing to show
fn draw_result(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let result = Paragraph::new(format!(" {}", app.result().display_text())).style(
        Style::default()
            .fg(theme.result)
            .bg(theme.background)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(result, area);
}

/// Draw the status bar
fn draw_status_bar(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let status = if app.is_editing() {
        " Enter/ESC: done | Tab: next | Ctrl+C: quit"
    } else {
        " Tab: next | ↑↓: choose | 1-3: tip | r: round up | c: calculate | q: quit"
    };

    let status_bar = Paragraph::new(status)
        .style(Style::default().fg(theme.dimmed).bg(theme.background));
    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> App {
        App::new(toml::from_str("[currency]\nlocale = \"en-US\"").unwrap())
    }

    #[test]
    fn test_draws_controls() {
        let screen = render(&app());
        assert!(screen.contains("Cost of service ($)"));
        assert!(screen.contains("Amazing service (20%)"));
        assert!(screen.contains("Good service (18%)"));
        assert!(screen.contains("(•) OK service (15%)"));
        assert!(screen.contains("Round up tip?"));
        assert!(screen.contains("[OFF]"));
        assert!(screen.contains("CALCULATE"));
        assert!(!screen.contains("Tip Amount"));
    }

    #[test]
    fn test_draws_result() {
        let mut app = app();
        for c in "50".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        app.select_tier(TipTier::Twenty);
        app.calculate();

        let screen = render(&app);
        assert!(screen.contains("(•) Amazing service (20%)"));
        assert!(screen.contains("Tip Amount: $10.00"));
    }

    #[test]
    fn test_cursor_follows_cost_text() {
        let mut app = app();
        for c in "50".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("❯ 50"));
        // border + prefix + "50"
        assert_eq!(
            terminal.get_cursor_position().unwrap(),
            ratatui::layout::Position::new(1 + 2 + 2, 1)
        );
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let app = App::new(Config::default());
        let mut terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
    }
}
