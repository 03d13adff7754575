use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::Config;
use crate::currency::CurrencyFormat;
use crate::tip::{TipCalculator, TipResult, TipTier};
use crate::ui::Theme;

/// Longest cost text the input accepts
const MAX_COST_LEN: usize = 18;

/// Which control keyboard input goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Cost of service text field
    Cost,
    /// Tip percentage radio group
    TipOptions,
    /// Round-up switch
    RoundUp,
    /// Calculate button
    Calculate,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Cost, Focus::TipOptions, Focus::RoundUp, Focus::Calculate];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|&f| f == self).unwrap_or(0)
    }

    pub fn next(self) -> Focus {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Focus {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Application state
pub struct App {
    calculator: TipCalculator<CurrencyFormat>,
    theme: Theme,
    /// Raw cost text as typed
    cost: String,
    /// Cursor position in `cost`, in chars
    cursor: usize,
    /// Cost field is taking text input
    editing: bool,
    focus: Focus,
    tier: TipTier,
    round_up: bool,
    /// Last calculation; `NoValue` shows nothing
    result: TipResult,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let calculator = config.calculator();
        let theme = config.resolve_theme();
        let tier = config.default_tier();
        let round_up = config.calculator.round_up;

        Self {
            calculator,
            theme,
            cost: String::new(),
            cursor: 0,
            editing: true,
            focus: Focus::Cost,
            tier,
            round_up,
            result: TipResult::NoValue,
            should_quit: false,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn cost_text(&self) -> &str {
        &self.cost
    }

    /// Cost text left of the cursor
    pub fn cost_before_cursor(&self) -> &str {
        let end = self
            .cost
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.cost.len());
        &self.cost[..end]
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn tier(&self) -> TipTier {
        self.tier
    }

    pub fn round_up(&self) -> bool {
        self.round_up
    }

    pub fn result(&self) -> &TipResult {
        &self.result
    }

    pub fn currency_symbol(&self) -> &str {
        &self.calculator.formatter().symbol
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn select_tier(&mut self, tier: TipTier) {
        self.tier = tier;
    }

    pub fn toggle_round_up(&mut self) {
        self.round_up = !self.round_up;
    }

    /// Run the calculator on the current inputs and replace the displayed result
    pub fn calculate(&mut self) {
        self.result = self.calculator.compute(&self.cost, self.tier, self.round_up);
        match &self.result {
            TipResult::Amount { formatted, .. } => tracing::info!("Tip: {}", formatted),
            TipResult::NoValue => tracing::info!("No tip for cost {:?}, clearing result", self.cost),
        }
    }

    /// Give focus to the cost field and start text input
    pub fn start_editing(&mut self) {
        self.focus = Focus::Cost;
        self.editing = true;
    }

    /// Leave text input, the terminal stand-in for hiding the soft keyboard
    pub fn stop_editing(&mut self) {
        self.editing = false;
    }

    fn set_focus(&mut self, focus: Focus) {
        self.editing = false;
        self.focus = focus;
    }

    fn insert_char(&mut self, c: char) {
        if self.cost.chars().count() >= MAX_COST_LEN {
            return;
        }
        let at = self.cost_before_cursor().len();
        self.cost.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.delete_at_cursor();
    }

    fn delete_at_cursor(&mut self) {
        let at = self.cost_before_cursor().len();
        if at < self.cost.len() {
            self.cost.remove(at);
        }
    }

    /// Handle one key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.editing {
            self.handle_editing_key(key);
        } else {
            self.handle_navigation_key(key);
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if accepts_cost_char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete_at_cursor(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.cost.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.cost.chars().count(),
            KeyCode::Enter | KeyCode::Esc => self.stop_editing(),
            KeyCode::Tab => self.set_focus(Focus::Cost.next()),
            KeyCode::BackTab => self.set_focus(Focus::Cost.previous()),
            _ => {}
        }
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.set_focus(self.focus.next()),
            KeyCode::BackTab => self.set_focus(self.focus.previous()),
            KeyCode::Up | KeyCode::Char('k') if self.focus == Focus::TipOptions => {
                self.tier = self.tier.previous();
            }
            KeyCode::Down | KeyCode::Char('j') if self.focus == Focus::TipOptions => {
                self.tier = self.tier.next();
            }
            KeyCode::Up | KeyCode::Char('k') => self.set_focus(self.focus.previous()),
            KeyCode::Down | KeyCode::Char('j') => self.set_focus(self.focus.next()),
            KeyCode::Char(c) if self.focus == Focus::Cost && accepts_cost_char(c) => {
                self.editing = true;
                self.insert_char(c);
            }
            KeyCode::Char('1') => self.select_tier(TipTier::Twenty),
            KeyCode::Char('2') => self.select_tier(TipTier::Eighteen),
            KeyCode::Char('3') => self.select_tier(TipTier::Fifteen),
            KeyCode::Char('r') => self.toggle_round_up(),
            KeyCode::Char('c') => self.calculate(),
            KeyCode::Enter | KeyCode::Char(' ') => match self.focus {
                Focus::Cost => self.start_editing(),
                Focus::TipOptions => {}
                Focus::RoundUp => self.toggle_round_up(),
                Focus::Calculate => self.calculate(),
            },
            _ => {}
        }
    }
}

/// The cost field behaves like a decimal-only numeric keyboard
fn accepts_cost_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}
