//! Calculator application state.
//!
//! All transitions live here as plain methods with no terminal I/O, so the
//! key dispatch and chat guard logic are unit-testable without a TTY.

use neuralcalc_assistant::{ChatLog, Turn};
use neuralcalc_engine::{evaluate_expression, AngleUnit, History};

use crate::keys;

/// Result sentinel shown when evaluation fails.
pub const ERROR_SENTINEL: &str = "Error";

/// Which panel the terminal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Standard,
    Ai,
}

pub struct AppState {
    pub expression: String,
    pub result: String,
    pub history: History,
    /// Max history entries kept (0 = unbounded).
    pub history_limit: usize,
    pub angle_unit: AngleUnit,
    pub mode: Mode,
    pub history_open: bool,
    /// Row offset into `history.items()` when the panel is open.
    pub history_selected: usize,
    pub chat: ChatLog,
    pub chat_input: String,
    /// One request in flight at a time; submits are ignored while set.
    pub chat_pending: bool,
    pub show_help: bool,
    pub should_quit: bool,
    /// Keypad cursor (row, index-within-row).
    pub cursor_row: usize,
    pub cursor_col: usize,
}

impl AppState {
    pub fn new(angle_unit: AngleUnit, history_limit: usize) -> Self {
        let mut state = Self {
            expression: String::new(),
            result: String::new(),
            history: History::new(),
            history_limit,
            angle_unit,
            mode: Mode::Standard,
            history_open: false,
            history_selected: 0,
            chat: ChatLog::new(),
            chat_input: String::new(),
            chat_pending: false,
            show_help: false,
            should_quit: false,
            cursor_row: 0,
            cursor_col: 0,
        };
        state.reset_keypad_cursor();
        state
    }

    // ── Key dispatch ────────────────────────────────────────────────

    /// Handle one keypad value. Mirrors the on-screen keypad contract:
    /// `AC` clears everything, `C` deletes the last char, `=` evaluates,
    /// `DEG`/`RAD` toggles the angle unit, trig/log/sqrt names open a call,
    /// and everything else is appended verbatim.
    pub fn press(&mut self, value: &str) {
        match value {
            "AC" => {
                self.expression.clear();
                self.result.clear();
            }
            "C" => {
                self.expression.pop();
            }
            "=" => self.evaluate(),
            "DEG" | "RAD" => {
                self.angle_unit = self.angle_unit.toggled();
            }
            "sin" | "cos" | "tan" | "log" | "ln" | "sqrt" => {
                self.expression.push_str(value);
                self.expression.push('(');
            }
            _ => self.expression.push_str(value),
        }
    }

    /// Evaluate the current expression. On failure the expression is left
    /// untouched, the result shows the error sentinel, and history is not
    /// recorded.
    fn evaluate(&mut self) {
        if self.expression.is_empty() {
            return;
        }
        match evaluate_expression(&self.expression, self.angle_unit) {
            Ok(result) => {
                self.history.record(&self.expression, &result);
                self.history.truncate(self.history_limit);
                self.result = result;
            }
            Err(_) => {
                self.result = ERROR_SENTINEL.to_string();
            }
        }
    }

    // ── History panel ───────────────────────────────────────────────

    pub fn toggle_history(&mut self) {
        self.history_open = !self.history_open;
        self.history_selected = 0;
    }

    pub fn history_move(&mut self, delta: i32) {
        let len = self.history.len();
        if len == 0 {
            return;
        }
        let new = (self.history_selected as i32 + delta)
            .max(0)
            .min(len as i32 - 1);
        self.history_selected = new as usize;
    }

    /// Copy the selected history entry back into the display and close the
    /// panel.
    pub fn restore_selected(&mut self) {
        if let Some(item) = self.history.items().get(self.history_selected) {
            self.expression = item.expression.clone();
            self.result = item.result.clone();
        }
        self.history_open = false;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history_selected = 0;
    }

    // ── Keypad cursor ───────────────────────────────────────────────

    /// Park the cursor on the `=` key, so Enter evaluates by default.
    pub fn reset_keypad_cursor(&mut self) {
        let rows = keys::rows();
        self.cursor_row = rows.len() - 1;
        self.cursor_col = rows[self.cursor_row].len() - 1;
    }

    pub fn move_keypad(&mut self, drow: i32, dcol: i32) {
        let rows = keys::rows();
        let new_row = (self.cursor_row as i32 + drow)
            .max(0)
            .min(rows.len() as i32 - 1) as usize;
        let row_len = rows[new_row].len();
        let new_col = (self.cursor_col as i32 + dcol)
            .max(0)
            .min(row_len as i32 - 1) as usize;
        self.cursor_row = new_row;
        self.cursor_col = new_col;
    }

    /// The key currently under the keypad cursor.
    pub fn keypad_key(&self) -> keys::KeyConfig {
        keys::rows()[self.cursor_row][self.cursor_col]
    }

    // ── Chat ────────────────────────────────────────────────────────

    /// Take the chat input for sending. Returns the message and the context
    /// window, or None when there is nothing to send or a request is
    /// already in flight.
    pub fn submit_chat(&mut self) -> Option<(String, Vec<Turn>)> {
        if self.chat_pending {
            return None;
        }
        let message = self.chat_input.trim().to_string();
        if message.is_empty() {
            return None;
        }
        let context = self.chat.context_window();
        self.chat_input.clear();
        self.chat.push_user(message.clone());
        self.chat_pending = true;
        Some((message, context))
    }

    pub fn apply_chat_reply(&mut self, text: String) {
        self.chat.push_model(text);
        self.chat_pending = false;
    }

    pub fn apply_chat_error(&mut self, text: String) {
        self.chat.push_error(text);
        self.chat_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(AngleUnit::Deg, 0)
    }

    // ── press ───────────────────────────────────────────────────────

    #[test]
    fn test_digits_and_operators_append() {
        let mut app = state();
        for v in ["1", "+", "2", "*", "3"] {
            app.press(v);
        }
        assert_eq!(app.expression, "1+2*3");
    }

    #[test]
    fn test_function_keys_open_call() {
        let mut app = state();
        app.press("sin");
        assert_eq!(app.expression, "sin(");
        app.press("9");
        app.press("0");
        app.press(")");
        assert_eq!(app.expression, "sin(90)");
    }

    #[test]
    fn test_percent_key_appends_division() {
        let mut app = state();
        app.press("5");
        app.press("0");
        app.press("/100");
        app.press("=");
        assert_eq!(app.result, "0.5");
    }

    #[test]
    fn test_evaluate_records_history() {
        let mut app = state();
        app.press("2");
        app.press("+");
        app.press("2");
        app.press("=");
        assert_eq!(app.result, "4");
        assert_eq!(app.expression, "2+2");
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history.items()[0].result, "4");
    }

    #[test]
    fn test_evaluate_failure_shows_sentinel_and_skips_history() {
        let mut app = state();
        for v in ["2", "+", "*", "3"] {
            app.press(v);
        }
        app.press("=");
        assert_eq!(app.result, ERROR_SENTINEL);
        assert_eq!(app.expression, "2+*3");
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_evaluate_empty_is_noop() {
        let mut app = state();
        app.press("=");
        assert_eq!(app.result, "");
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_ac_clears_everything() {
        let mut app = state();
        app.press("7");
        app.press("=");
        app.press("AC");
        assert_eq!(app.expression, "");
        assert_eq!(app.result, "");
        // history survives AC
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn test_backspace_pops_one_char() {
        let mut app = state();
        app.press("1");
        app.press("2");
        app.press("C");
        assert_eq!(app.expression, "1");
        app.press("C");
        app.press("C");
        assert_eq!(app.expression, "");
    }

    #[test]
    fn test_deg_toggles_angle_unit() {
        let mut app = state();
        assert_eq!(app.angle_unit, AngleUnit::Deg);
        app.press("DEG");
        assert_eq!(app.angle_unit, AngleUnit::Rad);
        app.press("RAD");
        assert_eq!(app.angle_unit, AngleUnit::Deg);
    }

    #[test]
    fn test_angle_unit_affects_result() {
        let mut app = state();
        for v in ["sin", "9", "0", ")"] {
            app.press(v);
        }
        app.press("=");
        assert_eq!(app.result, "1");
    }

    #[test]
    fn test_history_limit_enforced() {
        let mut app = AppState::new(AngleUnit::Deg, 2);
        for i in 1..=4 {
            app.press("AC");
            for ch in format!("{}+0", i).chars() {
                app.press(&ch.to_string());
            }
            app.press("=");
        }
        assert_eq!(app.history.len(), 2);
        assert_eq!(app.history.items()[0].expression, "4+0");
    }

    // ── history panel ───────────────────────────────────────────────

    #[test]
    fn test_restore_selected() {
        let mut app = state();
        for v in ["6", "*", "7", "="] {
            app.press(v);
        }
        app.press("AC");
        app.toggle_history();
        app.restore_selected();
        assert_eq!(app.expression, "6*7");
        assert_eq!(app.result, "42");
        assert!(!app.history_open);
    }

    #[test]
    fn test_history_move_clamps() {
        let mut app = state();
        for v in ["1", "=", "C", "2", "="] {
            app.press(v);
        }
        app.toggle_history();
        app.history_move(-1);
        assert_eq!(app.history_selected, 0);
        app.history_move(5);
        assert_eq!(app.history_selected, app.history.len() - 1);
    }

    // ── keypad cursor ───────────────────────────────────────────────

    #[test]
    fn test_cursor_starts_on_equals() {
        let app = state();
        assert_eq!(app.keypad_key().value, "=");
    }

    #[test]
    fn test_cursor_clamps_to_grid() {
        let mut app = state();
        app.move_keypad(10, 10);
        let rows = keys::rows();
        assert_eq!(app.cursor_row, rows.len() - 1);
        app.move_keypad(-100, -100);
        assert_eq!(app.cursor_row, 0);
        assert_eq!(app.cursor_col, 0);
        assert_eq!(app.keypad_key().value, "2nd");
    }

    // ── chat ────────────────────────────────────────────────────────

    #[test]
    fn test_submit_chat_takes_input() {
        let mut app = state();
        app.chat_input = "what is a radian?".to_string();
        let (message, context) = app.submit_chat().unwrap();
        assert_eq!(message, "what is a radian?");
        assert!(app.chat_input.is_empty());
        assert!(app.chat_pending);
        // greeting only; the user turn is appended after the snapshot
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_submit_ignored_while_pending() {
        let mut app = state();
        app.chat_input = "first".to_string();
        assert!(app.submit_chat().is_some());

        app.chat_input = "second".to_string();
        assert!(app.submit_chat().is_none());
        assert_eq!(app.chat_input, "second");
    }

    #[test]
    fn test_submit_ignores_blank_input() {
        let mut app = state();
        app.chat_input = "   ".to_string();
        assert!(app.submit_chat().is_none());
        assert!(!app.chat_pending);
    }

    #[test]
    fn test_chat_reply_clears_pending() {
        let mut app = state();
        app.chat_input = "hi".to_string();
        app.submit_chat();
        app.apply_chat_reply("hello".to_string());
        assert!(!app.chat_pending);
        let last = app.chat.messages().last().unwrap();
        assert_eq!(last.text, "hello");
        assert!(!last.is_error);
    }

    #[test]
    fn test_chat_error_flagged_and_conversation_continues() {
        let mut app = state();
        app.chat_input = "hi".to_string();
        app.submit_chat();
        app.apply_chat_error("connection refused".to_string());
        assert!(!app.chat_pending);
        assert!(app.chat.messages().last().unwrap().is_error);

        app.chat_input = "again".to_string();
        assert!(app.submit_chat().is_some());
    }
}
