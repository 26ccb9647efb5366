//! Keypad layout table.
//!
//! A flat list of key definitions in row-major order. Each row of the
//! rendered grid is 5 columns wide; the `0` key spans two columns, so the
//! last row holds four entries.

/// Visual category of a keypad key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Number,
    Operator,
    Action,
    Scientific,
}

/// One keypad key: what it shows and what it feeds into the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct KeyConfig {
    pub label: &'static str,
    /// Value passed to `AppState::press`.
    pub value: &'static str,
    pub kind: KeyKind,
    /// Grid columns occupied (1 for everything except `0`).
    pub span: usize,
}

const fn key(label: &'static str, value: &'static str, kind: KeyKind) -> KeyConfig {
    KeyConfig {
        label,
        value,
        kind,
        span: 1,
    }
}

/// Columns per keypad row.
pub const GRID_COLS: usize = 5;

pub static KEYS: [KeyConfig; 34] = [
    key("2nd", "2nd", KeyKind::Scientific),
    key("deg", "DEG", KeyKind::Scientific),
    key("sin", "sin", KeyKind::Scientific),
    key("cos", "cos", KeyKind::Scientific),
    key("tan", "tan", KeyKind::Scientific),
    //
    key("xʸ", "^", KeyKind::Scientific),
    key("lg", "log", KeyKind::Scientific),
    key("ln", "ln", KeyKind::Scientific),
    key("(", "(", KeyKind::Scientific),
    key(")", ")", KeyKind::Scientific),
    //
    key("√", "sqrt", KeyKind::Scientific),
    key("AC", "AC", KeyKind::Action),
    key("⌫", "C", KeyKind::Action),
    key("%", "/100", KeyKind::Scientific),
    key("÷", "/", KeyKind::Operator),
    //
    key("x!", "!", KeyKind::Scientific),
    key("7", "7", KeyKind::Number),
    key("8", "8", KeyKind::Number),
    key("9", "9", KeyKind::Number),
    key("×", "*", KeyKind::Operator),
    //
    key("1/x", "^(-1)", KeyKind::Scientific),
    key("4", "4", KeyKind::Number),
    key("5", "5", KeyKind::Number),
    key("6", "6", KeyKind::Number),
    key("-", "-", KeyKind::Operator),
    //
    key("π", "PI", KeyKind::Scientific),
    key("1", "1", KeyKind::Number),
    key("2", "2", KeyKind::Number),
    key("3", "3", KeyKind::Number),
    key("+", "+", KeyKind::Operator),
    //
    key("e", "E", KeyKind::Scientific),
    KeyConfig {
        label: "0",
        value: "0",
        kind: KeyKind::Number,
        span: 2,
    },
    key(".", ".", KeyKind::Number),
    key("=", "=", KeyKind::Action),
];

/// Split the flat key list into grid rows, honoring column spans.
pub fn rows() -> Vec<&'static [KeyConfig]> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut span = 0;
    for (i, k) in KEYS.iter().enumerate() {
        span += k.span;
        if span >= GRID_COLS {
            out.push(&KEYS[start..=i]);
            start = i + 1;
            span = 0;
        }
    }
    if start < KEYS.len() {
        out.push(&KEYS[start..]);
    }
    out
}
