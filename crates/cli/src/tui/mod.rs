pub mod state;

use std::io::stdout;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use neuralcalc_assistant::{AssistantClient, Role};

use crate::{keys, util};
use state::{AppState, Mode};

/// Single user-facing message for any assistant failure.
const CHAT_ERROR_TEXT: &str =
    "Sorry, I couldn't reach the assistant. Check your connection and API key.";

/// Display columns per keypad cell.
const CELL_WIDTH: usize = 7;

struct Tui {
    app: AppState,
    /// None when the assistant is disabled or misconfigured.
    client: Option<AssistantClient>,
    /// Shown instead of sending when `client` is None.
    offline_reason: String,
    reply_tx: mpsc::Sender<Result<String, String>>,
    reply_rx: mpsc::Receiver<Result<String, String>>,
}

impl Tui {
    fn new(app: AppState, client: Option<AssistantClient>, offline_reason: Option<String>) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel();
        Self {
            app,
            client,
            offline_reason: offline_reason
                .unwrap_or_else(|| "Assistant is not configured".to_string()),
            reply_tx,
            reply_rx,
        }
    }

    // ── Input ───────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) {
        if self.app.show_help {
            // Any key dismisses help
            self.app.show_help = false;
            return;
        }

        if self.app.history_open {
            self.handle_history_key(key);
            return;
        }

        match self.app.mode {
            Mode::Standard => self.handle_standard_key(key),
            Mode::Ai => self.handle_chat_key(key),
        }
    }

    fn handle_standard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.app.should_quit = true,
            KeyCode::Char('?') => self.app.show_help = true,
            KeyCode::Char('h') => self.app.toggle_history(),
            KeyCode::Tab => self.app.mode = Mode::Ai,
            KeyCode::Esc => self.app.press("AC"),
            KeyCode::Backspace => self.app.press("C"),
            // Typing a literal key parks the cursor back on `=`, so Enter
            // evaluates in the common type-then-enter flow.
            KeyCode::Char(c) if "0123456789+-*/().".contains(c) => {
                self.app.press(&c.to_string());
                self.app.reset_keypad_cursor();
            }
            KeyCode::Enter => {
                let value = self.app.keypad_key().value;
                self.app.press(value);
            }
            KeyCode::Up => self.app.move_keypad(-1, 0),
            KeyCode::Down => self.app.move_keypad(1, 0),
            KeyCode::Left => self.app.move_keypad(0, -1),
            KeyCode::Right => self.app.move_keypad(0, 1),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('q') => {
                self.app.history_open = false;
            }
            KeyCode::Up => self.app.history_move(-1),
            KeyCode::Down => self.app.history_move(1),
            KeyCode::Enter => self.app.restore_selected(),
            KeyCode::Char('c') => self.app.clear_history(),
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.app.mode = Mode::Standard,
            KeyCode::Enter => self.submit_chat(),
            KeyCode::Backspace => {
                self.app.chat_input.pop();
            }
            KeyCode::Char(c) => self.app.chat_input.push(c),
            _ => {}
        }
    }

    /// Send the current chat input on a worker thread. The event loop keeps
    /// drawing the pending indicator until the reply lands on the channel.
    fn submit_chat(&mut self) {
        let Some((message, context)) = self.app.submit_chat() else {
            return;
        };

        let Some(client) = self.client.clone() else {
            self.app.apply_chat_error(self.offline_reason.clone());
            return;
        };

        let tx = self.reply_tx.clone();
        thread::spawn(move || {
            let result = client
                .send_message(&message, &context)
                .map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
    }

    fn drain_replies(&mut self) {
        while let Ok(result) = self.reply_rx.try_recv() {
            match result {
                Ok(text) => self.app.apply_chat_reply(text),
                Err(_) => self.app.apply_chat_error(CHAT_ERROR_TEXT.to_string()),
            }
        }
    }

    // ── Drawing ─────────────────────────────────────────────────────

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_display(frame, chunks[1]);
        match self.app.mode {
            Mode::Standard => self.draw_keypad(frame, chunks[2]),
            Mode::Ai => self.draw_chat(frame, chunks[2]),
        }
        self.draw_status(frame, chunks[3]);

        if self.app.history_open {
            self.draw_history(frame, area);
        }
        if self.app.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let mode = match self.app.mode {
            Mode::Standard => "Standard",
            Mode::Ai => "AI Assistant",
        };
        let title = format!(
            " NeuralCalc | {} | {} ",
            self.app.angle_unit.as_str(),
            mode
        );
        let para = Paragraph::new(Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_display(&self, frame: &mut Frame, area: Rect) {
        let expression = if self.app.expression.is_empty() {
            Span::styled("0", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(
                self.app.expression.clone(),
                Style::default().fg(Color::White),
            )
        };

        let result_style = if self.app.result == state::ERROR_SENTINEL {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        };

        let lines = vec![
            Line::from(expression),
            Line::from(Span::styled(self.app.result.clone(), result_style)),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let para = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Right);
        frame.render_widget(para, area);
    }

    fn draw_keypad(&self, frame: &mut Frame, area: Rect) {
        let rows = keys::rows();
        let grid_width = (keys::GRID_COLS * (CELL_WIDTH + 1)) as u16;
        let x_off = area.width.saturating_sub(grid_width) / 2;

        let mut lines: Vec<Line> = Vec::with_capacity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            let mut spans = Vec::new();
            for (c, key) in row.iter().enumerate() {
                let width = key.span * (CELL_WIDTH + 1) - 1;
                let label = util::center(key.label, width);

                let selected = r == self.app.cursor_row && c == self.app.cursor_col;
                let style = if selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    key_style(key.kind, key.value)
                };

                spans.push(Span::styled(label, style));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }

        // One blank line between keypad rows when there is room
        let spaced = area.height as usize >= rows.len() * 2;
        let mut rendered: Vec<Line> = Vec::new();
        for line in lines {
            rendered.push(line);
            if spaced {
                rendered.push(Line::default());
            }
        }

        let pad_area = Rect::new(
            area.x + x_off,
            area.y,
            grid_width.min(area.width),
            area.height,
        );
        frame.render_widget(Paragraph::new(rendered), pad_area);
    }

    fn draw_chat(&self, frame: &mut Frame, area: Rect) {
        let chunks =
            Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).split(area);

        // Transcript
        let mut lines: Vec<Line> = Vec::new();
        for message in self.app.chat.messages() {
            let (prefix, style) = match (message.role, message.is_error) {
                (_, true) => ("AI:  ", Style::default().fg(Color::Red)),
                (Role::User, _) => ("You: ", Style::default().fg(Color::Yellow)),
                (Role::Model, _) => ("AI:  ", Style::default().fg(Color::Cyan)),
            };
            for (i, text_line) in message.text.lines().enumerate() {
                let head = if i == 0 { prefix } else { "     " };
                lines.push(Line::from(vec![
                    Span::styled(head, style.add_modifier(Modifier::BOLD)),
                    Span::styled(text_line.to_string(), Style::default().fg(Color::White)),
                ]));
            }
            lines.push(Line::default());
        }
        if self.app.chat_pending {
            lines.push(Line::from(Span::styled(
                "Thinking...",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        // Pin the view to the newest messages
        let height = chunks[0].height.saturating_sub(2) as usize;
        let scroll = lines.len().saturating_sub(height) as u16;

        let transcript = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(" Conversation "),
            )
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(transcript, chunks[0]);

        // Input
        let input = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(self.app.chat_input.clone()),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Message (Enter to send, Esc to calculator) "),
        );
        frame.render_widget(input, chunks[1]);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let left = match self.app.mode {
            Mode::Standard => " h history  Tab assistant  ? help  q quit",
            Mode::Ai => " Enter send  Esc back",
        };
        let right = format!("{}  ", self.app.angle_unit.as_str());

        let padding = (area.width as usize)
            .saturating_sub(util::display_width(left) + util::display_width(&right));
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let para = Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_history(&self, frame: &mut Frame, area: Rect) {
        let width: u16 = 46;
        let height: u16 = 14;
        let popup = centered(area, width, height);

        let mut lines: Vec<Line> = Vec::new();
        if self.app.history.is_empty() {
            lines.push(Line::from(Span::styled(
                "  (no calculations yet)",
                Style::default().fg(Color::DarkGray),
            )));
        }
        let visible = (height as usize).saturating_sub(3);
        let top = self.app.history_selected.saturating_sub(visible.saturating_sub(1));
        for (i, item) in self
            .app
            .history
            .items()
            .iter()
            .enumerate()
            .skip(top)
            .take(visible)
        {
            let text = format!(
                " {} = {}",
                util::truncate_display(&item.expression, 24),
                util::truncate_display(&item.result, 14)
            );
            let style = if i == self.app.history_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(
                util::pad_right(&text, width.saturating_sub(2) as usize),
                style,
            )));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "  Enter restore  c clear  Esc close",
            Style::default().fg(Color::DarkGray),
        )));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" History ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Calculator",
            "  ----------",
            "  0-9 + - * / ( ) .   Insert",
            "  Enter               Press highlighted key",
            "  Backspace           Delete last char",
            "  Esc                 Clear all",
            "  arrows              Move keypad cursor",
            "",
            "  Panels",
            "  ------",
            "  h                   History",
            "  Tab                 AI assistant",
            "",
            "  General",
            "  -------",
            "  q                   Quit",
            "  ?                   Toggle this help",
            "",
        ];
        let width: u16 = 42;
        let height: u16 = help_lines.len() as u16;
        let popup = centered(area, width, height);

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

fn key_style(kind: keys::KeyKind, value: &str) -> Style {
    match kind {
        keys::KeyKind::Number => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
        keys::KeyKind::Operator => Style::default().fg(Color::Cyan),
        keys::KeyKind::Scientific => Style::default().fg(Color::Gray),
        keys::KeyKind::Action => {
            if value == "=" {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Red)
            }
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(
        area.x + x,
        area.y + y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Run the interactive calculator. Returns the final state so the caller
/// can persist session-scoped preferences (the angle unit).
pub fn run(
    app: AppState,
    client: Option<AssistantClient>,
    offline_reason: Option<String>,
) -> Result<AppState, String> {
    let mut tui = Tui::new(app, client, offline_reason);

    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        tui.drain_replies();

        terminal
            .draw(|frame| tui.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(100))
            .map_err(|e| format!("event poll error: {}", e))?
        {
            if let Event::Key(key) =
                event::read().map_err(|e| format!("event read error: {}", e))?
            {
                tui.handle_key(key);
            }
        }

        if tui.app.should_quit {
            break;
        }
    }

    Ok(tui.app)
}
