use anyhow::Result;
use chrono::{Local, TimeZone};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;

use super::conversation::ConversationSummary;

/// Show a selection UI for choosing a conversation to switch to.
/// Returns the chosen conversation key, or `None` if the user cancelled.
pub fn select_conversation(conversations: Vec<ConversationSummary>) -> Result<Option<String>> {
    if conversations.len() <= 1 {
        return Ok(conversations.into_iter().next().map(|c| c.key));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = ConversationSelector {
        conversations,
        selected: 0,
    };

    // Run the UI loop
    let result = run_selector(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

struct ConversationSelector {
    conversations: Vec<ConversationSummary>,
    selected: usize,
}

impl ConversationSelector {
    fn next(&mut self) {
        if self.selected + 1 < self.conversations.len() {
            self.selected += 1;
        }
    }

    fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn last(&mut self) {
        self.selected = self.conversations.len().saturating_sub(1);
    }

    fn chosen_key(&self) -> Option<String> {
        self.conversations.get(self.selected).map(|c| c.key.clone())
    }
}

fn run_selector(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut ConversationSelector,
) -> Result<Option<String>> {
    loop {
        terminal.draw(|f| render_selector(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    return Ok(None);
                }
                KeyCode::Enter => {
                    return Ok(app.chosen_key());
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => {
                    app.selected = 0;
                }
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn render_selector(f: &mut Frame, app: &ConversationSelector) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    // Title
    let title = Paragraph::new("Select a conversation")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" NativeAI - Conversations "));
    f.render_widget(title, chunks[0]);

    // Conversation list
    let items: Vec<ListItem> = app
        .conversations
        .iter()
        .enumerate()
        .map(|(i, conv)| {
            let style = if i == app.selected {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let content = vec![
                Line::from(vec![
                    Span::styled(conv.key.chars().take(8).collect::<String>(), style.fg(Color::Yellow)),
                    Span::styled("  ", style),
                    Span::styled(&conv.title, style),
                ]),
                Line::from(vec![Span::styled(
                    format!(
                        "  {} | {}",
                        format_timestamp(conv.last_timestamp_ms),
                        conv.last_message_snippet
                    ),
                    style.fg(Color::Gray),
                )]),
            ];

            ListItem::new(content)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} conversations ", app.conversations.len())),
    );

    f.render_widget(list, chunks[1]);

    // Help text
    let help = vec![
        Line::from(vec![
            Span::raw("Up/k: Up  Down/j: Down  "),
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::raw(": Select  "),
            Span::styled("q/Esc", Style::default().fg(Color::Red)),
            Span::raw(": Cancel"),
        ]),
    ];
    let help_widget = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help_widget, chunks[2]);
}

/// Local "YYYY-MM-DD HH:MM" for a millisecond timestamp
pub fn format_timestamp(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(key: &str) -> ConversationSummary {
        ConversationSummary {
            key: key.to_string(),
            title: key.to_string(),
            last_message_snippet: String::new(),
            last_timestamp_ms: 0,
        }
    }

    #[test]
    fn test_trivial_lists_skip_the_ui() {
        assert_eq!(select_conversation(Vec::new()).unwrap(), None);
        assert_eq!(
            select_conversation(vec![summary("only")]).unwrap(),
            Some("only".to_string())
        );
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut app = ConversationSelector {
            conversations: vec![summary("a"), summary("b")],
            selected: 0,
        };
        app.previous();
        assert_eq!(app.chosen_key().as_deref(), Some("a"));
        app.next();
        app.next();
        assert_eq!(app.chosen_key().as_deref(), Some("b"));
        app.selected = 0;
        app.last();
        assert_eq!(app.chosen_key().as_deref(), Some("b"));
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert_eq!(format_timestamp(i64::MAX), "-");
        assert_eq!(format_timestamp(0).len(), 16);
    }
}
