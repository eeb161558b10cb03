use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::source::{SearchHit, SourceError};
use crate::util::colors;

enum OverlayPhase {
    /// Query line editing.
    Input,
    /// Blocking search call in flight; keys are swallowed.
    Searching,
    /// Failure or no-results notice; any key closes.
    Message(String),
    /// Selection loop over the result set.
    Results { hits: Vec<SearchHit>, cursor: usize },
}

/// What the dispatcher should do after a key went to the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    Continue,
    Close,
    Submit(String),
    Commit(SearchHit),
}

/// Modal search sub-mode. Owns its result set; closing the overlay on any
/// path drops the hits.
pub struct SearchOverlay {
    input: String,
    phase: OverlayPhase,
}

impl Default for SearchOverlay {
    fn default() -> Self {
        Self {
            input: String::new(),
            phase: OverlayPhase::Input,
        }
    }
}

impl SearchOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, key: KeyEvent) -> OverlayOutcome {
        match &mut self.phase {
            OverlayPhase::Input => match key.code {
                KeyCode::Enter => {
                    if self.input.is_empty() {
                        OverlayOutcome::Close
                    } else {
                        self.phase = OverlayPhase::Searching;
                        OverlayOutcome::Submit(self.input.clone())
                    }
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    OverlayOutcome::Continue
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    OverlayOutcome::Continue
                }
                KeyCode::Esc => OverlayOutcome::Close,
                _ => OverlayOutcome::Continue,
            },
            OverlayPhase::Searching => OverlayOutcome::Continue,
            OverlayPhase::Message(_) => OverlayOutcome::Close,
            OverlayPhase::Results { hits, cursor } => match key.code {
                KeyCode::Up => {
                    *cursor = cursor.saturating_sub(1);
                    OverlayOutcome::Continue
                }
                KeyCode::Down => {
                    *cursor = (*cursor + 1).min(hits.len() - 1);
                    OverlayOutcome::Continue
                }
                KeyCode::Enter => OverlayOutcome::Commit(hits[*cursor].clone()),
                KeyCode::Esc => OverlayOutcome::Close,
                _ => OverlayOutcome::Continue,
            },
        }
    }

    /// Feeds the outcome of the search call back into the overlay.
    pub fn finish_search(&mut self, result: Result<Vec<SearchHit>, SourceError>) {
        self.phase = match result {
            Err(e) => OverlayPhase::Message(format!("Search failed: {e}")),
            Ok(hits) if hits.is_empty() => OverlayPhase::Message("No results".into()),
            Ok(hits) => OverlayPhase::Results { hits, cursor: 0 },
        };
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let area = centered(area, 70, 60);
        f.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .border_style(Style::default().fg(colors::PRIMARY));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(inner);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .title("Query")
            .border_style(match self.phase {
                OverlayPhase::Input => Style::default().fg(colors::PRIMARY),
                _ => Style::default().fg(colors::NEUTRAL),
            });
        f.render_widget(Paragraph::new(self.input.as_str()).block(input_block), chunks[0]);

        match &self.phase {
            OverlayPhase::Input => {
                let hint = Paragraph::new("Type a query, Enter to search, Esc to cancel")
                    .style(Style::default().fg(colors::NEUTRAL));
                f.render_widget(hint, chunks[1]);
            }
            OverlayPhase::Searching => {
                f.render_widget(
                    Paragraph::new("Searching...").style(Style::default().fg(colors::PRIMARY)),
                    chunks[1],
                );
            }
            OverlayPhase::Message(message) => {
                f.render_widget(
                    Paragraph::new(message.as_str()).style(Style::default().fg(colors::ERROR)),
                    chunks[1],
                );
            }
            OverlayPhase::Results { hits, cursor } => {
                let items: Vec<ListItem> = hits
                    .iter()
                    .map(|hit| {
                        let minutes = hit.duration_ms / 60_000;
                        let seconds = hit.duration_ms % 60_000 / 1000;
                        ListItem::new(format!("  {} [{minutes}:{seconds:02}]", hit.title))
                    })
                    .collect();
                let list = List::new(items)
                    .highlight_style(
                        Style::default()
                            .fg(colors::PRIMARY)
                            .add_modifier(Modifier::BOLD),
                    )
                    .highlight_symbol("> ");

                let mut list_state = ListState::default();
                list_state.select(Some(*cursor));
                f.render_stateful_widget(list, chunks[1], &mut list_state);
            }
        }
    }
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
