use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ui::message::AppMessage;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key(key: KeyEvent) -> Option<AppMessage> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppMessage::Quit),
            (KeyCode::Char('q') | KeyCode::Char('Q'), _) => Some(AppMessage::Quit),
            (KeyCode::Char('p') | KeyCode::Char('P'), _) => Some(AppMessage::TogglePlayPause),
            (KeyCode::Char('x') | KeyCode::Char('X'), _) => Some(AppMessage::Stop),
            (KeyCode::Char('d') | KeyCode::Char('D'), _) => Some(AppMessage::Download),
            (KeyCode::Char('s') | KeyCode::Char('S'), _) => Some(AppMessage::OpenSearch),
            _ => None,
        }
    }
}
