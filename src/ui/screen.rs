use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::audio::state::{PlaybackStatus, StateSnapshot};
use crate::util::colors;

pub fn render(f: &mut Frame, snapshot: &StateSnapshot) {
    let area = f.area();
    f.buffer_mut()
        .set_style(area, Style::new().bg(colors::BACKGROUND));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new("sctui - SoundCloud for the Terminal")
        .style(
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    let mut lines: Vec<Line> = Vec::new();

    match &snapshot.track {
        Some(track) => lines.push(Line::from(vec![
            Span::raw("Track: "),
            Span::styled(track.title.clone(), Style::default().fg(colors::SECONDARY)),
        ])),
        None => lines.push(Line::from(
            "No track selected - press S to search".fg(colors::NEUTRAL),
        )),
    }
    lines.push(Line::default());

    let status = match (snapshot.status, snapshot.paused) {
        (PlaybackStatus::Idle, _) => "IDLE".fg(colors::NEUTRAL),
        (PlaybackStatus::Starting, _) => "STARTING".fg(colors::SECONDARY),
        (PlaybackStatus::Streaming, true) => "PAUSED".fg(colors::SECONDARY),
        (PlaybackStatus::Streaming, false) => "PLAYING".fg(colors::PRIMARY),
    };
    lines.push(Line::from(vec![Span::raw("State: "), status.into()]));

    if snapshot.downloading {
        lines.push(Line::from(
            ">> downloading in background...".fg(colors::SECONDARY),
        ));
    }

    if let Some(error) = &snapshot.playback_error {
        lines.push(Line::default());
        lines.push(Line::from(
            format!("Playback error: {error}").fg(colors::ERROR),
        ));
    }
    if let Some(error) = &snapshot.download_error {
        lines.push(Line::default());
        lines.push(Line::from(
            format!("Download error: {error}").fg(colors::ERROR),
        ));
    }

    f.render_widget(Paragraph::new(lines), chunks[1]);

    let help = Paragraph::new("[P] Play/Pause  [X] Stop  [D] Download  [S] Search  [Q] Quit")
        .style(Style::default().fg(colors::NEUTRAL));
    f.render_widget(help, chunks[2]);
}
