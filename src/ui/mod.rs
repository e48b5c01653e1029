pub mod field;
pub mod screens;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::game::{GameSession, GameState};

pub fn render(frame: &mut Frame, session: &GameSession) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(80, 255, 80)))
        .title(" Rustvaders ")
        .title_style(Style::default().fg(Color::Rgb(100, 255, 100)).add_modifier(Modifier::BOLD));

    let area = frame.area();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // HUD
            Constraint::Min(8),    // Play field / screens
            Constraint::Length(1), // Key help
        ])
        .split(inner);

    render_hud(frame, chunks[0], session);

    match session.state() {
        GameState::Attract => screens::render_title(frame, chunks[1], session),
        GameState::HallOfFame => screens::render_hall_of_fame(frame, chunks[1], session),
        _ => render_field(frame, chunks[1], session),
    }

    // Overlays on top of the field
    match session.state() {
        GameState::RespawnPause => {
            screens::render_message(frame, chunks[1], "GET READY", None, Color::Rgb(80, 255, 80));
        }
        GameState::LevelTransition => {
            let title = format!("LEVEL {} CLEARED", session.level());
            let next = format!("NEXT: LEVEL {}", session.level() + 1);
            screens::render_message(frame, chunks[1], &title, Some(&next), Color::Rgb(80, 200, 255));
        }
        GameState::GameOver => {
            let prompt = (session.can_restart() && screens::blink_on(session.now()))
                .then_some("PRESS ENTER");
            screens::render_message(frame, chunks[1], "GAME OVER", prompt, Color::Red);
        }
        GameState::HighScoreEntry => screens::render_name_entry(frame, chunks[1], session),
        _ => {}
    }

    render_help(frame, chunks[2], session.state());
}

fn render_field(frame: &mut Frame, area: Rect, session: &GameSession) {
    let (w, h) = (area.width as usize, area.height as usize);
    if w > 0 && h > 0 {
        let lines = field::render_field(session, w, h);
        frame.render_widget(Paragraph::new(lines), area);
    }
}

fn render_hud(frame: &mut Frame, area: Rect, session: &GameSession) {
    let sep = Span::styled(" | ", Style::default().fg(Color::DarkGray));
    let lives = "\u{2666} ".repeat(session.lives() as usize);
    let status = Line::from(vec![
        Span::styled(
            format!(" Score: {:05} ", session.score()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        sep.clone(),
        Span::styled(format!("High: {:05} ", session.high_score()), Style::default().fg(Color::Cyan)),
        sep.clone(),
        Span::styled(
            format!("Lives: {}", lives),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        sep.clone(),
        Span::styled(format!("Level: {} ", session.level()), Style::default().fg(Color::Green)),
        sep,
        Span::styled(
            format!("Invaders: {} ", session.formation().alive_count()),
            Style::default().fg(Color::Rgb(255, 80, 80)),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}

fn render_help(frame: &mut Frame, area: Rect, state: GameState) {
    let keys: &[(&str, &str)] = match state {
        GameState::Attract => &[("Enter", "Start"), ("Esc", "Quit")],
        GameState::Playing | GameState::RespawnPause | GameState::LevelTransition => {
            &[("\u{2190}\u{2192}/A D", "Move"), ("Space", "Fire"), ("Esc", "Quit")]
        }
        GameState::GameOver => &[("Enter", "Play again"), ("Esc", "Quit")],
        GameState::HighScoreEntry => &[("Enter/Space", "Submit"), ("Esc", "Quit")],
        GameState::HallOfFame => &[("Enter", "Play again"), ("Q", "Reset scores"), ("Esc", "Quit")],
    };

    let mut spans = Vec::new();
    for (i, (key, action)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("| ", Style::default().fg(Color::Rgb(60, 60, 60))));
        }
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(format!("{} ", action), Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
