use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::game::GameSession;

const BANNER: &str = r#"
██████╗ ██╗   ██╗███████╗████████╗██╗   ██╗ █████╗ ██████╗ ███████╗██████╗ ███████╗
██╔══██╗██║   ██║██╔════╝╚══██╔══╝██║   ██║██╔══██╗██╔══██╗██╔════╝██╔══██╗██╔════╝
██████╔╝██║   ██║███████╗   ██║   ██║   ██║███████║██║  ██║█████╗  ██████╔╝███████╗
██╔══██╗██║   ██║╚════██║   ██║   ╚██╗ ██╔╝██╔══██║██║  ██║██╔══╝  ██╔══██╗╚════██║
██║  ██║╚██████╔╝███████║   ██║    ╚████╔╝ ██║  ██║██████╔╝███████╗██║  ██║███████║
╚═╝  ╚═╝ ╚═════╝ ╚══════╝   ╚═╝     ╚═══╝  ╚═╝  ╚═╝╚═════╝ ╚══════╝╚═╝  ╚═╝╚══════╝"#;

const SHORT_TITLE: &str = "R U S T V A D E R S";

const CREDITS: &str = "RUSTVADERS  *  DEFEND THE EARTH  *  ARROWS OR A/D TO MOVE  *  SPACE TO FIRE  *  \
                       SHOOT THE SAUCER FOR A MYSTERY BONUS  *  THANKS FOR PLAYING";

const GOLD: Color = Color::Rgb(255, 220, 80);
const DIM: Color = Color::Rgb(100, 100, 130);
const PANEL_BG: Color = Color::Rgb(15, 15, 25);

/// "Press" prompts flash on a fixed half-second cadence.
pub fn blink_on(now: u64) -> bool {
    (now / 500) % 2 == 0
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

pub fn render_title(frame: &mut Frame, area: Rect, session: &GameSession) {
    let mut lines: Vec<Line> = Vec::new();

    let banner_width = BANNER.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    if (area.width as usize) >= banner_width {
        for line in BANNER.lines() {
            lines.push(Line::from(Span::styled(line, Style::default().fg(Color::Rgb(80, 255, 80)))));
        }
    } else {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            SHORT_TITLE,
            Style::default().fg(Color::Rgb(80, 255, 80)).add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "*SCORE ADVANCE TABLE*",
        Style::default().fg(Color::Rgb(180, 180, 200)).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    let rows = [
        ("SAUCER", "= ? MYSTERY", Color::Rgb(255, 60, 200)),
        ("SQUID ", "= 30 POINTS", Color::Rgb(255, 80, 80)),
        ("CRAB  ", "= 20 POINTS", Color::Rgb(80, 255, 150)),
        ("OCTO  ", "= 10 POINTS", Color::Rgb(200, 180, 255)),
    ];
    for (name, value, color) in rows {
        lines.push(Line::from(vec![
            Span::styled(name, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" {}", value), Style::default().fg(Color::Rgb(180, 180, 200))),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("HIGH SCORE {:05}", session.high_score()),
        Style::default().fg(Color::Cyan),
    )));
    lines.push(Line::from(""));
    if blink_on(session.now()) {
        lines.push(Line::from(Span::styled(
            "PRESS ENTER TO START",
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
        )));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(p, area);
}

/// Boxed one- or two-line message over the field.
pub fn render_message(frame: &mut Frame, area: Rect, title: &str, prompt: Option<&str>, color: Color) {
    let box_area = centered(area, 30, 5);
    frame.render_widget(Clear, box_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(PANEL_BG));
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];
    if let Some(prompt) = prompt {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(prompt.to_string(), Style::default().fg(GOLD))));
    }
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

pub fn render_name_entry(frame: &mut Frame, area: Rect, session: &GameSession) {
    let overlay_area = centered(area, 44, 14);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(GOLD))
        .title(" NEW HIGH SCORE! ")
        .title_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(PANEL_BG));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let entry = session.name_entry();
    let cursor = entry.cursor();
    let (above, below) = entry.neighbours();

    // Neighbour hints sit in the cursor's column; each slot is "c " wide
    let pad = " ".repeat(cursor * 2);
    let hint = Style::default().fg(DIM);

    let mut name_spans = Vec::new();
    for (i, ch) in entry.chars().iter().enumerate() {
        let style = if i == cursor {
            Style::default()
                .fg(Color::Black)
                .bg(GOLD)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };
        name_spans.push(Span::styled(ch.to_string(), style));
        name_spans.push(Span::raw(" "));
    }

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Score: {}   Level: {}", session.score(), session.level()),
            Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Enter your name:", Style::default().fg(Color::Rgb(180, 180, 200)))),
        Line::from(""),
        Line::from(Span::styled(format!("{}{} ", pad, above), hint)),
        Line::from(name_spans),
        Line::from(Span::styled(format!("{}{} ", pad, below), hint)),
        Line::from(""),
        Line::from(vec![
            Span::styled("\u{2190}\u{2192}", Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
            Span::styled(" move  ", hint),
            Span::styled("\u{2191}\u{2193}", Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
            Span::styled(" change  ", hint),
            Span::styled("Enter", Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
            Span::styled(" confirm", hint),
        ]),
    ];

    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(PANEL_BG));
    frame.render_widget(p, inner);
}

/// Window of `text` as seen through a `width`-column slot after it has
/// scrolled left by `offset` columns. The text enters from the right edge
/// and wraps around once it has fully left on the left.
pub fn scroll_window(text: &str, width: usize, offset: u64) -> String {
    let chars: Vec<char> = text.chars().collect();
    let period = (width + chars.len()).max(1) as u64;
    let start = width as i64 - (offset % period) as i64;
    (0..width as i64)
        .map(|col| {
            let i = col - start;
            if i >= 0 && (i as usize) < chars.len() {
                chars[i as usize]
            } else {
                ' '
            }
        })
        .collect()
}

pub fn render_hall_of_fame(frame: &mut Frame, area: Rect, session: &GameSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "HALL OF FAME",
        Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let rows: Vec<Row> = session
        .high_scores()
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let color = match i {
                0 => Color::Rgb(255, 215, 0),
                1 => Color::Rgb(192, 192, 192),
                2 => Color::Rgb(205, 127, 50),
                _ => Color::Rgb(180, 180, 200),
            };
            Row::new(vec![
                Cell::from(format!("{:>2}.", i + 1)),
                Cell::from(e.name.clone()),
                Cell::from(format!("{:>6}", e.score)),
                Cell::from(format!("L{}", e.level)),
            ])
            .style(Style::default().fg(color))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(4),
        ],
    )
    .header(
        Row::new(vec!["RANK", "NAME", " SCORE", "LVL"])
            .style(Style::default().fg(DIM).add_modifier(Modifier::BOLD)),
    );
    let table_area = centered(chunks[1], 30, chunks[1].height);
    frame.render_widget(table, table_area);

    let banner = scroll_window(CREDITS, chunks[2].width as usize, session.banner_offset());
    frame.render_widget(
        Paragraph::new(Span::styled(banner, Style::default().fg(Color::Rgb(80, 200, 255)))),
        chunks[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_enters_from_the_right() {
        assert_eq!(scroll_window("AB", 4, 0), "    ");
        assert_eq!(scroll_window("AB", 4, 1), "   A");
        assert_eq!(scroll_window("AB", 4, 4), "AB  ");
    }

    #[test]
    fn scroll_wraps_after_leaving() {
        assert_eq!(scroll_window("AB", 4, 6), "    ");
        assert_eq!(scroll_window("AB", 4, 7), "   A");
    }

    #[test]
    fn blink_has_half_second_phases() {
        assert!(blink_on(0));
        assert!(blink_on(499));
        assert!(!blink_on(500));
        assert!(blink_on(1000));
    }
}
