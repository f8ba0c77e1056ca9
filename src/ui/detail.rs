use super::centered_rect;
use crate::app::App;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Modal popup for the selected movie.
pub fn render(app: &App, frame: &mut Frame) {
    let detail = match &app.detail {
        Some(d) => d,
        None => return,
    };
    let palette = app.theme.palette();
    let area = centered_rect(70, 70, frame.area());

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(Span::styled(
            format!(" {} ", detail.title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title_bottom(
            Line::from(" Esc to close ")
                .alignment(Alignment::Right)
                .style(Style::default().fg(palette.muted)),
        )
        .style(Style::default().bg(palette.background).fg(palette.text));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Layout: poster(2) + info(min)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(inner);

    let poster = if detail.has_poster() {
        Line::from(vec![
            Span::styled("Poster: ", Style::default().fg(palette.muted)),
            Span::raw(detail.image_url.as_str()),
        ])
    } else {
        Line::styled("No poster available", Style::default().fg(palette.muted))
    };
    frame.render_widget(Paragraph::new(poster), chunks[0]);

    let label = |text: &'static str| {
        Span::styled(
            text,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
    };
    let info = vec![
        Line::styled(
            detail.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            format!("{} | {}", detail.year, detail.genre),
            Style::default().fg(palette.muted),
        ),
        Line::from(""),
        Line::from(detail.description.as_str()),
        Line::from(""),
        Line::from(vec![label("Director: "), Span::raw(detail.director.as_str())]),
        Line::from(vec![
            label("IMDB Rating: "),
            Span::styled(
                format!("⭐ {}/10", detail.rating),
                Style::default().fg(palette.rating),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(info).wrap(Wrap { trim: true }), chunks[1]);
}
