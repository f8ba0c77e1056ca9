use super::centered_rect;
use crate::app::App;
use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("?", "Toggle this help"),
            ("t", "Toggle dark/light mode"),
            ("q", "Quit application"),
            ("Ctrl-C", "Quit application"),
        ],
    ),
    (
        "Grid",
        &[
            ("←↑↓→/hjkl", "Move between cards"),
            ("g/G", "Jump to first/last card"),
            ("Enter", "Open movie detail"),
            ("/", "Search titles and descriptions"),
            ("Tab/S-Tab", "Next/previous genre"),
            ("0-4", "All/Action/Drama/Adventure/Animation"),
        ],
    ),
    (
        "Search",
        &[
            ("type", "Filter as you type"),
            ("Backspace", "Delete last character"),
            ("Enter/Esc", "Stop editing"),
        ],
    ),
    ("Detail", &[("Esc/q", "Close the popup")]),
];

pub fn render(app: &App, frame: &mut Frame) {
    let palette = app.theme.palette();
    let area = centered_rect(60, 70, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let mut help_text = vec![Line::from("")];
    for (section, keys) in SECTIONS {
        help_text.push(Line::from(Span::styled(
            format!("  {}", section),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, action) in *keys {
            help_text.push(Line::from(vec![
                Span::styled(format!("    {:<12}", key), Style::default().fg(palette.rating)),
                Span::raw(*action),
            ]));
        }
        help_text.push(Line::from(""));
    }

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .title(" Help: Keybindings ")
                .title_bottom(
                    Line::from(" Press ? or Esc to close ").style(Style::default().fg(palette.muted)),
                ),
        )
        .style(Style::default().bg(palette.background).fg(palette.text));

    frame.render_widget(help, area);
}
