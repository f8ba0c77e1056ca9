use crate::app::{App, CARD_HEIGHT, InputMode, LoadState};
use crate::catalog::MovieRecord;
use crate::theme::Palette;
use crate::view::{FilterTrigger, GENRE_BUTTONS, Visible};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.theme.palette();

    // Layout: header(3) + genres(3) + search(3) + grid(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " 🎬 Movie Explorer ",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  [{} movies]", app.catalog.len()),
            Style::default().fg(palette.muted),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.border))
            .title_top(
                Line::from(format!(" {} (t) ", app.theme.toggle_label()))
                    .alignment(Alignment::Right),
            ),
    );
    frame.render_widget(header, chunks[0]);

    // ── Genre buttons ──
    let genre_active = app.filter.compose || app.filter.last_trigger == FilterTrigger::Genre;
    let titles: Vec<Line> = GENRE_BUTTONS
        .iter()
        .enumerate()
        .map(|(i, label)| Line::from(format!("{} {}", i, label)))
        .collect();
    let mut tabs = Tabs::new(titles)
        .style(Style::default().fg(palette.muted))
        .highlight_style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title(" Genre [Tab/0-4] "),
        );
    if genre_active
        && let Some(index) = app.filter.genre.button_index()
    {
        tabs = tabs.select(index);
    }
    frame.render_widget(tabs, chunks[1]);

    // ── Search bar ──
    let search_style = match app.input_mode {
        InputMode::Editing => Style::default().fg(palette.rating),
        InputMode::Normal => Style::default().fg(palette.muted),
    };
    let search_label = if app.input_mode == InputMode::Editing {
        " 🔍 Search (Enter/Esc to finish): "
    } else {
        " 🔍 Search (/): "
    };
    let search_bar = Paragraph::new(format!("{}{}", search_label, app.filter.search))
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(search_style)
                .title(" Search "),
        );
    frame.render_widget(search_bar, chunks[2]);

    // Set cursor position when editing
    if app.input_mode == InputMode::Editing {
        let cursor_x = chunks[2].x
            + 1
            + search_label.width() as u16
            + app.filter.search.width() as u16;
        frame.set_cursor_position((cursor_x, chunks[2].y + 1));
    }

    // ── Cards ──
    render_body(app, frame, chunks[3], &palette);

    // ── Status bar ──
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
    };
    let status_line = Line::from(vec![
        key(" ←↑↓→"),
        Span::raw(" Move  "),
        key("Enter"),
        Span::raw(" Detail  "),
        key("/"),
        Span::raw(" Search  "),
        key("t"),
        Span::raw(" Theme  "),
        key("?"),
        Span::raw(" Help  "),
        key("q"),
        Span::raw(" Quit  "),
        Span::styled(&app.status_msg, Style::default().fg(palette.muted)),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[4]);
}

fn render_body(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let position = if app.visible.is_empty() {
        String::new()
    } else {
        format!(" {}/{} ", app.selected + 1, app.visible.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" Movies ")
        .title_bottom(Line::from(position).alignment(Alignment::Right));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.awaiting_first_batch() {
        render_placeholder(
            frame,
            inner,
            vec![Line::styled(
                "Loading movies...",
                Style::default().fg(palette.accent),
            )],
        );
        return;
    }

    if let LoadState::LoadFailed(message) = &app.load_state {
        render_placeholder(
            frame,
            inner,
            vec![Line::styled(
                message.as_str(),
                Style::default()
                    .fg(palette.error)
                    .add_modifier(Modifier::BOLD),
            )],
        );
        return;
    }

    match &app.visible {
        Visible::NoResults { label } => render_placeholder(
            frame,
            inner,
            vec![
                Line::styled(
                    format!("No movies found for \"{}\"", label),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Line::styled(
                    "Try selecting a different genre or clearing the search.",
                    Style::default().fg(palette.muted),
                ),
            ],
        ),
        Visible::Cards(indices) => render_cards(app, frame, inner, indices, palette),
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let area = Rect {
        y: area.y + top,
        height: area.height - top,
        ..area
    };
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_cards(app: &App, frame: &mut Frame, area: Rect, indices: &[usize], palette: &Palette) {
    // Navigation steps by `app.columns`, so lay out with the same count.
    let columns = app.columns.max(1);
    let card_width = area.width / columns as u16;
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;

    // Scroll so the selected card's row stays on screen.
    let selected_row = app.selected / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    for (slot, &catalog_index) in indices.iter().enumerate().skip(first_row * columns) {
        let row = slot / columns - first_row;
        if row >= visible_rows {
            break;
        }
        let column = slot % columns;
        let rect = Rect {
            x: area.x + column as u16 * card_width,
            y: area.y + row as u16 * CARD_HEIGHT,
            width: card_width,
            height: CARD_HEIGHT.min(area.height.saturating_sub(row as u16 * CARD_HEIGHT)),
        };
        if let Some(record) = app.catalog.get(catalog_index) {
            render_card(frame, rect, record, slot == app.selected, palette);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, record: &MovieRecord, selected: bool, palette: &Palette) {
    let border_style = if selected {
        Style::default()
            .fg(palette.highlight_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.border)
    };
    let text_width = area.width.saturating_sub(2) as usize;

    let title_style = if selected {
        Style::default()
            .fg(palette.highlight_fg)
            .bg(palette.highlight_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let lines = vec![
        Line::styled(
            format!("⭐ {}", record.rating),
            Style::default().fg(palette.rating),
        ),
        Line::styled(truncate_str(&record.title, text_width), title_style),
        Line::styled(
            truncate_str(&format!("{} • {}", record.year, record.genre), text_width),
            Style::default().fg(palette.muted),
        ),
        Line::styled(
            if record.has_poster() { "▣ poster" } else { "□ no poster" },
            Style::default().fg(palette.muted),
        ),
    ];

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(card, area);
}

/// Truncate a string to `max_width` columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        width += w;
        result.push(c);
    }
    result.push('…');
    result
}
