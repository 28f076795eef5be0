use std::sync::OnceLock;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Field};
use crate::card::NewsCard;
use crate::labels;
use crate::query::QueryState;
use crate::theme::Theme;

static THEME: OnceLock<Theme> = OnceLock::new();

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠸", "⠴"];

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Length(4), // Query form
            Constraint::Min(3),    // Results
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_info_line(f, app, chunks[0]);
    draw_query_box(f, app, chunks[1]);
    draw_results_box(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if app.show_help {
        draw_help_popup(f);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.state {
        QueryState::Loading => {
            let frame = SPINNER[(app.frames / 5) as usize % SPINNER.len()];
            Line::from(vec![
                Span::styled(frame, Style::default().fg(accent())),
                Span::styled(" Fetching news…", Style::default().fg(accent())),
            ])
        }
        QueryState::Error(_) => Line::from(Span::styled(
            "Query failed",
            Style::default().fg(danger()),
        )),
        QueryState::Empty => Line::from(Span::styled(
            "No results",
            Style::default().fg(text_dim()),
        )),
        QueryState::Populated(count) => Line::from(Span::styled(
            format!(
                "{} article{}",
                count,
                if *count == 1 { "" } else { "s" }
            ),
            Style::default().fg(text_dim()),
        )),
        QueryState::Idle => Line::from(Span::styled("Ready", Style::default().fg(text_dim()))),
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_query_box(f: &mut Frame, app: &App, area: Rect) {
    // The form is greyed out while a query is in flight; submission is
    // rejected by the app as well, this is just the visual cue.
    let border_color = if app.state.is_loading() { inactive() } else { accent() };

    let block = Block::default()
        .title(Span::styled(
            " Query ",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let label = |s: &'static str| Span::styled(s, Style::default().fg(text_dim()));
    let value = |field: Field, content: String| {
        let style = if app.field == field {
            Style::default()
                .fg(text())
                .bg(bg_selected())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(text())
        };
        Span::styled(content, style)
    };

    let language_display = format!(
        "{} — {}",
        app.current_language(),
        labels::language_name(app.current_language())
    );

    let lines = vec![
        Line::from(vec![
            label(" Category "),
            value(Field::Category, format!("◂ {} ▸", app.current_category())),
            label("   Date "),
            value(Field::Date, app.date.to_string()),
        ]),
        Line::from(vec![
            label(" Translate "),
            value(
                Field::Translation,
                if app.translate { "[x]" } else { "[ ]" }.to_string(),
            ),
            label("   Language "),
            value(Field::Language, format!("◂ {} ▸", language_display)),
        ]),
    ];

    let form = Paragraph::new(lines).block(block);
    f.render_widget(form, area);
}

fn draw_results_box(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.state {
        QueryState::Populated(count) => format!(" News ({}) ", count),
        _ => " News ".to_string(),
    };

    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));

    let mut lines: Vec<Line> = Vec::new();
    match &app.state {
        QueryState::Idle => {
            lines.push(Line::from(Span::styled(
                "Press Enter to fetch news.",
                Style::default().fg(text_dim()),
            )));
        }
        QueryState::Error(message) => {
            lines.push(Line::from(Span::styled(
                format!("⚠ {}", message),
                Style::default().fg(danger()),
            )));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Press Enter to try again.",
                Style::default().fg(text_dim()),
            )));
        }
        QueryState::Empty => {
            lines.push(Line::from(Span::styled(
                "No news available for the selected category and date.",
                Style::default().fg(text_dim()),
            )));
        }
        QueryState::Loading if app.cards.is_empty() => {
            lines.push(Line::from(Span::styled(
                "Loading…",
                Style::default().fg(text_dim()),
            )));
        }
        _ => {}
    }

    for card in &app.cards {
        lines.extend(card_lines(card, theme()));
    }

    let results = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    f.render_widget(results, area);
}

/// Lines for one card, every color blended by the card's current opacity
/// so freshly inserted cards fade up from the background.
fn card_lines(card: &NewsCard, th: &Theme) -> Vec<Line<'static>> {
    let fade = |color: Color| th.fade(color, card.opacity);
    let gutter_color = fade(
        card.sentiment
            .map(|s| s.accent(th))
            .unwrap_or(th.inactive),
    );
    let gutter = || Span::styled("▌ ", Style::default().fg(gutter_color));

    let mut lines = Vec::new();

    let mut head = vec![gutter()];
    if let Some(sentiment) = card.sentiment {
        head.push(Span::styled(
            format!(" {} ", sentiment.label()),
            sentiment.badge(th).bg(fade(sentiment.accent(th))),
        ));
        head.push(Span::raw(" "));
    }
    if !card.timestamp.is_empty() {
        head.push(Span::styled(
            card.timestamp.clone(),
            Style::default().fg(fade(th.text_dim)),
        ));
    }
    if head.len() > 1 {
        lines.push(Line::from(head));
    }

    lines.push(Line::from(vec![
        gutter(),
        Span::styled(
            card.title.clone(),
            Style::default().fg(fade(th.text)).add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(vec![
        gutter(),
        Span::styled(
            card.source.clone(),
            Style::default().fg(fade(th.text_dim)).add_modifier(Modifier::ITALIC),
        ),
    ]));
    lines.push(Line::from(vec![
        gutter(),
        Span::styled(card.summary.clone(), Style::default().fg(fade(th.text))),
    ]));

    if let Some(block) = &card.translation {
        let label = if block.language.is_empty() {
            "Translated:".to_string()
        } else {
            format!("Translated to {}:", block.language)
        };
        lines.push(Line::from(vec![
            gutter(),
            Span::styled(label, Style::default().fg(fade(th.text_dim))),
        ]));
        lines.push(Line::from(vec![
            gutter(),
            Span::styled(block.text.clone(), Style::default().fg(fade(th.text))),
        ]));
    }

    lines.push(Line::from(vec![
        gutter(),
        Span::styled(
            card.url.clone(),
            Style::default().fg(fade(th.accent)).add_modifier(Modifier::UNDERLINED),
        ),
    ]));
    lines.push(Line::default());

    lines
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let key = |s: &'static str| Span::styled(s, Style::default().fg(accent()));
    let hint = |s: &'static str| Span::styled(s, Style::default().fg(text_dim()));

    let mut spans = vec![
        key(" Tab"),
        hint(" field │ "),
        key("◂/▸"),
        hint(" change │ "),
        key("Space"),
        hint(" toggle │ "),
    ];
    if app.state.is_loading() {
        spans.push(hint("fetching… │ "));
    } else {
        spans.push(key("Enter"));
        spans.push(hint(" fetch │ "));
    }
    spans.extend([
        key("↑/↓"),
        hint(" scroll │ "),
        key("?"),
        hint(" help │ "),
        key("q"),
        hint(" quit"),
    ]);

    let footer = Paragraph::new(Line::from(spans));
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = centered_rect(52, 14, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(
            " Help ",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));

    let entry = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), Style::default().fg(accent())),
            Span::styled(what, Style::default().fg(text())),
        ])
    };

    let lines = vec![
        entry("Tab/S-Tab", "Move between form fields"),
        entry("◂ / ▸", "Change the focused field"),
        entry("Space", "Toggle translation"),
        entry("t", "Reset the date to today"),
        entry("Enter", "Fetch news for the current form"),
        entry("↑/↓, j/k", "Scroll the results"),
        entry("PgUp/PgDn", "Scroll faster"),
        entry("q", "Quit"),
        Line::default(),
        Line::from(Span::styled(
            "  One query runs at a time; wait for it to finish.",
            Style::default().fg(text_dim()),
        )),
    ];

    let help = Paragraph::new(lines).block(block);
    f.render_widget(help, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
