// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine le dream board à partir des view models de CatalogView :
//
//   ┌ header : titre + cours ───────────────────────────────┐
//   ├ filtres ──────────────────────────────────────────────┤
//   ├ catalogue (60%)             │ liste de rêve (40%)     ┤
//   │                             ├ totaux + jours          ┤
//   └ footer : raccourcis / saisie du revenu ───────────────┘
//
// Une zone trop petite pour être dessinée est simplement ignorée.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, Focus, Screen};
use crate::catalog::{DreamListView, Filter};
use crate::ui::format::{days_message, format_sol, format_usd, update_status};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_filters(frame, app, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    render_catalog(frame, app, body[0]);
    render_dream_list(frame, app, body[1]);

    match app.current_screen {
        Screen::Board => render_footer(frame, app, chunks[3]),
        Screen::IncomeInput => render_input_footer(frame, app, chunks[3]),
    }
}

/// Crée le layout principal (header, filtres, contenu, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Filtres
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

/// Zone utilisable pour un widget avec bordures, None si trop petite
fn target(area: Rect) -> Option<Rect> {
    if area.width < 4 || area.height < 3 {
        None
    } else {
        Some(area)
    }
}

fn border_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

// ============================================================================
// Header : titre et cours
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(area) = target(area) else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" DreamBoard ")
        .title_alignment(Alignment::Center);

    let line = Line::from(vec![
        Span::styled(
            app.view.rate().to_string(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({})", update_status(app.last_update.as_ref())),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let paragraph = Paragraph::new(line)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Filtres de catégorie
// ============================================================================

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let Some(area) = target(area) else {
        return;
    };

    let titles: Vec<Line> = Filter::choices()
        .iter()
        .enumerate()
        .map(|(i, filter)| Line::from(format!("[{}] {}", i, filter.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Filter "),
        )
        .select(app.filter_index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        );

    frame.render_widget(tabs, area);
}

// ============================================================================
// Catalogue
// ============================================================================

fn render_catalog(frame: &mut Frame, app: &App, area: Rect) {
    let Some(area) = target(area) else {
        return;
    };

    let focused = app.focus == Focus::Catalog;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(format!(" Catalog · {} ", app.view.filter().label()));

    let cards = app.view.catalog_cards();
    if cards.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No products in this category",
                Style::default().fg(Color::Gray),
            )),
        ])
        .block(block)
        .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            let mut spans = vec![
                Span::raw(format!(" {:<24}", card.product.name)),
                Span::styled(
                    format!("{:>13}", format_usd(card.product.price)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("  {:>12}", format_sol(card.quote_value)),
                    Style::default().fg(Color::Magenta),
                ),
            ];

            if app.is_flashing(card.product.id) {
                spans.push(Span::styled(
                    "  Added!",
                    Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(focused));

    let mut state = ListState::default();
    state.select(Some(app.catalog_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn highlight_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

// ============================================================================
// Liste de rêve
// ============================================================================

fn render_dream_list(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(6)])
        .split(area);

    render_dream_entries(frame, app, chunks[0]);
    render_dream_summary(frame, app, chunks[1]);
}

fn render_dream_entries(frame: &mut Frame, app: &App, area: Rect) {
    let Some(area) = target(area) else {
        return;
    };

    let focused = app.focus == Focus::DreamList;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(" ✨ Dream list ");

    let lines = match app.view.dream_view() {
        DreamListView::Empty => {
            let paragraph = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Your dream is empty... for now",
                    Style::default().fg(Color::Gray),
                )),
            ])
            .block(block)
            .alignment(Alignment::Center);

            frame.render_widget(paragraph, area);
            return;
        }
        DreamListView::Items { lines, .. } => lines,
    };

    let items: Vec<ListItem> = lines
        .iter()
        .map(|line| {
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {:<20}", line.product.name)),
                Span::styled(format!(" x{:<3}", line.quantity), Style::default().fg(Color::Yellow)),
                Span::raw(format!("{} • ", format_usd(line.product.price))),
                Span::styled(format_sol(line.quote_value), Style::default().fg(Color::Magenta)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(focused));

    let mut state = ListState::default();
    state.select(Some(app.dream_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_dream_summary(frame: &mut Frame, app: &App, area: Rect) {
    let Some(area) = target(area) else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Total ");

    let view = app.view.dream_view();
    let totals_line = match view {
        DreamListView::Empty => Line::from(Span::styled("—", Style::default().fg(Color::Gray))),
        DreamListView::Items { totals, .. } => Line::from(vec![
            Span::styled(
                format_usd(totals.total_fiat),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(
                format_sol(totals.total_quote),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
        ]),
    };

    let income = if app.income_text.is_empty() {
        "daily income: —  [i] to set".to_string()
    } else {
        format!("daily income: ◎{}  [i] to edit", app.income_text)
    };

    let paragraph = Paragraph::new(vec![
        totals_line,
        Line::from(Span::styled(days_message(view), Style::default().fg(Color::Green))),
        Line::from(Span::styled(income, Style::default().fg(Color::Gray))),
    ])
    .block(block)
    .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let Some(area) = target(area) else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[↑↓ / j k]", key),
            Span::raw(" Navigate  "),
            Span::styled("[Tab]", key),
            Span::raw(" Switch pane  "),
            Span::styled("[f/F 0-5]", key),
            Span::raw(" Filter  "),
            Span::styled("[a]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Add  "),
            Span::styled("[d]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Remove  "),
            Span::styled("[i]", key),
            Span::raw(" Income"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Footer en mode saisie du revenu
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let Some(area) = target(area) else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" [Enter] Confirm  [ESC] Cancel ");

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let paragraph = Paragraph::new(vec![input_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use ratatui::{backend::TestBackend, Terminal};

    use crate::catalog::CatalogView;
    use crate::models::{default_catalog, Rate};

    fn screen_text(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_board() {
        let mut app = App::new(CatalogView::new(default_catalog(), Rate::DEFAULT));
        let text = screen_text(&app, 140, 30);

        assert!(text.contains("1 SOL = $160.00"));
        assert!(text.contains("Rolex Daytona"));
        assert!(text.contains("Your dream is empty... for now"));
        assert!(text.contains("Start adding items to your dream!"));

        app.add_selected(Instant::now());
        let text = screen_text(&app, 140, 30);
        assert!(text.contains("Added!"));
        assert!(text.contains("Enter your daily SOL income to calculate"));
    }

    #[test]
    fn test_render_tiny_terminal_does_not_panic() {
        let app = App::new(CatalogView::new(default_catalog(), Rate::DEFAULT));
        screen_text(&app, 10, 4);
    }
}
