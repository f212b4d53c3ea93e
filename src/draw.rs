use std::io::{self, Stdout};
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::scene::{Phase, Scene};
use crate::ui::layout::LayoutAreas;

pub fn draw(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &App,
    scene: &Scene,
) -> io::Result<()> {
    let current_size = terminal.size()?;
    if current_size.width <= 10 || current_size.height <= 5 {
        return Ok(());
    }

    let mut layout = LayoutAreas::new(current_size);

    terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);
        draw_panel(f, layout.panel, scene);
        if let Some(area) = layout.logs {
            draw_logs(f, area);
        }
    })?;
    Ok(())
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_panel(f: &mut Frame, area: Rect, scene: &Scene) {
    let color = match scene.phase {
        Phase::InGame => Color::White,
        Phase::PreGame | Phase::PostGame => Color::Gray,
        Phase::Idle => Color::DarkGray,
    };
    let block = default_border(color);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let width = inner.width as usize;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(spread(&scene.home, &scene.status, &scene.away, width), bold)),
        Line::from(Span::styled(
            spread(&scene.home_score.to_string(), "", &scene.away_score.to_string(), width),
            bold,
        )),
        Line::from(""),
    ];

    // keep the footer on the last row
    let footer = usize::from(scene.detail.is_some());
    let room = (inner.height as usize).saturating_sub(lines.len() + footer);
    let skip = scene.events.len().saturating_sub(room);
    lines.extend(scene.events[skip..].iter().map(|event| Line::from(clip(event, width))));

    if let Some(detail) = &scene.detail {
        let filler = (inner.height as usize).saturating_sub(lines.len() + 1);
        lines.extend(std::iter::repeat_n(Line::from(""), filler));
        lines.push(Line::from(Span::styled(
            clip(detail, width),
            Style::default().fg(Color::Gray),
        )));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .output_target(false)
        .output_file(false)
        .output_line(false);
    f.render_widget(logs, area);
}

/// `left`, `center` and `right` laid out on one row of `width` cells.
fn spread(left: &str, center: &str, right: &str, width: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = width.saturating_sub(used);
    let center = clip(center, gap.saturating_sub(2));
    let center_len = center.chars().count();
    let before = gap.saturating_sub(center_len) / 2;
    let after = gap.saturating_sub(center_len + before);
    format!(
        "{left}{}{center}{}{right}",
        " ".repeat(before),
        " ".repeat(after)
    )
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_fills_the_row() {
        let row = spread("MIN", "Q2 05:12", "DEN", 38);
        assert_eq!(row.chars().count(), 38);
        assert!(row.starts_with("MIN "));
        assert!(row.ends_with(" DEN"));
        assert!(row.contains("Q2 05:12"));
    }

    #[test]
    fn spread_clips_a_long_center() {
        let row = spread("MIN", "Tip-off 03/01/26 19:00 local", "DEN", 20);
        assert_eq!(row.chars().count(), 20);
        assert!(row.starts_with("MIN "));
        assert!(row.ends_with(" DEN"));
    }

    #[test]
    fn clip_counts_characters() {
        assert_eq!(clip("Gobert dunk", 6), "Gobert");
        assert_eq!(clip("ok", 6), "ok");
    }
}
