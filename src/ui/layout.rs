use tui::layout::{Constraint, Flex, Layout, Rect, Size};

/// Character footprint of the 250x122 e-paper panel this mode stands in for.
pub const PANEL_WIDTH: u16 = 40;
pub const PANEL_HEIGHT: u16 = 12;
pub const LOG_HEIGHT: u16 = 8;

/// Pre-computed layout areas for the main draw loop.
#[derive(Debug, PartialEq, Eq)]
pub struct LayoutAreas {
    pub panel: Rect,
    pub logs: Option<Rect>,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let (main, logs) = if show_logs {
            let [main, logs] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(LOG_HEIGHT)]).areas(area);
            (main, Some(logs))
        } else {
            (area, None)
        };

        if full_screen {
            return LayoutAreas { panel: main, logs };
        }

        LayoutAreas {
            panel: Self::center_panel(main),
            logs,
        }
    }

    fn center_panel(area: Rect) -> Rect {
        let [row] = Layout::vertical([Constraint::Length(PANEL_HEIGHT)])
            .flex(Flex::Center)
            .areas(area);
        let [panel] = Layout::horizontal([Constraint::Length(PANEL_WIDTH)])
            .flex(Flex::Center)
            .areas(row);
        panel
    }
}
