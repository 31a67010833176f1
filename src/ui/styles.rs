use ratatui::style::{Color, Modifier, Style};

pub struct PanelStyles {
    pub mount: Style,
    pub unmount: Style,
    pub unmounted: Style,
    pub key: Style,
    pub status: Style,
}

impl Default for PanelStyles {
    fn default() -> Self {
        Self {
            mount: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            unmount: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC | Modifier::DIM),
            unmounted: Style::default().add_modifier(Modifier::DIM),
            key: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            status: Style::default().add_modifier(Modifier::DIM),
        }
    }
}
