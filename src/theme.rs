use ratatui::style::Color;

/// Persisted light/dark display preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colors applied to every widget for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub rating: Color,
    pub border: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub error: Color,
}

impl Theme {
    /// Interpret a stored value; anything but "dark" means light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label of the toggle: it names the mode you switch to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "🌙 Dark Mode",
            Theme::Dark => "☀️ Light Mode",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: Color::Rgb(245, 245, 245),
                text: Color::Rgb(30, 30, 30),
                muted: Color::Gray,
                accent: Color::Rgb(231, 76, 60),
                rating: Color::Rgb(200, 140, 0),
                border: Color::Rgb(180, 180, 180),
                highlight_bg: Color::Rgb(231, 76, 60),
                highlight_fg: Color::White,
                error: Color::Rgb(231, 76, 60),
            },
            Theme::Dark => Palette {
                background: Color::Rgb(24, 24, 27),
                text: Color::Rgb(235, 235, 235),
                muted: Color::DarkGray,
                accent: Color::Cyan,
                rating: Color::Yellow,
                border: Color::DarkGray,
                highlight_bg: Color::DarkGray,
                highlight_fg: Color::White,
                error: Color::LightRed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stored_defaults_to_light() {
        assert_eq!(Theme::from_stored(None), Theme::Light);
        assert_eq!(Theme::from_stored(Some("light")), Theme::Light);
        assert_eq!(Theme::from_stored(Some("DARK")), Theme::Light);
        assert_eq!(Theme::from_stored(Some("dark")), Theme::Dark);
    }

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
        assert_eq!(Theme::from_stored(Some(Theme::Dark.as_str())), Theme::Dark);
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(Theme::Light.palette(), Theme::Dark.palette());
    }
}
