//! Built-in color themes.

use axum::http::HeaderMap;

use super::cookies::{self, SetCookie, THEME_COOKIE, THEME_COOKIE_MAX_AGE};

pub const DEFAULT_THEME: &str = "gruvbox-dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub bg: &'static str,
    pub bg1: &'static str,
    pub bg2: &'static str,
    pub fg: &'static str,
    pub fg1: &'static str,
    pub accent: &'static str,
    pub accent_hover: &'static str,
    pub success: &'static str,
    pub error: &'static str,
}

pub const THEMES: [Theme; 6] = [
    Theme {
        name: "gruvbox-dark",
        bg: "#282828",
        bg1: "#3c3836",
        bg2: "#504945",
        fg: "#ebdbb2",
        fg1: "#d5c4a1",
        accent: "#83a598",
        accent_hover: "#8ec07c",
        success: "#b8bb26",
        error: "#fb4934",
    },
    Theme {
        name: "light",
        bg: "#ffffff",
        bg1: "#f3f4f6",
        bg2: "#e5e7eb",
        fg: "#111827",
        fg1: "#4b5563",
        accent: "#3b82f6",
        accent_hover: "#2563eb",
        success: "#10b981",
        error: "#ef4444",
    },
    Theme {
        name: "nord",
        bg: "#2e3440",
        bg1: "#3b4252",
        bg2: "#434c5e",
        fg: "#eceff4",
        fg1: "#d8dee9",
        accent: "#88c0d0",
        accent_hover: "#81a1c1",
        success: "#a3be8c",
        error: "#bf616a",
    },
    Theme {
        name: "dracula",
        bg: "#282a36",
        bg1: "#44475a",
        bg2: "#6272a4",
        fg: "#f8f8f2",
        fg1: "#bfbfbf",
        accent: "#bd93f9",
        accent_hover: "#ff79c6",
        success: "#50fa7b",
        error: "#ff5555",
    },
    Theme {
        name: "solarized-dark",
        bg: "#002b36",
        bg1: "#073642",
        bg2: "#586e75",
        fg: "#fdf6e3",
        fg1: "#eee8d5",
        accent: "#268bd2",
        accent_hover: "#2aa198",
        success: "#859900",
        error: "#dc322f",
    },
    Theme {
        name: "solarized-light",
        bg: "#fdf6e3",
        bg1: "#eee8d5",
        bg2: "#93a1a1",
        fg: "#002b36",
        fg1: "#073642",
        accent: "#268bd2",
        accent_hover: "#2aa198",
        success: "#859900",
        error: "#dc322f",
    },
];

pub fn get(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.name == name)
}

pub fn default_theme() -> &'static Theme {
    &THEMES[0]
}

/// Theme selected by the request's cookie, or the default.
pub fn current(headers: &HeaderMap) -> &'static Theme {
    cookies::read(headers, THEME_COOKIE)
        .and_then(|name| get(&name))
        .unwrap_or_else(default_theme)
}

/// Cookie remembering `theme`; readable by scripts so the picker can show it.
pub fn cookie(theme: &Theme, secure: bool) -> SetCookie {
    SetCookie::new(THEME_COOKIE, theme.name, THEME_COOKIE_MAX_AGE).secure(secure)
}

impl Theme {
    /// `:root` CSS custom properties for this palette.
    pub fn css_variables(&self) -> String {
        format!(
            ":root{{--bg:{};--bg1:{};--bg2:{};--fg:{};--fg1:{};--accent:{};--accent-hover:{};--success:{};--error:{};}}",
            self.bg, self.bg1, self.bg2, self.fg, self.fg1, self.accent, self.accent_hover, self.success, self.error
        )
    }
}
