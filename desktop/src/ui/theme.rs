//! # GUI Theme
//!
//! Dark palette for the chat view: high contrast text, a blue tint for the
//! user's bubbles and a neutral gray for the assistant's.

use egui::Color32;

pub struct Theme {
    /// Normal text color
    pub normal: Color32,
    /// Dimmed/secondary text (timestamps, hints)
    pub dim: Color32,
    /// Online/positive accents
    pub success: Color32,
    /// Rate-limited/negative accents
    pub error: Color32,
    /// Startup notices
    pub warning: Color32,
    /// Background of user message bubbles
    pub user_bubble: Color32,
    /// Background of assistant message bubbles
    pub ai_bubble: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            normal: Color32::from_rgb(235, 235, 235),
            dim: Color32::from_rgb(150, 150, 150),
            success: Color32::from_rgb(0, 200, 80),
            error: Color32::from_rgb(230, 60, 60),
            warning: Color32::from_rgb(255, 170, 0),
            user_bubble: Color32::from_rgb(0, 90, 180),
            ai_bubble: Color32::from_rgb(55, 55, 60),
        }
    }
}
