use crate::tracking::WorkStatus;
use eframe::egui::Color32;

pub trait ColorExt {
    fn from_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Color32::from_rgb(r, g, b))
    }
}

pub const ACCENT: &str = "#a159e1";
pub const SUCCESS: &str = "#00b400";
pub const ERROR: &str = "#dc3232";
pub const MUTED: &str = "#969696";
pub const WARNING: &str = "#e0a000";

pub fn palette(hex: &str) -> Color32 {
    Color32::from_hex(hex).unwrap_or(Color32::GRAY)
}

pub fn badge_color(status: &WorkStatus) -> Color32 {
    match status {
        WorkStatus::Pending => palette(MUTED),
        WorkStatus::Running => palette(ACCENT),
        WorkStatus::Completed => palette(SUCCESS),
        WorkStatus::Failed => palette(ERROR),
        WorkStatus::NotFound | WorkStatus::Unknown(_) => palette(WARNING),
    }
}
