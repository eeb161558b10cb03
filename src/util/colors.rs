use ratatui::style::Color;

pub const PRIMARY: Color = Color::from_u32(0x00ff5500);
pub const SECONDARY: Color = Color::from_u32(0x00c74300);
pub const NEUTRAL: Color = Color::from_u32(0x00505050);
pub const BACKGROUND: Color = Color::from_u32(0x000d0d0d);
pub const ERROR: Color = Color::from_u32(0x00e05561);
