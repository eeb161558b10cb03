use tracing::error;

use crate::ui::tui;

/// Restores the terminal before the default handler prints, so the panic
/// message is readable and also lands in the log file.
pub fn set_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = tui::Tui::restore();
        error!(panic = %info, "panicked");
        default_hook(info);
    }));
}
