pub mod audio;
pub mod source;
pub mod ui;
pub mod util;
