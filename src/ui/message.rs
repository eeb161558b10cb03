#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMessage {
    Quit,
    TogglePlayPause,
    Stop,
    Download,
    OpenSearch,
}
