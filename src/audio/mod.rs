pub mod error;
pub mod session;
pub mod sink;
pub mod state;
pub mod system;
