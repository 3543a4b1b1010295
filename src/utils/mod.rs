// Utils compartidos

pub mod constants;
pub mod storage;
pub mod http_error;
pub mod spawner;

pub use constants::*;
pub use storage::*;
pub use http_error::*;
pub use spawner::*;
