pub mod loader;
pub mod reconcile;
pub mod schema_gen;
pub mod session;

pub use loader::*;
pub use reconcile::{reconcile, Decision};
pub use session::Session;
