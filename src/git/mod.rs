pub mod analysis;
pub mod branches;
pub mod executor;
pub mod reconcile;
pub mod status;

// Re-export commonly used items
pub use analysis::*;
pub use branches::*;
pub use executor::*;
pub use reconcile::*;
pub use status::*;
