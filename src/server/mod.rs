mod reconciliation_sweep;
mod server;

pub use reconciliation_sweep::*;
pub use server::*;
