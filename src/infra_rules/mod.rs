mod rule_enforcing_store;

pub use rule_enforcing_store::*;
