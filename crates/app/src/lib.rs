//! Shared application domain and service wiring modules.

pub mod context;
pub mod domain;
pub mod memory;

#[cfg(test)]
mod test;
