pub mod demo;
pub mod error;
pub mod factory;
pub mod operator;
pub mod plan;
pub mod report;
pub mod sim;
pub mod viz;

pub use error::SimError;

#[cfg(test)]
mod test;
