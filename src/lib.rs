pub mod api;
pub mod cli;
pub mod config;
pub mod propagation;
pub mod reconciler;
pub mod rollout;

#[cfg(test)]
mod tests;

pub use reconciler::{reconcile, Action, ReconcileError, Reconciler};
