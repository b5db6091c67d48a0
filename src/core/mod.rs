pub mod config;
pub mod error;
pub mod eval;
pub mod graph;
pub mod link;
pub mod node;
pub mod observer;
pub mod persist;
pub mod port;
pub mod propagate;
pub mod session;
pub mod signature;
pub mod validation;
pub mod value;
