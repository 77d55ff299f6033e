mod error_classification;
mod fallback;
mod gateway;
mod handlers;
mod respond;


pub use gateway::Gateway;
