pub mod provider;
pub mod providers;
pub mod tools;
pub mod types;
