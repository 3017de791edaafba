pub mod dispatch;
pub mod engine;
pub mod prune;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
