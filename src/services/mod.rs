pub mod provider;
pub mod suggest;
pub mod weather;
