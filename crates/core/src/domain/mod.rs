pub mod branch;
pub mod district;
pub mod manager;
pub mod region;
pub mod snapshot;
