pub mod legacy;
pub mod policy;
pub mod sync;
pub mod types;
