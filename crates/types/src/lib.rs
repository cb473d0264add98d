pub mod principal;
pub mod record;

pub use principal::*;
pub use record::*;
