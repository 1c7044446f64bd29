pub mod aggregator;
pub mod g1;
pub mod g2;
pub mod resharing;
pub mod scalar;

pub use aggregator::{recover_public_key, recover_signature, verify, BlsError, DST};
