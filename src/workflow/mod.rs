pub mod kyc_flow;

pub use kyc_flow::{Classification, KycFlow, KycResult};
