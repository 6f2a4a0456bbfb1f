pub mod ask;
pub mod liveness;
pub mod readiness;
pub mod upload;
