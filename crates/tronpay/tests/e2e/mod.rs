//! End-to-end flows.

pub mod http_flow_test;
pub mod transfer_test;
