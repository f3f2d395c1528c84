//! Application layer: the communication-service use case.

mod comm_service;

pub use comm_service::CommService;
