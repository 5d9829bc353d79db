// Domain layer: records and the ports the transports and handlers depend on.

pub mod model;
pub mod ports;
