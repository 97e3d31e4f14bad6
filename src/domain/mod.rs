// Domain layer: options, gif metadata, report, and the ports the pipeline is built on.

pub mod model;
pub mod ports;
