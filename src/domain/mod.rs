// Domain layer: core models, workflow rules and ports (interfaces).
// No database or HTTP types here.

pub mod model;
pub mod numbering;
pub mod ports;
pub mod workflow;
