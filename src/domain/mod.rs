// Domain layer: data models and ports (interfaces). No transport code here.

pub mod model;
pub mod ports;
