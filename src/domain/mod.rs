// Domain layer: records and ports (interfaces). No rendering or file-system code here.

pub mod catalog;
pub mod model;
pub mod ports;
