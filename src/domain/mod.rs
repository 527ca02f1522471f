// Domain layer: page/placeholder models and the ports to the collaborators that own remote access.

pub mod model;
pub mod ports;
pub mod widget_types;
