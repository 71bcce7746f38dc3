// Domain layer: league models and the persistence ports the workflow runs against.

pub mod model;
pub mod ports;
