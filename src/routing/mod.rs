//! Declarative route metadata and boot-time route-table derivation.

pub mod descriptor;
pub mod endpoint;
pub mod processor;

pub use descriptor::{admin_controller_descriptor, ControllerDescriptor, MethodRoutes, RouteDef};
pub use endpoint::Endpoint;
pub use processor::{EndpointProcessor, RouteTable};
