pub mod routing_gate;

pub use routing_gate::{routing_gate, MAIN_ROUTE_NAME, ROUTE_KEY};
