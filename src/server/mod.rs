pub mod router;
pub mod routes;

pub use router::{VisadeskState, visadesk_router};
