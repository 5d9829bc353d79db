pub mod guard;
pub mod request;
pub mod router;

pub use request::{GenericRequest, GenericResponse};
pub use router::{Api, RequestHandler};
