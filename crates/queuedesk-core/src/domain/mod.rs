//! Domain model (ids, service points, tickets, errors, events).

pub mod errors;
pub mod events;
pub mod ids;
pub mod service_point;
pub mod ticket;

pub use self::errors::{DependencyError, ErrorKind, ServiceError, ValidationError};
pub use self::events::DomainEvent;
pub use self::ids::{InvalidIdentifier, ServicePointId};
pub use self::service_point::{ServicePointRecord, ServicePointRequest};
pub use self::ticket::{Ticket, TicketCompletionEvent};
