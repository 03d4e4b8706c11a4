//! Request-level domain types with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod close_date;
pub mod email;
pub mod pagination;
pub mod record_type;

pub use validation::{non_empty, required, required_id, ValidationError};
pub use close_date::parse_close_date;
pub use email::Email;
pub use pagination::{Paginated, Pagination, PaginationParams};
pub use record_type::RecordType;
