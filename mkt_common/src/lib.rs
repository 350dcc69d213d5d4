mod cents;
mod helpers;

pub mod op;
mod secret;

pub use cents::{Cents, CentsConversionError, BASIS_POINTS_PER_UNIT, CURRENCY_CODE};
pub use helpers::parse_boolean_flag;
pub use secret::Secret;
