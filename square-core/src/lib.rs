//! # Square Core
//!
//! `square-core` implements both ends of the `square.v1.SquareService` gRPC service:
//! a unary call that squares one number, and a bidirectional stream where every
//! message is tagged with the correlation id of the session that sent it.
//!
//! ## Key Components
//!
//! * **[`SquareClient`]:** The client side. Performs unary calls and drives streaming
//!   sessions (the correlator), matching responses to their session by correlation id.
//! * **[`SquareResponder`]:** The `SquareService` implementation. Answers unary calls and
//!   runs one reactive [`server::session::ResponderSession`] per inbound stream.
//! * **[`SquareServer`]:** Binds a listening address and serves the responder (plus the
//!   reflection service) until a shutdown signal fires.
//! * **[`config`]:** Host, port and TLS settings for both sides.
//!
//! ## Re-exports
//!
//! This crate re-exports `tonic` and the generated bindings in `square_service` so that
//! consumers use compatible versions of them.
pub mod client;
pub mod config;
pub mod correlation;
pub mod server;

pub use client::{CallError, ClientConnectError, SquareClient, SquareStream};
pub use correlation::CorrelationId;
pub use server::{ServerError, SquareResponder, SquareServer};

// Re-exports
pub use square_service;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Squares a number.
///
/// Non-finite inputs follow IEEE-754: infinities square to `+inf` and NaN stays NaN.
pub fn square(number: f64) -> f64 {
    number * number
}

#[cfg(test)]
mod tests {
    use super::square;

    #[test]
    fn squares_with_a_single_multiplication() {
        assert_eq!(square(10.2), 104.04000000000001);
        assert_eq!(square(-3.0), 9.0);
        assert_eq!(square(0.0), 0.0);
    }

    #[test]
    fn non_finite_inputs_are_not_errors() {
        assert_eq!(square(f64::INFINITY), f64::INFINITY);
        assert_eq!(square(f64::NEG_INFINITY), f64::INFINITY);
        assert!(square(f64::NAN).is_nan());
    }

    #[test]
    fn large_values_overflow_to_infinity() {
        assert_eq!(square(f64::MAX), f64::INFINITY);
    }
}
