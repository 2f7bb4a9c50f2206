//! Signed tracking tokens
//!
//! A token is an HS256 JWT carrying a [`TrackingClaim`]. Everything needed to
//! serve a redirect lives inside the token, so no storage is consulted on click.

mod claims;
mod codec;
mod error;

pub use claims::{OwnerId, TrackingClaim};
pub use codec::{TokenCodec, decode, encode};
pub use error::{EncodeError, TokenError};
