//! Order execution for deltabot.
//!
//! Builds the canonical market-order body, signs it with HMAC-SHA256,
//! submits it over REST and interprets the fill. Every failure maps to
//! "no confirmed fill" at the `OrderGateway` boundary.

pub mod error;
pub mod gateway;
pub mod order;
pub mod signer;

pub use error::{ExecutorError, ExecutorResult};
pub use gateway::{
    BoxFuture, MockOrderGateway, OrderGateway, PlacedOrder, RestOrderGateway, ORDERS_ENDPOINT,
};
pub use order::{interpret_response, OrderRequest};
pub use signer::{prehash, Credentials, RequestSigner, SignedHeaders};
