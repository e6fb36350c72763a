//! # Baleen Client
//!
//! HTTP transport and typed method surface for the Bale Bot API.
//!
//! ## Overview
//!
//! This crate turns raw HTTP into typed calls:
//!
//! - [`ApiClient`] builds `{base}/bot{token}/{method}` requests and decodes
//!   the standard response envelope
//! - [`Bot`] exposes one method per API call, switching between JSON bodies
//!   and multipart uploads as the media source demands
//! - [`OtpClient`] talks to the separate OTP delivery service
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use baleen_client::Bot;
//! use baleen_types::{InputFile, SendMediaOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), baleen_client::ClientError> {
//!     let bot = Bot::new("123:token");
//!     let me = bot.get_me().await?;
//!     println!("running as @{}", me.username.as_deref().unwrap_or("?"));
//!
//!     bot.send_photo(
//!         1234,
//!         InputFile::path("cat.jpg"),
//!         SendMediaOptions::default().caption("meow"),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! No retry happens at this layer; the dispatch engine wraps calls in its
//! own retry policy.

pub mod bot;
pub mod error;
pub mod http;
pub mod otp;

mod upload;

pub use bot::Bot;
pub use error::{ClientError, ClientResult, OtpError, OtpResult};
pub use http::{ApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use otp::{DEFAULT_OTP_BASE_URL, OtpClient};
