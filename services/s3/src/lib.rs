//! SigV4 signing for path-style requests against S3-compatible object
//! storage, without a vendor SDK.
//!
//! The [`Signer`] turns a [`RequestSpec`] into a [`SignedRequest`]: the
//! complete header set (Authorization included) and the fully-qualified
//! target URI that a transport sends unmodified.
//!
//! # Example
//!
//! ```no_run
//! use objsign_s3::{Config, ObjectPath, RequestSpec, Signer};
//!
//! fn main() -> objsign_core::Result<()> {
//!     // Unset fields fall back to AWS_* environment variables.
//!     let config = Config {
//!         endpoint: Some("http://127.0.0.1:9000".to_string()),
//!         region: Some("us-east-1".to_string()),
//!         ..Default::default()
//!     }
//!     .from_env();
//!
//!     let signer = Signer::new(&config)?;
//!     let spec = RequestSpec::new(http::Method::GET, ObjectPath::bucket("testbucket"));
//!     let signed = signer.sign(&spec)?;
//!
//!     println!("{}", signed.uri());
//!     println!("{:?}", signed.headers());
//!     Ok(())
//! }
//! ```

mod config;
pub use config::Config;
pub use config::Endpoint;

mod credential;
pub use credential::Credential;

mod path;
pub use path::ObjectPath;

mod request;
pub use request::Content;
pub use request::RequestSpec;
pub use request::SignedRequest;

mod signer;
pub use signer::Signer;

mod constants;
pub use constants::UNSIGNED_PAYLOAD;
