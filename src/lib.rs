//! Anonymous Apex execution against a Salesforce org.
//!
//! The pipeline: acquire the source to run ([`source`]), wrap it in the
//! SOAP `executeAnonymous` envelope ([`soap`]), submit it over an
//! authenticated connection ([`transport`]), and normalize the
//! heterogeneous reply shapes into one flat record ([`response`]).

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod response;
pub mod session;
pub mod soap;
pub mod source;
pub mod transport;

pub use error::ExecError;
pub use response::ExecuteAnonymousResult;
pub use session::Session;
