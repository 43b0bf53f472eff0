use std::future::Future;

use crate::error::AppError;

/// Fetches a page body from a URL.
///
/// Implementations return the body for any completed response, whatever
/// its HTTP status. Only failures that happen before a body is available
/// (connect, DNS, reset, timeout) are errors.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}
