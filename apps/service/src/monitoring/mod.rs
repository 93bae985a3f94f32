/// Check engine module - executes one probe cycle per rule
///
/// This module is responsible for:
/// - Issuing HTTP(S) requests with per-rule timeouts and retry budgets
/// - Following redirects up to the configured maximum
/// - Inspecting peer-certificate expiry on encrypted targets
/// - Evaluating content operators against the response body
pub mod cert;
pub mod probe;
pub mod types;

pub use probe::{Fetch, Prober, ReqwestFetcher};
pub use types::{CheckOutcome, ProbeError};
