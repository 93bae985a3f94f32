/// Incident state engine - diffs check outcomes against stored records
///
/// Decides error-state transitions, accounts downtime, composes the
/// human-readable alert lines, and fans them out to contacts by bitfield.
pub mod messages;
pub mod routing;
pub mod state;

pub use state::{Evaluation, Persistence, evaluate};
