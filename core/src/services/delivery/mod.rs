//! Delivery log and recipient status state machine
//!
//! - `log_writer` - appends pending and terminal entries
//! - `status` - recomputes the recipient aggregate after terminal writes

mod log_writer;
mod status;

pub use log_writer::DeliveryLogWriter;
pub use status::{reduce_status, RecipientStatusUpdater};
