//! Verdant channel: the push connection adapter.
//!
//! Consumers see two operations: [`PushChannel::subscribe`] registers for
//! one event name and receives decoded events in receipt order, and
//! [`PushChannel::emit`] sends without waiting for acknowledgement. The
//! underlying connection is established and silently re-established here;
//! subscribers never observe a reconnect, only (possibly) duplicated or
//! missed deliveries around one. De-duplication is deliberately not done
//! at this layer — that is the reconciler's job.
//!
//! Ordering guarantee: within a single event name, delivery order equals
//! receipt order. Across distinct names there is no guarantee.

pub mod channel;
pub mod reconnect;
pub mod transport;

pub use channel::{PushChannel, Subscription};
pub use reconnect::{ReconnectConfig, ReconnectStats};
pub use transport::{InProcTransport, RemoteEnd, Transport};
