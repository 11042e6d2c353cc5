//! Application context handed to every controller.

use crate::api::Api;
use crate::bus::PageBus;
use std::sync::Arc;
use verdant_channel::PushChannel;
use verdant_core::{GroupId, UserId};
use verdant_sync::ViewContext;

/// Everything a controller needs at construction: who the user is and the
/// handles to the shared services. Passed explicitly, never ambient.
#[derive(Clone)]
pub struct AppContext {
    /// The signed-in user.
    pub user: UserId,
    /// Snapshot and mutation access.
    pub api: Arc<dyn Api>,
    /// The push connection.
    pub channel: PushChannel,
    /// Page-local widget bus.
    pub bus: PageBus,
}

impl AppContext {
    /// Context with a fresh page bus.
    pub fn new(user: UserId, api: Arc<dyn Api>, channel: PushChannel) -> Self {
        Self {
            user,
            api,
            channel,
            bus: PageBus::new(),
        }
    }

    /// The reconciler-facing view of this context.
    pub fn view_context(&self, active_group: Option<GroupId>) -> ViewContext {
        ViewContext {
            user: self.user,
            active_group,
        }
    }
}
