//! Glue between engine callbacks and the three decision modules.
//!
//! An engine binding calls exactly one [`Mediator`] method per callback and
//! hands over a responder wrapping the engine's own request object. The
//! mediator decides, then talks back through the responder:
//!
//! | Callback                | Decision module          | Responder calls                    |
//! |-------------------------|--------------------------|------------------------------------|
//! | `on_permission_request` | [`permissions::decide`]  | `allow()` or `deny()`              |
//! | `on_decide_policy`      | [`navigation::decide`]   | `ignore()`, or the optional hooks  |
//! | `on_context_menu`       | [`context_menu::decide`] | `remove_item()` or `suppress()`    |

use std::rc::Rc;

use tracing::debug;
use url::Url;

use crate::config::PolicyConfiguration;
use crate::context_menu::{self, ContextMenuRequest, HitTest, MenuDisposition, MenuItem};
use crate::error::LaunchError;
use crate::navigation::{self, NavigationDisposition, PolicyDecision};
use crate::permissions::{self, PermissionDisposition, PermissionRequest};

// ─────────────────────────────────────────────────────────────────────────────
// Collaborators
// ─────────────────────────────────────────────────────────────────────────────

/// The engine's pending permission request. Consumed by the answer.
pub trait PermissionResponder {
    fn allow(self);
    fn deny(self);
}

/// The engine's pending navigation decision.
///
/// Only `ignore` is required. The other two hooks exist for engines that
/// need an explicit answer; by default they do nothing, which the engine
/// reads as "no decision made".
pub trait NavigationResponder: Sized {
    fn ignore(self);

    /// The target went to the OS handler; the view must stay where it is.
    fn handled(self) {}

    fn use_default(self) {}
}

/// Opens a URI in the operating system's default application.
///
/// Implementations must not wait for the launched program.
pub trait UriLauncher {
    fn launch_default_handler(&self, uri: &Url) -> Result<(), LaunchError>;
}

/// Receives recoverable failures that must not interrupt browsing.
pub trait ErrorReporter {
    fn report(&self, error: &LaunchError);
}

/// A context menu built by the engine, editable in place.
pub trait MenuResponder {
    fn items(&self) -> Vec<MenuItem>;
    fn remove_item(&mut self, item: &MenuItem);
    /// No menu should be shown.
    fn suppress(&mut self);
}

// ─────────────────────────────────────────────────────────────────────────────
// Mediator
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the shared policy and the outbound collaborators.
pub struct Mediator<L, R> {
    policy: Rc<PolicyConfiguration>,
    launcher: L,
    reporter: R,
}

impl<L: UriLauncher, R: ErrorReporter> Mediator<L, R> {
    pub fn new(policy: Rc<PolicyConfiguration>, launcher: L, reporter: R) -> Self {
        Self {
            policy,
            launcher,
            reporter,
        }
    }

    /// The policy every decision is taken against.
    pub fn policy(&self) -> &PolicyConfiguration {
        &self.policy
    }

    pub fn on_permission_request<P: PermissionResponder>(
        &self,
        request: PermissionRequest,
        responder: P,
    ) -> PermissionDisposition {
        let disposition = permissions::decide(request, &self.policy);
        match disposition {
            PermissionDisposition::Allow => {
                responder.allow();
                debug!(?request, "Allowed permission request.");
            }
            PermissionDisposition::Deny => {
                responder.deny();
                debug!(?request, "Denied permission request.");
            }
        }
        disposition
    }

    /// A failed launch is reported and the navigation still counts as
    /// handled: the view never falls back to loading the link itself.
    pub fn on_decide_policy<N: NavigationResponder>(
        &self,
        decision: &PolicyDecision,
        responder: N,
    ) -> NavigationDisposition {
        let disposition = navigation::decide(decision);
        match disposition {
            NavigationDisposition::Handled => {
                if let Some(uri) = decision.link_target() {
                    debug!(%uri, "Opening link in default handler");
                    if let Err(error) = self.launcher.launch_default_handler(uri) {
                        self.reporter.report(&error);
                    }
                }
                responder.handled();
            }
            NavigationDisposition::Ignore => {
                debug!(?decision, "Ignoring navigation");
                responder.ignore();
            }
            NavigationDisposition::UseDefault => responder.use_default(),
        }
        disposition
    }

    pub fn on_context_menu<M: MenuResponder + ?Sized>(
        &self,
        menu: &mut M,
        hit_test: HitTest,
    ) -> MenuDisposition {
        let original = menu.items();
        let mut request = ContextMenuRequest {
            items: original.clone(),
            hit_test,
        };
        let disposition = context_menu::decide(&mut request);

        match disposition {
            MenuDisposition::Pruned => {
                // The kept items are a subsequence of the original ones.
                let mut kept = request.items.iter().peekable();
                for item in &original {
                    if kept.peek() == Some(&item) {
                        kept.next();
                    } else {
                        menu.remove_item(item);
                    }
                }
                debug!(kept = request.items.len(), "Pruned image context menu");
            }
            MenuDisposition::Suppressed => menu.suppress(),
            MenuDisposition::Unchanged => {}
        }
        disposition
    }
}
