//! Navigation policy.
//!
//! The wrapped site stays put: clicked links leave the window and open in
//! the system's default handler, history traversal is refused, and
//! everything else (reloads, form posts, script-driven loads) is left to
//! the engine.
//!
//! ```text
//! PolicyDecision
//!   ├─ Navigation(action) ─┐
//!   ├─ NewWindow(action) ──┤
//!   │                      ├─ LinkClicked ─────────────────────────▶ Handled
//!   │                      ├─ BackForward ─────────────────────────▶ Ignore
//!   │                      └─ Reload / Form* / Other ─────────────▶ UseDefault
//!   └─ Response ──────────────────────────────────────────────────▶ UseDefault
//! ```

use url::Url;

/// How a navigation was initiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    LinkClicked { uri: Url },
    Reload,
    FormSubmitted,
    FormResubmitted,
    BackForward,
    Other,
}

/// A pending decision raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Navigation(NavigationAction),
    NewWindow(NavigationAction),
    /// Anything that is not about moving to a new document (e.g. whether to
    /// display a response). No opinion.
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDisposition {
    /// The target was handed to the operating system; the view does not move.
    Handled,
    /// The engine must not proceed.
    Ignore,
    /// Let the engine do what it would have done without us.
    UseDefault,
}

impl PolicyDecision {
    pub fn action(&self) -> Option<&NavigationAction> {
        match self {
            PolicyDecision::Navigation(action) | PolicyDecision::NewWindow(action) => Some(action),
            PolicyDecision::Response => None,
        }
    }

    /// Target of a clicked link, the only action that carries one.
    pub fn link_target(&self) -> Option<&Url> {
        match self.action()? {
            NavigationAction::LinkClicked { uri } => Some(uri),
            _ => None,
        }
    }
}

pub fn decide(decision: &PolicyDecision) -> NavigationDisposition {
    let Some(action) = decision.action() else {
        return NavigationDisposition::UseDefault;
    };

    match action {
        NavigationAction::LinkClicked { .. } => NavigationDisposition::Handled,
        NavigationAction::BackForward => NavigationDisposition::Ignore,
        NavigationAction::Reload
        | NavigationAction::FormSubmitted
        | NavigationAction::FormResubmitted
        | NavigationAction::Other => NavigationDisposition::UseDefault,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> NavigationAction {
        NavigationAction::LinkClicked {
            uri: Url::parse("https://example.org/page").unwrap(),
        }
    }

    fn table() -> Vec<(NavigationAction, NavigationDisposition)> {
        vec![
            (link(), NavigationDisposition::Handled),
            (NavigationAction::Reload, NavigationDisposition::UseDefault),
            (NavigationAction::FormSubmitted, NavigationDisposition::UseDefault),
            (NavigationAction::FormResubmitted, NavigationDisposition::UseDefault),
            (NavigationAction::BackForward, NavigationDisposition::Ignore),
            (NavigationAction::Other, NavigationDisposition::UseDefault),
        ]
    }

    #[test]
    fn test_navigation_table() {
        for (action, expected) in table() {
            let decision = PolicyDecision::Navigation(action.clone());
            assert_eq!(decide(&decision), expected, "{action:?}");
        }
    }

    #[test]
    fn test_new_window_follows_same_table() {
        for (action, expected) in table() {
            let decision = PolicyDecision::NewWindow(action.clone());
            assert_eq!(decide(&decision), expected, "{action:?}");
        }
    }

    #[test]
    fn test_response_decision_uses_default() {
        assert_eq!(decide(&PolicyDecision::Response), NavigationDisposition::UseDefault);
        assert_eq!(PolicyDecision::Response.link_target(), None);
    }

    #[test]
    fn test_link_target_only_for_link_clicked() {
        let decision = PolicyDecision::Navigation(link());
        assert_eq!(
            decision.link_target().map(Url::as_str),
            Some("https://example.org/page")
        );
        assert_eq!(PolicyDecision::Navigation(NavigationAction::Reload).link_target(), None);
    }

    #[test]
    fn test_decide_is_idempotent() {
        for (action, _) in table() {
            let decision = PolicyDecision::Navigation(action);
            assert_eq!(decide(&decision), decide(&decision));
        }
    }
}
