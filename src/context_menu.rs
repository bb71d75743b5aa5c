//! Context menu filtering.
//!
//! Over an image only the two "copy" entries survive. Over editable text or
//! a selection there is no menu at all; anywhere else the engine's menu is
//! shown as built.

/// Stock actions an engine can put in a context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    OpenLink,
    OpenLinkInNewWindow,
    DownloadLink,
    CopyLink,
    OpenImageInNewWindow,
    SaveImage,
    CopyImage,
    CopyImageUrl,
    GoBack,
    GoForward,
    Stop,
    Reload,
    Cut,
    Copy,
    Paste,
    SelectAll,
    InspectElement,
    /// Separators and embedder-defined entries.
    Custom,
}

impl MenuAction {
    pub fn default_label(self) -> &'static str {
        match self {
            MenuAction::OpenLink => "Open Link",
            MenuAction::OpenLinkInNewWindow => "Open Link in New Window",
            MenuAction::DownloadLink => "Download Linked File",
            MenuAction::CopyLink => "Copy Link Address",
            MenuAction::OpenImageInNewWindow => "Open Image in New Window",
            MenuAction::SaveImage => "Save Image As",
            MenuAction::CopyImage => "Copy Image",
            MenuAction::CopyImageUrl => "Copy Image Address",
            MenuAction::GoBack => "Back",
            MenuAction::GoForward => "Forward",
            MenuAction::Stop => "Stop",
            MenuAction::Reload => "Reload",
            MenuAction::Cut => "Cut",
            MenuAction::Copy => "Copy",
            MenuAction::Paste => "Paste",
            MenuAction::SelectAll => "Select All",
            MenuAction::InspectElement => "Inspect Element",
            MenuAction::Custom => "",
        }
    }

    fn copies_image(self) -> bool {
        matches!(self, MenuAction::CopyImage | MenuAction::CopyImageUrl)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub action: MenuAction,
    pub label: String,
}

impl MenuItem {
    pub fn new(action: MenuAction, label: impl Into<String>) -> Self {
        Self {
            action,
            label: label.into(),
        }
    }

    pub fn stock(action: MenuAction) -> Self {
        Self::new(action, action.default_label())
    }
}

/// What was under the pointer when the menu was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitTest {
    pub is_image: bool,
    pub is_editable: bool,
    pub is_selection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenuRequest {
    pub items: Vec<MenuItem>,
    pub hit_test: HitTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuDisposition {
    /// Items were removed in place; show what is left.
    Pruned,
    /// Show no menu.
    Suppressed,
    /// Show the menu as built.
    Unchanged,
}

pub fn decide(menu: &mut ContextMenuRequest) -> MenuDisposition {
    let hit = menu.hit_test;
    if hit.is_image {
        menu.items.retain(|item| item.action.copies_image());
        MenuDisposition::Pruned
    } else if hit.is_editable || hit.is_selection {
        MenuDisposition::Suppressed
    } else {
        MenuDisposition::Unchanged
    }
}
