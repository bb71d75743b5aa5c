//! End-to-end runs through the mediator with recording fakes standing in
//! for the engine and the operating system.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use url::Url;
use webwrap::bindings::{
    ErrorReporter, Mediator, MenuResponder, NavigationResponder, PermissionResponder, UriLauncher,
};
use webwrap::cli::{Args, Startup};
use webwrap::config::Config;
use webwrap::context_menu::{HitTest, MenuAction, MenuDisposition, MenuItem};
use webwrap::error::LaunchError;
use webwrap::navigation::{NavigationAction, NavigationDisposition, PolicyDecision};
use webwrap::permissions::{MediaDevices, PermissionDisposition, PermissionRequest};

#[derive(Default)]
struct Desktop {
    opened: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
    broken: bool,
}

impl UriLauncher for &Desktop {
    fn launch_default_handler(&self, uri: &Url) -> Result<(), LaunchError> {
        if self.broken {
            return Err(LaunchError {
                uri: uri.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "xdg-open not found"),
            });
        }
        self.opened.borrow_mut().push(uri.to_string());
        Ok(())
    }
}

impl ErrorReporter for &Desktop {
    fn report(&self, error: &LaunchError) {
        self.errors.borrow_mut().push(error.to_string());
    }
}

/// What the engine was told for one request.
#[derive(Default)]
struct Log(RefCell<Vec<&'static str>>);

struct Pending<'a>(&'a Log);

impl PermissionResponder for Pending<'_> {
    fn allow(self) {
        self.0.0.borrow_mut().push("allow");
    }
    fn deny(self) {
        self.0.0.borrow_mut().push("deny");
    }
}

impl NavigationResponder for Pending<'_> {
    fn ignore(self) {
        self.0.0.borrow_mut().push("ignore");
    }
    fn handled(self) {
        self.0.0.borrow_mut().push("handled");
    }
    fn use_default(self) {
        self.0.0.borrow_mut().push("use_default");
    }
}

struct EngineMenu {
    items: Vec<MenuItem>,
    suppressed: bool,
}

impl MenuResponder for EngineMenu {
    fn items(&self) -> Vec<MenuItem> {
        self.items.clone()
    }
    fn remove_item(&mut self, item: &MenuItem) {
        self.items.retain(|i| i != item);
    }
    fn suppress(&mut self) {
        self.suppressed = true;
    }
}

fn mediator_for<'a>(permit: &[&str], desktop: &'a Desktop) -> Mediator<&'a Desktop, &'a Desktop> {
    let args = Args {
        permit: permit.iter().map(|p| p.to_string()).collect(),
        ..Args::default()
    };
    let startup = Startup::resolve(args, Config::default()).unwrap();
    Mediator::new(Rc::new(startup.policy), desktop, desktop)
}

#[test]
fn test_granted_capabilities_only() {
    let desktop = Desktop::default();
    let mediator = mediator_for(&["geolocation", "video"], &desktop);
    let log = Log::default();

    let cases = [
        (PermissionRequest::Geolocation, PermissionDisposition::Allow),
        (PermissionRequest::Notification, PermissionDisposition::Deny),
        (PermissionRequest::Media(MediaDevices::AUDIO), PermissionDisposition::Deny),
        (PermissionRequest::Media(MediaDevices::VIDEO), PermissionDisposition::Allow),
        (PermissionRequest::Unrecognized, PermissionDisposition::Deny),
    ];
    for (request, expected) in cases {
        assert_eq!(mediator.on_permission_request(request, Pending(&log)), expected);
    }
    assert_eq!(*log.0.borrow(), ["allow", "deny", "deny", "allow", "deny"]);
}

#[test]
fn test_no_grants_denies_everything() {
    let desktop = Desktop::default();
    let mediator = mediator_for(&[], &desktop);
    let log = Log::default();

    for request in [
        PermissionRequest::Geolocation,
        PermissionRequest::Notification,
        PermissionRequest::Media(MediaDevices::AUDIO),
        PermissionRequest::Media(MediaDevices::VIDEO),
    ] {
        mediator.on_permission_request(request, Pending(&log));
    }
    assert!(log.0.borrow().iter().all(|answer| *answer == "deny"));
}

#[test]
fn test_clicked_link_leaves_the_window() {
    let desktop = Desktop::default();
    let mediator = mediator_for(&[], &desktop);
    let log = Log::default();

    let decision = PolicyDecision::Navigation(NavigationAction::LinkClicked {
        uri: Url::parse("https://docs.example.org/guide").unwrap(),
    });
    assert_eq!(
        mediator.on_decide_policy(&decision, Pending(&log)),
        NavigationDisposition::Handled
    );
    assert_eq!(*desktop.opened.borrow(), ["https://docs.example.org/guide"]);
    assert_eq!(*log.0.borrow(), ["handled"]);
}

#[test]
fn test_broken_launcher_is_reported_and_view_stays() {
    let desktop = Desktop {
        broken: true,
        ..Desktop::default()
    };
    let mediator = mediator_for(&[], &desktop);
    let log = Log::default();

    let decision = PolicyDecision::NewWindow(NavigationAction::LinkClicked {
        uri: Url::parse("https://popup.example/").unwrap(),
    });
    assert_eq!(
        mediator.on_decide_policy(&decision, Pending(&log)),
        NavigationDisposition::Handled
    );
    assert!(desktop.opened.borrow().is_empty());
    let errors = desktop.errors.borrow();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("https://popup.example/"));
    assert_eq!(*log.0.borrow(), ["handled"]);
}

#[test]
fn test_history_and_engine_defaults() {
    let desktop = Desktop::default();
    let mediator = mediator_for(&[], &desktop);
    let log = Log::default();

    for decision in [
        PolicyDecision::Navigation(NavigationAction::BackForward),
        PolicyDecision::Navigation(NavigationAction::Reload),
        PolicyDecision::Navigation(NavigationAction::FormSubmitted),
        PolicyDecision::Response,
    ] {
        mediator.on_decide_policy(&decision, Pending(&log));
    }
    assert_eq!(
        *log.0.borrow(),
        ["ignore", "use_default", "use_default", "use_default"]
    );
    assert!(desktop.opened.borrow().is_empty());
}

#[test]
fn test_image_menu_keeps_copy_entries() {
    let desktop = Desktop::default();
    let mediator = mediator_for(&[], &desktop);

    let mut menu = EngineMenu {
        items: vec![
            MenuItem::stock(MenuAction::OpenImageInNewWindow),
            MenuItem::stock(MenuAction::SaveImage),
            MenuItem::stock(MenuAction::CopyImage),
            MenuItem::stock(MenuAction::CopyImageUrl),
            MenuItem::stock(MenuAction::InspectElement),
        ],
        suppressed: false,
    };
    let hit = HitTest {
        is_image: true,
        ..HitTest::default()
    };

    assert_eq!(mediator.on_context_menu(&mut menu, hit), MenuDisposition::Pruned);
    assert_eq!(
        menu.items,
        [
            MenuItem::stock(MenuAction::CopyImage),
            MenuItem::stock(MenuAction::CopyImageUrl)
        ]
    );
    assert!(!menu.suppressed);
}

#[test]
fn test_editable_menu_is_suppressed() {
    let desktop = Desktop::default();
    let mediator = mediator_for(&[], &desktop);

    let mut menu = EngineMenu {
        items: vec![
            MenuItem::stock(MenuAction::Cut),
            MenuItem::stock(MenuAction::Copy),
            MenuItem::stock(MenuAction::Paste),
        ],
        suppressed: false,
    };
    let hit = HitTest {
        is_editable: true,
        ..HitTest::default()
    };

    assert_eq!(mediator.on_context_menu(&mut menu, hit), MenuDisposition::Suppressed);
    assert!(menu.suppressed);
}

#[test]
fn test_unknown_permission_token_aborts_startup() {
    let args = Args {
        permit: vec!["camera".to_string()],
        ..Args::default()
    };
    let err = Startup::resolve(args, Config::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown type of permission request 'camera' supplied to --permit."
    );
}
