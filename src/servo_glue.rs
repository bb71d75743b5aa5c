//! Couche d'intégration entre Servo et la politique webwrap.
//!
//! 1. **[`Waker`] / [`WakerEvent`]** : pont `Send + Sync` entre les threads
//!    internes de Servo et la boucle Winit du thread principal.
//!
//! 2. **[`WebViewDelegate`] pour [`AppState`]** : chaque rappel sensible est
//!    traduit dans le vocabulaire de la politique puis confié au
//!    [`Mediator`](crate::bindings::Mediator) :
//!
//! ```text
//! request_permission(PermissionFeature) ─▶ on_permission_request ─▶ allow()/deny()
//! request_navigation(url)               ─▶ on_decide_policy      ─▶ allow()/deny()
//! ```
//!
//! Servo dessine ses menus contextuels côté embedder ; webwrap n'a pas de
//! chrome, donc aucun menu n'est proposé et le filtre de menus reste réservé
//! aux moteurs qui fournissent le leur.

use embedder_traits::PermissionFeature;
use servo::{NavigationRequest, WebView, WebViewDelegate};
use tracing::{debug, info, warn};
use url::Url;
use winit::event_loop::{EventLoop, EventLoopProxy};

use crate::bindings::{NavigationResponder, PermissionResponder};
use crate::browser::AppState;
use crate::navigation::{NavigationAction, PolicyDecision};
use crate::permissions::{MediaDevices, PermissionRequest};

// ─────────────────────────────────────────────────────────────────────────────
// Waker : pont Servo → Winit
// ─────────────────────────────────────────────────────────────────────────────

/// Événement marqueur envoyé à travers le `EventLoopProxy` de Winit.
/// La boucle le reçoit dans `user_event()` et fait tourner Servo.
#[derive(Debug)]
pub struct WakerEvent;

/// `Clone + Send + Sync` comme l'exige `EventLoopWaker`.
#[derive(Clone)]
pub struct Waker(EventLoopProxy<WakerEvent>);

impl Waker {
    pub fn new(event_loop: &EventLoop<WakerEvent>) -> Self {
        Self(event_loop.create_proxy())
    }
}

impl embedder_traits::EventLoopWaker for Waker {
    fn clone_box(&self) -> Box<dyn embedder_traits::EventLoopWaker> {
        Box::new(Self(self.0.clone()))
    }

    fn wake(&self) {
        if let Err(error) = self.0.send_event(WakerEvent) {
            warn!(?error, "Échec du réveil de la boucle d'événements Winit");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Traduction Servo → politique
// ─────────────────────────────────────────────────────────────────────────────

pub fn permission_request_from_feature(feature: PermissionFeature) -> PermissionRequest {
    match feature {
        PermissionFeature::Geolocation => PermissionRequest::Geolocation,
        PermissionFeature::Notifications => PermissionRequest::Notification,
        PermissionFeature::Microphone => PermissionRequest::Media(MediaDevices::AUDIO),
        PermissionFeature::Camera => PermissionRequest::Media(MediaDevices::VIDEO),
        _ => PermissionRequest::Unrecognized,
    }
}

/// Servo ne remonte que les navigations initiées par le contenu (liens,
/// formulaires, `location = …`), sans leur type. Seule une cible d'une autre
/// origine est traitée comme un lien cliqué : les envois de formulaire et
/// redirections du site enveloppé (connexion, `/session`…) restent dans la
/// vue, tout comme une navigation avant le premier chargement.
pub fn classify_navigation(current: Option<&Url>, target: &Url) -> NavigationAction {
    match current {
        Some(current) if !same_origin(current, target) => NavigationAction::LinkClicked {
            uri: target.clone(),
        },
        _ => NavigationAction::Other,
    }
}

/// Les origines opaques (`file:`, `data:`, `about:`) ne sont jamais égales
/// entre elles ; on les compare alors par schéma.
fn same_origin(current: &Url, target: &Url) -> bool {
    let origin = current.origin();
    if origin.is_tuple() {
        origin == target.origin()
    } else {
        current.scheme() == target.scheme()
    }
}

impl PermissionResponder for servo::PermissionRequest {
    fn allow(self) {
        servo::PermissionRequest::allow(self);
    }

    fn deny(self) {
        servo::PermissionRequest::deny(self);
    }
}

/// Servo attend une réponse explicite : seul `UseDefault` laisse la vue partir.
impl NavigationResponder for NavigationRequest {
    fn ignore(self) {
        self.deny();
    }

    fn handled(self) {
        self.deny();
    }

    fn use_default(self) {
        self.allow();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WebViewDelegate : callbacks Servo → embedder
// ─────────────────────────────────────────────────────────────────────────────

/// Les panics ne doivent pas traverser la frontière Servo : chaque méthode
/// est enveloppée dans `catch_unwind`.
impl WebViewDelegate for AppState {
    fn notify_new_frame_ready(&self, _webview: WebView) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.window.request_redraw();
        }));
    }

    fn notify_url_changed(&self, _webview: WebView, url: Url) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            debug!(%url, "URL changée");
            *self.current_url.borrow_mut() = Some(url);
        }));
    }

    /// Le titre de la fenêtre reflète celui de la page.
    fn notify_page_title_changed(&self, _webview: WebView, title: Option<String>) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            if let Some(title) = title {
                self.window.set_title(&title);
            }
        }));
    }

    /// La page a appelé `window.close()` : la fenêtre se ferme avec elle.
    fn notify_closed(&self, _webview: WebView) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            if self.lifecycle.mark_closed() {
                info!("La page a fermé sa vue, arrêt");
                self.window.request_redraw();
            }
        }));
    }

    fn request_navigation(&self, _webview: WebView, navigation_request: NavigationRequest) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let current = self.current_url.borrow().clone();
            let action = classify_navigation(current.as_ref(), &navigation_request.url);
            self.mediator
                .on_decide_policy(&PolicyDecision::Navigation(action), navigation_request);
        }));
    }

    fn request_permission(&self, _webview: WebView, request: servo::PermissionRequest) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let kind = permission_request_from_feature(request.feature());
            self.mediator.on_permission_request(kind, request);
        }));
    }
}
