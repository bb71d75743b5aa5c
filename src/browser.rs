//! Boucle d'événements Winit et cycle de vie de la fenêtre.
//!
//! ## Pattern "Two-Phase App"
//!
//! Winit 0.30 impose que les fenêtres soient créées dans `resumed()`, alors
//! que Servo a besoin d'un handle de fenêtre pour son contexte de rendu :
//!
//! ```text
//! App::Initial { waker, startup }  →  [resumed()]  →  App::Running(Rc<AppState>)
//! ```
//!
//! ## Raccourcis
//!
//! Les raccourcis d'historique passent par la même politique que les
//! navigations du contenu : F5 / Ctrl+R est un `Reload` (laissé au moteur),
//! Alt+← / Alt+→ un `BackForward` (ignoré, la fenêtre reste sur son site).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use euclid::Scale;
use servo::{InputEvent, WheelDelta, WheelEvent, WheelMode};
use servo::{MouseButton as ServoMouseButton, MouseButtonAction, MouseButtonEvent};
use servo::{MouseLeftViewportEvent, MouseMoveEvent};
use servo::{
    RenderingContext, Servo, ServoBuilder, WebView, WebViewBuilder, WindowRenderingContext,
};
use tracing::{debug, error, info};
use url::Url;
use webrender_api::units::DevicePoint;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::{Window, WindowId};

use crate::bindings::{Mediator, NavigationResponder};
use crate::cli::Startup;
use crate::launcher::{LogReporter, SystemLauncher};
use crate::navigation::{NavigationAction, PolicyDecision};
use crate::preferences::build_servo_preferences;
use crate::servo_glue::{Waker, WakerEvent};

/// Pixels par ligne de défilement, comme les navigateurs de bureau.
const LINE_HEIGHT: f32 = 76.0;

// ─────────────────────────────────────────────────────────────────────────────
// AppState : état partagé entre Winit et Servo
// ─────────────────────────────────────────────────────────────────────────────

/// État partagé, créé lors de `resumed()`.
///
/// Dans un `Rc` : Servo reçoit le délégué sous forme `Rc<dyn WebViewDelegate>`
/// et tout vit sur le thread principal.
pub struct AppState {
    pub window: Window,
    pub servo: Servo,
    pub rendering_context: Rc<WindowRenderingContext>,
    pub webviews: RefCell<Vec<WebView>>,

    /// Position du curseur en device pixels.
    pub cursor_position: Cell<DevicePoint>,
    pub modifiers: Cell<ModifiersState>,

    /// Dernière URL validée par le moteur, sert à classer les navigations.
    pub current_url: RefCell<Option<Url>>,

    /// Arbitre des rappels sensibles, seul détenteur de la politique.
    pub mediator: Mediator<SystemLauncher, LogReporter>,

    pub lifecycle: PageLifecycle,
}

impl AppState {
    /// Fait tourner Servo puis quitte si la page a fermé sa vue.
    fn spin(&self, event_loop: &ActiveEventLoop) {
        self.servo.spin_event_loop();
        if self.lifecycle.is_closed() {
            event_loop.exit();
        }
    }
}

/// Fermeture demandée par la page (`window.close()`).
///
/// Servo prévient pendant `spin_event_loop()`, où la boucle Winit n'est pas
/// accessible : le drapeau est relu juste après.
#[derive(Debug, Default)]
pub struct PageLifecycle {
    closed: Cell<bool>,
}

impl PageLifecycle {
    /// Renvoie `true` à la première fermeture seulement.
    pub fn mark_closed(&self) -> bool {
        !self.closed.replace(true)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App : enum deux phases
// ─────────────────────────────────────────────────────────────────────────────

pub enum App {
    /// En attente de `resumed()`. `startup` est consommé à la transition.
    Initial { waker: Waker, startup: Option<Startup> },
    Running(Rc<AppState>),
}

impl App {
    pub fn new(event_loop: &EventLoop<WakerEvent>, startup: Startup) -> Self {
        Self::Initial {
            waker: Waker::new(event_loop),
            startup: Some(startup),
        }
    }
}

/// Crée la fenêtre, le contexte GL et l'instance Servo.
///
/// Une erreur ici est fatale : pas de page sans fenêtre ni GPU.
fn start(
    event_loop: &ActiveEventLoop,
    waker: Waker,
    startup: Startup,
) -> Result<Rc<AppState>, Box<dyn std::error::Error>> {
    let Startup {
        url,
        title,
        window: window_config,
        policy,
    } = startup;

    // ── 1. Fenêtre ────────────────────────────────────────────────────
    let attributes = Window::default_attributes()
        .with_title(title)
        .with_inner_size(LogicalSize::new(
            f64::from(window_config.width),
            f64::from(window_config.height),
        ));
    let window = event_loop.create_window(attributes)?;

    // ── 2. Contexte de rendu lié à la fenêtre ─────────────────────────
    let rendering_context = WindowRenderingContext::new(
        event_loop.display_handle()?,
        window.window_handle()?,
        window.inner_size(),
    )
    .map_err(|e| format!("contexte OpenGL indisponible : {e:?}"))?;
    rendering_context
        .make_current()
        .map_err(|e| format!("make_current a échoué : {e:?}"))?;
    let rendering_context = Rc::new(rendering_context);

    // ── 3. Servo ──────────────────────────────────────────────────────
    let servo = ServoBuilder::default()
        .preferences(build_servo_preferences(&policy))
        .event_loop_waker(Box::new(waker))
        .build();

    let state = Rc::new(AppState {
        window,
        servo,
        rendering_context: rendering_context.clone(),
        webviews: RefCell::new(Vec::new()),
        cursor_position: Cell::new(DevicePoint::zero()),
        modifiers: Cell::new(ModifiersState::default()),
        current_url: RefCell::new(None),
        mediator: Mediator::new(Rc::new(policy), SystemLauncher, LogReporter),
        lifecycle: PageLifecycle::default(),
    });

    let policy = state.mediator.policy();
    info!(
        granted = ?policy.grants().granted().collect::<Vec<_>>(),
        languages = ?policy.preferred_languages().as_slice(),
        spell_checking = policy.spell_checking_enabled(),
        "Politique de démarrage"
    );

    // ── 4. WebView unique ─────────────────────────────────────────────
    info!(%url, "Chargement de la page initiale");
    let rendering_context: Rc<dyn RenderingContext> = rendering_context;
    let webview = WebViewBuilder::new(&state.servo, rendering_context)
        .url(url)
        .hidpi_scale_factor(Scale::new(state.window.scale_factor() as f32))
        .delegate(state.clone())
        .build();
    state.webviews.borrow_mut().push(webview);

    Ok(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Raccourcis clavier soumis à la politique de navigation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryCommand {
    Reload,
    Back,
    Forward,
}

impl HistoryCommand {
    fn from_key(event: &KeyEvent, mods: ModifiersState) -> Option<Self> {
        if event.state != ElementState::Pressed {
            return None;
        }
        match &event.logical_key {
            Key::Named(NamedKey::F5) => Some(Self::Reload),
            Key::Character(c) if mods.control_key() && c.eq_ignore_ascii_case("r") => {
                Some(Self::Reload)
            }
            Key::Named(NamedKey::ArrowLeft) if mods.alt_key() => Some(Self::Back),
            Key::Named(NamedKey::ArrowRight) if mods.alt_key() => Some(Self::Forward),
            _ => None,
        }
    }

    fn action(self) -> NavigationAction {
        match self {
            Self::Reload => NavigationAction::Reload,
            Self::Back | Self::Forward => NavigationAction::BackForward,
        }
    }
}

/// Répond à la politique en exécutant (ou non) la commande sur la vue.
struct ShellHistory<'a> {
    webview: &'a WebView,
    command: HistoryCommand,
}

impl NavigationResponder for ShellHistory<'_> {
    fn ignore(self) {
        debug!(command = ?self.command, "Raccourci d'historique ignoré");
    }

    fn use_default(self) {
        match self.command {
            HistoryCommand::Reload => self.webview.reload(),
            HistoryCommand::Back => self.webview.go_back(1),
            HistoryCommand::Forward => self.webview.go_forward(1),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ApplicationHandler : dispatch des événements Winit
// ─────────────────────────────────────────────────────────────────────────────

impl ApplicationHandler<WakerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Self::Initial { waker, startup } = self else {
            return;
        };
        let Some(startup) = startup.take() else {
            return;
        };

        match start(event_loop, waker.clone(), startup) {
            Ok(state) => *self = Self::Running(state),
            Err(e) => {
                error!(error = %e, "Impossible de démarrer la fenêtre");
                event_loop.exit();
            }
        }
    }

    /// Un `WakerEvent` arrive depuis les threads Servo.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, _event: WakerEvent) {
        if let Self::Running(state) = self {
            state.spin(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Self::Running(state) = self else {
            if matches!(event, WindowEvent::CloseRequested) {
                event_loop.exit();
            }
            return;
        };

        state.spin(event_loop);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                if let Some(webview) = state.webviews.borrow().last() {
                    webview.paint();
                }
                state.rendering_context.present();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(webview) = state.webviews.borrow().last() {
                    webview.resize(new_size);
                }
            }

            WindowEvent::ModifiersChanged(new_modifiers) => {
                state.modifiers.set(new_modifiers.state());
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(webview) = state.webviews.borrow().last() {
                    let (x, y, mode) = match delta {
                        MouseScrollDelta::LineDelta(dx, dy) => (
                            f64::from(dx * LINE_HEIGHT),
                            f64::from(dy * LINE_HEIGHT),
                            WheelMode::DeltaLine,
                        ),
                        MouseScrollDelta::PixelDelta(delta) => {
                            (delta.x, delta.y, WheelMode::DeltaPixel)
                        }
                    };
                    webview.notify_input_event(InputEvent::Wheel(WheelEvent::new(
                        WheelDelta { x, y, z: 0.0, mode },
                        state.cursor_position.get().into(),
                    )));
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let point = DevicePoint::new(position.x as f32, position.y as f32);
                state.cursor_position.set(point);
                if let Some(webview) = state.webviews.borrow().last() {
                    webview.notify_input_event(InputEvent::MouseMove(MouseMoveEvent::new(
                        point.into(),
                    )));
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if let Some(webview) = state.webviews.borrow().last() {
                    webview.notify_input_event(InputEvent::MouseLeftViewport(
                        MouseLeftViewportEvent::default(),
                    ));
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                if let Some(webview) = state.webviews.borrow().last() {
                    let servo_button = match button {
                        WinitMouseButton::Left => ServoMouseButton::Left,
                        WinitMouseButton::Right => ServoMouseButton::Right,
                        WinitMouseButton::Middle => ServoMouseButton::Middle,
                        WinitMouseButton::Back => ServoMouseButton::Back,
                        WinitMouseButton::Forward => ServoMouseButton::Forward,
                        WinitMouseButton::Other(id) => ServoMouseButton::Other(id),
                    };
                    let action = match button_state {
                        ElementState::Pressed => MouseButtonAction::Down,
                        ElementState::Released => MouseButtonAction::Up,
                    };
                    webview.notify_input_event(InputEvent::MouseButton(MouseButtonEvent::new(
                        action,
                        servo_button,
                        state.cursor_position.get().into(),
                    )));
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let mods = state.modifiers.get();
                let webviews = state.webviews.borrow();
                let Some(webview) = webviews.last() else {
                    return;
                };

                if let Some(command) = HistoryCommand::from_key(&event, mods) {
                    let decision = PolicyDecision::Navigation(command.action());
                    state
                        .mediator
                        .on_decide_policy(&decision, ShellHistory { webview, command });
                    return;
                }

                let keyboard_event = crate::keyutils::keyboard_event_from_winit(&event, mods);
                webview.notify_input_event(InputEvent::Keyboard(keyboard_event));
            }

            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{self, NavigationDisposition};

    #[test]
    fn test_page_close_is_latched_once() {
        let lifecycle = PageLifecycle::default();
        assert!(!lifecycle.is_closed());
        assert!(lifecycle.mark_closed());
        assert!(!lifecycle.mark_closed());
        assert!(lifecycle.is_closed());
    }

    #[test]
    fn test_reload_shortcut_is_left_to_engine() {
        let decision = PolicyDecision::Navigation(HistoryCommand::Reload.action());
        assert_eq!(navigation::decide(&decision), NavigationDisposition::UseDefault);
    }

    #[test]
    fn test_history_shortcuts_are_ignored() {
        for command in [HistoryCommand::Back, HistoryCommand::Forward] {
            let decision = PolicyDecision::Navigation(command.action());
            assert_eq!(navigation::decide(&decision), NavigationDisposition::Ignore);
        }
    }
}
