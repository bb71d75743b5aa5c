//! Point d'entrée de webwrap.
//!
//! Usage :
//!   webwrap [-u URL] [-p PERMISSION]... [-l LANG]... [-s LANG]... [--config FICHIER]
//!
//! Exemples :
//!   webwrap -u mail.example.com -p notification
//!   webwrap -u maps.example.com -p geolocation -l fr-FR -l en
//!   webwrap --config ~/.config/webwrap/chat.toml -p audio -p video

use std::error::Error;
use std::process;

use webwrap::cli::{self, Startup};
use webwrap::config::Config;
use winit::event_loop::EventLoop;

fn main() -> Result<(), Box<dyn Error>> {
    // ── 1. Logging / Tracing ───────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // ── 2. Politique de démarrage (fichier puis ligne de commande) ─────
    let args = cli::parse();
    let loaded = Config::load(args.config.as_deref());
    let startup = match loaded.and_then(|file| Startup::resolve(args, file)) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("webwrap: {e}");
            process::exit(1);
        }
    };

    // ── 3. Provider crypto TLS ─────────────────────────────────────────
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| "provider crypto rustls déjà installé")?;

    // ── 4. Lecteur de ressources Servo ─────────────────────────────────
    webwrap::resources::init();

    // ── 5. Boucle d'événements Winit ───────────────────────────────────
    let event_loop = EventLoop::with_user_event().build()?;
    let mut app = webwrap::browser::App::new(&event_loop, startup);

    Ok(event_loop.run_app(&mut app)?)
}
