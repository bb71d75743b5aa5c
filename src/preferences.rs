//! Servo engine preferences derived from the startup policy.
//!
//! DOM APIs behind a permission are only switched on when the operator
//! granted that permission, so a denied capability never even reaches
//! [`crate::permissions`]. Thread pools are sized to the machine as before.

use tracing::{info, warn};

use crate::config::{Permission, PolicyConfiguration};

/// Builds Servo `Preferences` for the given policy.
#[allow(clippy::field_reassign_with_default)]
pub fn build_servo_preferences(policy: &PolicyConfiguration) -> servo::Preferences {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get() as i64)
        .unwrap_or(4);

    let mut prefs = servo::Preferences::default();

    // ── Performance ───────────────────────────────────────────────────────
    prefs.layout_threads = cpus.min(8);
    prefs.threadpools_async_runtime_workers_max = (cpus * 2).min(16);
    prefs.threadpools_image_cache_workers_max = cpus.min(8);
    prefs.threadpools_webrender_workers_max = (cpus / 2).clamp(2, 8);
    prefs.threadpools_resource_workers_max = cpus.min(8);

    // ── Capabilities gated by --permit ────────────────────────────────────
    prefs.dom_geolocation_enabled = policy.is_granted(Permission::Geolocation);
    prefs.dom_notification_enabled = policy.is_granted(Permission::Notification);
    prefs.dom_bluetooth_enabled = false;

    // TODO: forward preferred and spell-check languages once Servo exposes
    // an Accept-Language / dictionary preference.
    if !policy.preferred_languages().is_empty() || policy.spell_checking_enabled() {
        warn!(
            preferred = ?policy.preferred_languages().as_slice(),
            spell = ?policy.spellcheck_languages().as_slice(),
            "Language lists configured but the engine has no language preference"
        );
    }

    info!(
        cpus,
        layout_threads = prefs.layout_threads,
        geolocation = prefs.dom_geolocation_enabled,
        notifications = prefs.dom_notification_enabled,
        "Servo preferences configured"
    );

    prefs
}
