//! Permission arbitration.
//!
//! The engine asks whether the loaded content may use a privileged
//! capability. The answer depends only on the kind of request and the
//! operator's grants; unknown kinds are always refused.

use crate::config::{Permission, PolicyConfiguration};

/// Devices a media-capture request is scoped to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaDevices {
    pub audio: bool,
    pub video: bool,
}

impl MediaDevices {
    pub const AUDIO: MediaDevices = MediaDevices {
        audio: true,
        video: false,
    };
    pub const VIDEO: MediaDevices = MediaDevices {
        audio: false,
        video: true,
    };
}

/// A permission request raised by the engine, reduced to what the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRequest {
    Geolocation,
    Notification,
    Media(MediaDevices),
    /// Any capability the policy has no grant for (Bluetooth, MIDI, ...).
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDisposition {
    Allow,
    Deny,
}

impl PermissionRequest {
    /// The grant that governs this request, if any.
    ///
    /// A media request for both devices is governed by the audio grant.
    pub fn permission(&self) -> Option<Permission> {
        match *self {
            PermissionRequest::Geolocation => Some(Permission::Geolocation),
            PermissionRequest::Notification => Some(Permission::Notification),
            PermissionRequest::Media(MediaDevices { audio: true, .. }) => Some(Permission::Audio),
            PermissionRequest::Media(MediaDevices { video: true, .. }) => Some(Permission::Video),
            PermissionRequest::Media(_) | PermissionRequest::Unrecognized => None,
        }
    }
}

/// Allows the request iff its governing grant is set.
pub fn decide(request: PermissionRequest, config: &PolicyConfiguration) -> PermissionDisposition {
    match request.permission() {
        Some(permission) if config.is_granted(permission) => PermissionDisposition::Allow,
        _ => PermissionDisposition::Deny,
    }
}
