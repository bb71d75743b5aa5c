//! # webwrap: un site, une fenêtre
//!
//! Enveloppe minimale autour d'un moteur web : une seule fenêtre native,
//! une seule vue, et une politique fixée au démarrage qui arbitre les
//! rappels sensibles du moteur.
//!
//! ## Architecture des modules
//!
//! Cœur de politique (toujours compilé, sans dépendance au moteur) :
//!
//! - [`config`] : `PolicyConfiguration` immuable (autorisations, langues)
//!   et fichier `config.toml` optionnel.
//! - [`cli`] : options de ligne de commande (`--permit`, `--lang`, `--spell`,
//!   `--url`) et résolution de la configuration de démarrage.
//! - [`permissions`] : arbitre des demandes de permission (géolocalisation,
//!   notifications, micro, caméra), refus par défaut.
//! - [`navigation`] : politique de navigation : liens cliqués ouverts dans
//!   l'application système, historique ignoré, le reste laissé au moteur.
//! - [`context_menu`] : filtre du menu contextuel (images, zones éditables).
//! - [`bindings`] : les trois points d'enregistrement reliant les rappels du
//!   moteur aux modules de décision.
//! - [`launcher`] : lanceur d'URI système et rapport d'erreurs.
//!
//! Coquille Servo (feature `shell`) :
//!
//! - `browser` : boucle d'événements Winit et cycle de vie de la fenêtre.
//! - `servo_glue` : `Waker` et implémentation du `WebViewDelegate`.
//! - `preferences` : préférences Servo dérivées de la politique.
//! - `resources` : lecteur de ressources Servo.
//! - `keyutils` : conversion des événements clavier Winit vers Servo.

pub mod bindings;
pub mod cli;
pub mod config;
pub mod context_menu;
pub mod error;
pub mod launcher;
pub mod navigation;
pub mod permissions;

#[cfg(feature = "shell")]
pub mod browser;
#[cfg(feature = "shell")]
pub mod keyutils;
#[cfg(feature = "shell")]
pub mod preferences;
#[cfg(feature = "shell")]
pub mod resources;
#[cfg(feature = "shell")]
pub mod servo_glue;
