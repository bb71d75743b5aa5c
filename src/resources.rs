//! Lecteur de ressources Servo.
//!
//! Servo lit au démarrage un ensemble de fichiers (préférences, certificats,
//! listes de domaines publics…) fournis par l'embedder via
//! `servo::resources::set()`. Le dossier `resources/` est cherché dans :
//!
//! 1. `WEBWRAP_RESOURCES_PATH`, puis `SERVO_RESOURCES_PATH`
//! 2. À côté de l'exécutable, ou à la racine du projet sous `target/`
//! 3. Le répertoire courant

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::{env, fs};

use servo::resources::{self, Resource};
use tracing::debug;

static RESOURCES_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Enregistre le lecteur. **Doit être appelé avant `ServoBuilder::build()`.**
pub fn init() {
    resources::set(Box::new(ResourceReader));
}

struct ResourceReader;

impl resources::ResourceReaderMethods for ResourceReader {
    // Le trait n'autorise pas d'erreur : une ressource manquante rend le
    // moteur inutilisable, on s'arrête.
    fn read(&self, file: Resource) -> Vec<u8> {
        let dir = resources_dir();
        contained_path(dir, file.filename())
            .and_then(fs::read)
            .unwrap_or_else(|e| {
                panic!(
                    "Impossible de lire la ressource Servo {:?} dans {}: {e}",
                    file.filename(),
                    dir.display()
                )
            })
    }

    fn sandbox_access_files_dirs(&self) -> Vec<PathBuf> {
        vec![resources_dir().to_path_buf()]
    }

    fn sandbox_access_files(&self) -> Vec<PathBuf> {
        vec![]
    }
}

/// Résout `file` sous `dir` en refusant tout chemin qui en sort (`../`, liens).
fn contained_path(dir: &Path, file: &str) -> io::Result<PathBuf> {
    let base = dir.canonicalize()?;
    let resolved = base.join(file).canonicalize()?;
    if !resolved.starts_with(&base) {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("{} is outside {}", resolved.display(), base.display()),
        ));
    }
    Ok(resolved)
}

fn resources_dir() -> &'static Path {
    RESOURCES_DIR.get_or_init(|| {
        let dir = candidate_dirs().into_iter().find(|p| p.is_dir()).unwrap_or_else(|| {
            panic!(
                "Impossible de trouver le dossier 'resources/' de Servo. \
                 Définissez WEBWRAP_RESOURCES_PATH ou placez le dossier à côté de l'exécutable."
            )
        });
        debug!(dir = %dir.display(), "Dossier de ressources Servo");
        dir
    })
}

fn candidate_dirs() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = ["WEBWRAP_RESOURCES_PATH", "SERVO_RESOURCES_PATH"]
        .into_iter()
        .filter_map(|var| env::var_os(var).map(PathBuf::from))
        .collect();

    if let Ok(exe) = env::current_exe()
        && let Ok(exe) = exe.canonicalize()
        && let Some(exe_dir) = exe.parent()
    {
        candidates.push(exe_dir.join("resources"));

        // target/{debug,release}/ → racine du projet pendant le développement.
        if let Some(target_dir) = exe_dir.parent()
            && target_dir.file_name().is_some_and(|n| n == "target")
            && let Some(project_root) = target_dir.parent()
        {
            candidates.push(project_root.join("resources"));
        }
    }

    if let Ok(cwd) = env::current_dir() {
        candidates.push(cwd.join("resources"));
    }

    candidates
}
