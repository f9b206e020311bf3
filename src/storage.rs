// ============================================================================
// Stockage clé/valeur
// ============================================================================
// Équivalent local d'un localStorage : des chaînes indexées par clé.
// Une seule clé est utilisée en pratique : le dernier cours accepté.
//
// CONCEPTS RUST :
// 1. Trait KeyValueStore : le flux de prix ne connaît que la capacité,
//    pas l'implémentation (fichiers ou mémoire)
// 2. Box<dyn Trait> : choix de l'implémentation à l'exécution
// ============================================================================

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::Rate;

/// Clé sous laquelle le dernier cours accepté est stocké
pub const RATE_KEY: &str = "solPrice";

/// Capacité de stockage clé/valeur
pub trait KeyValueStore: Send {
    /// Lit une valeur, Ok(None) si la clé n'existe pas
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Écrit (ou remplace) une valeur
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

// ============================================================================
// FileStore : un fichier par clé
// ============================================================================

/// Stockage persistant dans un répertoire (un fichier texte par clé)
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Ouvre (et crée si besoin) le répertoire de stockage
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Échec de la création du répertoire {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Échec de la lecture de {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // Écriture via un fichier temporaire puis rename : pas de valeur tronquée
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).with_context(|| format!("Échec de l'écriture de {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("Échec du renommage vers {}", path.display()))?;
        Ok(())
    }
}

// ============================================================================
// MemoryStore : stockage volatil
// ============================================================================

/// Stockage en mémoire (tests, ou repli si aucun répertoire n'est utilisable)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// RateCache : le cours persisté
// ============================================================================

/// Lecture/écriture du dernier cours accepté dans un KeyValueStore
pub struct RateCache {
    store: Box<dyn KeyValueStore>,
}

impl RateCache {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Cours persisté, s'il existe et est bien formé
    ///
    /// Une erreur de lecture est loggée et traitée comme une absence.
    pub fn load(&self) -> Option<Rate> {
        match self.store.get(RATE_KEY) {
            Ok(Some(raw)) => {
                let rate = Rate::from_storage_str(&raw);
                if rate.is_none() {
                    warn!(raw = %raw.trim(), "Ignoring malformed cached rate");
                }
                rate
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = ?e, "Failed to read cached rate");
                None
            }
        }
    }

    /// Persiste un cours accepté
    pub fn save(&mut self, rate: Rate) -> Result<()> {
        self.store.set(RATE_KEY, &rate.to_storage_string())?;
        debug!(rate = rate.value(), "Cached rate saved");
        Ok(())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
