// ============================================================================
// Structure : Rate
// ============================================================================
// Cours courant : nombre de dollars pour 1 SOL
//
// CONCEPTS RUST :
// 1. Newtype pattern : Rate(f64) au lieu d'un f64 nu
//    - Le constructeur refuse les valeurs nulles, négatives, NaN ou infinies
//    - Toute division par un Rate est donc sûre
// 2. Copy : un Rate est une simple valeur, on le copie librement
// ============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cours USD par SOL, toujours fini et strictement positif
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Rate(f64);

impl Rate {
    /// Cours utilisé tant qu'aucune valeur n'a été restaurée ou reçue
    pub const DEFAULT: Rate = Rate(160.0);

    /// Plancher appliqué par le flux de prix à chaque mise à jour
    pub const FLOOR: Rate = Rate(100.0);

    /// Crée un Rate si la valeur est finie et strictement positive
    ///
    /// CONCEPT RUST : Option comme constructeur "fallible"
    /// - Some(rate) : valeur valide
    /// - None : valeur rejetée, l'appelant décide quoi faire
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Crée un Rate borné par `floor`
    ///
    /// Une valeur non finie retombe sur le plancher.
    pub fn at_least(value: f64, floor: Rate) -> Self {
        if value.is_finite() {
            Self(value.max(floor.0))
        } else {
            floor
        }
    }

    /// Valeur brute en dollars
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Convertit un montant en dollars en SOL
    pub fn to_quote(&self, fiat: f64) -> f64 {
        fiat / self.0
    }

    /// Sérialisation texte pour le stockage clé/valeur
    pub fn to_storage_string(&self) -> String {
        self.0.to_string()
    }

    /// Relit une valeur stockée
    ///
    /// Une valeur vide, illisible ou non positive est considérée comme absente.
    pub fn from_storage_str(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().and_then(Self::new)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1 SOL = ${:.2}", self.0)
    }
}

/// Provenance d'une mise à jour du cours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateOrigin {
    /// Valeur restaurée depuis le stockage au démarrage
    Cache,

    /// Valeur acceptée depuis l'API (persistée)
    Feed,

    /// Estimation dégradée après un échec réseau (non persistée)
    Fallback,
}

impl RateOrigin {
    /// Label court pour le header
    pub fn label(&self) -> &str {
        match self {
            RateOrigin::Cache => "cached",
            RateOrigin::Feed => "live",
            RateOrigin::Fallback => "estimate",
        }
    }
}

/// Notification émise par le flux de prix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateUpdate {
    pub rate: Rate,
    pub origin: RateOrigin,
    pub at: DateTime<Utc>,
}

impl RateUpdate {
    pub fn new(rate: Rate, origin: RateOrigin) -> Self {
        Self {
            rate,
            origin,
            at: Utc::now(),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_rejects_non_positive() {
        assert!(Rate::new(0.0).is_none());
        assert!(Rate::new(-3.0).is_none());
        assert!(Rate::new(f64::NAN).is_none());
        assert!(Rate::new(f64::INFINITY).is_none());
        assert_eq!(Rate::new(152.5).map(|r| r.value()), Some(152.5));
    }

    #[test]
    fn test_rate_at_least_floor() {
        assert_eq!(Rate::at_least(42.0, Rate::FLOOR), Rate::FLOOR);
        assert_eq!(Rate::at_least(f64::NAN, Rate::FLOOR), Rate::FLOOR);
        assert_eq!(Rate::at_least(151.0, Rate::FLOOR).value(), 151.0);
    }

    #[test]
    fn test_rate_storage_text() {
        let rate = Rate::new(148.73).unwrap();
        assert_eq!(Rate::from_storage_str(&rate.to_storage_string()), Some(rate));
        assert_eq!(Rate::from_storage_str("  150\n").map(|r| r.value()), Some(150.0));
        assert!(Rate::from_storage_str("").is_none());
        assert!(Rate::from_storage_str("abc").is_none());
        assert!(Rate::from_storage_str("0").is_none());
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::DEFAULT.to_string(), "1 SOL = $160.00");
    }
}
