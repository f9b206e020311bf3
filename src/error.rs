// ============================================================================
// Erreurs du flux de prix
// ============================================================================
// Le reste de l'application utilise anyhow. À la frontière réseau on garde
// un enum typé : le flux doit distinguer les échecs pour les logs, mais
// tous mènent au même chemin de repli.
// ============================================================================

/// Échec d'une récupération de cotation
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Requête rejetée (DNS, connexion, timeout, lecture du corps)
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// Réponse HTTP hors 2xx
    #[error("quote source returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// Corps illisible, champ manquant ou non numérique
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl FeedError {
    /// Vrai pour les échecs côté réseau (par opposition au contenu)
    pub fn is_network(&self) -> bool {
        matches!(self, FeedError::Network(_) | FeedError::Status(_))
    }
}
