// ============================================================================
// Formatage des montants et messages
// ============================================================================

use thousands::Separable;

use crate::catalog::{Affordability, DreamListView};
use crate::models::RateUpdate;

/// "$1,200,000"
pub fn format_usd(amount: u64) -> String {
    format!("${}", amount.separate_with_commas())
}

/// "◎93.75"
pub fn format_sol(amount: f64) -> String {
    format!("◎{:.2}", amount)
}

/// Message du compteur de jours sous la liste de rêve
pub fn days_message(view: &DreamListView) -> String {
    match view {
        DreamListView::Empty => "Start adding items to your dream!".to_string(),
        DreamListView::Items {
            affordability: Affordability::Days(days),
            ..
        } => format!("You'll need {} days to afford this dream!", days),
        DreamListView::Items {
            affordability: Affordability::InsufficientInput,
            ..
        } => "Enter your daily SOL income to calculate".to_string(),
    }
}

/// Suffixe du header : provenance et heure de la dernière mise à jour
pub fn update_status(update: Option<&RateUpdate>) -> String {
    match update {
        Some(update) => format!("{} · {} UTC", update.origin.label(), update.at.format("%H:%M")),
        None => "default".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Totals;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0), "$0");
        assert_eq!(format_usd(15_000), "$15,000");
        assert_eq!(format_usd(1_200_000), "$1,200,000");
    }

    #[test]
    fn test_format_sol() {
        assert_eq!(format_sol(93.75), "◎93.75");
        assert_eq!(format_sol(100.0), "◎100.00");
    }

    #[test]
    fn test_days_message() {
        assert_eq!(days_message(&DreamListView::Empty), "Start adding items to your dream!");

        let items = |affordability| DreamListView::Items {
            lines: Vec::new(),
            totals: Totals::default(),
            affordability,
        };
        assert_eq!(
            days_message(&items(Affordability::Days(12))),
            "You'll need 12 days to afford this dream!"
        );
        assert_eq!(
            days_message(&items(Affordability::InsufficientInput)),
            "Enter your daily SOL income to calculate"
        );
    }

    #[test]
    fn test_update_status_default() {
        assert_eq!(update_status(None), "default");
    }
}
