// ============================================================================
// CatalogView : catalogue filtrable et liste de rêve
// ============================================================================
// Possède les produits, le filtre actif, la liste de rêve et le revenu
// journalier saisi. Produit des "view models" prêts à dessiner :
// - les cartes du catalogue (prix en dollars + prix en SOL)
// - la vue de la liste de rêve (entrées, totaux, jours nécessaires)
//
// Chaque opération qui change l'état reconstruit la ou les vues concernées.
// Un changement de cours reconstruit les deux : aucune vue ne garde un prix
// calculé avec un ancien cours.
// ============================================================================

use tracing::debug;

use crate::models::{Category, DreamList, Product, ProductId, Rate};

// ============================================================================
// Filter
// ============================================================================

/// Filtre de catégorie actif
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    /// Tous les produits
    #[default]
    All,

    /// Une catégorie, identifiée par son slug (peut ne correspondre à rien)
    Category(String),
}

impl Filter {
    /// Accepte n'importe quelle chaîne : "all" → All, sinon une catégorie
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            Filter::All
        } else {
            Filter::Category(value.to_string())
        }
    }

    /// Filtres proposés à l'utilisateur : All puis chaque catégorie
    pub fn choices() -> Vec<Filter> {
        std::iter::once(Filter::All)
            .chain(Category::ALL.iter().map(|c| Filter::Category(c.slug().to_string())))
            .collect()
    }

    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(slug) => product.category.slug() == slug,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Filter::All => "all",
            Filter::Category(slug) => slug,
        }
    }

    /// Label pour le bouton de filtre
    pub fn label(&self) -> &str {
        match self {
            Filter::All => "All",
            Filter::Category(slug) => Category::ALL
                .iter()
                .find(|c| c.slug() == slug)
                .map(|c| c.label())
                .unwrap_or(slug.as_str()),
        }
    }
}

// ============================================================================
// View models
// ============================================================================

/// Une carte du catalogue
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogCard {
    pub product: Product,

    /// Prix en SOL au cours courant
    pub quote_value: f64,
}

/// Une ligne de la liste de rêve
#[derive(Debug, Clone, PartialEq)]
pub struct DreamLine {
    pub product: Product,
    pub quantity: u32,

    /// Prix unitaire en SOL au cours courant
    pub quote_value: f64,
}

/// Totaux de la liste de rêve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub total_fiat: u64,
    pub total_quote: f64,
}

/// Nombre de jours pour s'offrir la liste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordability {
    Days(u64),

    /// Revenu absent/nul/négatif ou liste vide : pas de résultat numérique
    InsufficientInput,
}

/// Vue de la liste de rêve
#[derive(Debug, Clone, PartialEq)]
pub enum DreamListView {
    /// État vide distinct (pas de totaux à zéro affichés silencieusement)
    Empty,

    Items {
        lines: Vec<DreamLine>,
        totals: Totals,
        affordability: Affordability,
    },
}

// ============================================================================
// CatalogView
// ============================================================================

/// Catalogue + liste de rêve, avec leurs vues dérivées du cours
#[derive(Debug, Clone)]
pub struct CatalogView {
    products: Vec<Product>,
    filter: Filter,
    dream_list: DreamList,
    rate: Rate,
    daily_income: f64,

    // Dernier rendu
    catalog_cards: Vec<CatalogCard>,
    dream_view: DreamListView,
}

impl CatalogView {
    /// Crée la vue et effectue le premier rendu avec `rate`
    pub fn new(products: Vec<Product>, rate: Rate) -> Self {
        let mut view = Self {
            products,
            filter: Filter::All,
            dream_list: DreamList::new(),
            rate,
            daily_income: 0.0,
            catalog_cards: Vec::new(),
            dream_view: DreamListView::Empty,
        };
        view.refresh_catalog();
        view.refresh_dream_list();
        view
    }

    // ------------------------------------------------------------------------
    // Accesseurs
    // ------------------------------------------------------------------------

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn dream_list(&self) -> &DreamList {
        &self.dream_list
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn daily_income(&self) -> f64 {
        self.daily_income
    }

    /// Cartes du dernier rendu du catalogue
    pub fn catalog_cards(&self) -> &[CatalogCard] {
        &self.catalog_cards
    }

    /// Dernier rendu de la liste de rêve
    pub fn dream_view(&self) -> &DreamListView {
        &self.dream_view
    }

    // ------------------------------------------------------------------------
    // Catalogue
    // ------------------------------------------------------------------------

    /// Change le filtre et redessine le catalogue (la liste de rêve ne bouge pas)
    pub fn set_filter(&mut self, category: &str) {
        self.filter = Filter::parse(category);
        debug!(filter = %self.filter.slug(), "Filter changed");
        self.refresh_catalog();
    }

    /// Produits correspondant au filtre, avec leur prix en SOL
    ///
    /// CONCEPT RUST : impl Iterator
    /// - Rien n'est calculé avant consommation (filtrage paresseux)
    /// - L'ordre du catalogue est conservé
    pub fn render_catalog(&self) -> impl Iterator<Item = CatalogCard> + '_ {
        let rate = self.rate;
        self.products
            .iter()
            .filter(move |p| self.filter.matches(p))
            .map(move |p| CatalogCard {
                product: p.clone(),
                quote_value: rate.to_quote(p.price as f64),
            })
    }

    // ------------------------------------------------------------------------
    // Liste de rêve
    // ------------------------------------------------------------------------

    /// Ajoute un produit à la liste de rêve
    ///
    /// Retourne la nouvelle quantité, None si l'id est inconnu (ignoré).
    pub fn add_to_dream_list(&mut self, id: ProductId) -> Option<u32> {
        let Some(product) = self.products.iter().find(|p| p.id == id) else {
            debug!(product_id = id, "Ignoring add for unknown product");
            return None;
        };

        let quantity = self.dream_list.add(product);
        debug!(product_id = id, quantity, "Added to dream list");
        self.refresh_dream_list();
        Some(quantity)
    }

    /// Retire une entrée de la liste de rêve (no-op si absente)
    pub fn remove_from_dream_list(&mut self, id: ProductId) -> bool {
        let removed = self.dream_list.remove(id);
        if removed {
            debug!(product_id = id, "Removed from dream list");
        } else {
            debug!(product_id = id, "Ignoring remove for product not in dream list");
        }
        self.refresh_dream_list();
        removed
    }

    /// Saisie du revenu journalier en SOL
    pub fn set_daily_income(&mut self, input: &str) {
        self.daily_income = parse_income(input);
        self.refresh_dream_list();
    }

    // ------------------------------------------------------------------------
    // Cours
    // ------------------------------------------------------------------------

    /// Adopte un nouveau cours et redessine catalogue ET liste de rêve
    pub fn on_rate_changed(&mut self, rate: Rate) {
        self.rate = rate;
        self.refresh_catalog();
        self.refresh_dream_list();
    }

    // ------------------------------------------------------------------------
    // Calculs
    // ------------------------------------------------------------------------

    /// Totaux en dollars et en SOL ((0, 0) pour une liste vide)
    pub fn compute_totals(&self) -> Totals {
        let total_fiat = self.dream_list.total_fiat();
        Totals {
            total_fiat,
            total_quote: self.rate.to_quote(total_fiat as f64),
        }
    }

    /// Jours nécessaires pour s'offrir la liste avec `daily_quote_income` SOL/jour
    pub fn compute_affordability_days(&self, daily_quote_income: f64) -> Affordability {
        let total_quote = self.compute_totals().total_quote;
        if daily_quote_income > 0.0 && total_quote > 0.0 {
            Affordability::Days((total_quote / daily_quote_income).ceil() as u64)
        } else {
            Affordability::InsufficientInput
        }
    }

    // ------------------------------------------------------------------------
    // Rendu
    // ------------------------------------------------------------------------

    fn refresh_catalog(&mut self) {
        self.catalog_cards = self.render_catalog().collect();
    }

    fn refresh_dream_list(&mut self) {
        if self.dream_list.is_empty() {
            self.dream_view = DreamListView::Empty;
            return;
        }

        let lines = self
            .dream_list
            .entries()
            .iter()
            .map(|entry| DreamLine {
                product: entry.product.clone(),
                quantity: entry.quantity(),
                quote_value: self.rate.to_quote(entry.product.price as f64),
            })
            .collect();

        self.dream_view = DreamListView::Items {
            lines,
            totals: self.compute_totals(),
            affordability: self.compute_affordability_days(self.daily_income),
        };
    }
}

/// Lit un revenu comme le ferait `parseFloat(x) || 0`
///
/// Prend le plus long préfixe numérique ; tout le reste donne 0.
pub fn parse_income(input: &str) -> f64 {
    let input = input.trim_start();
    let mut end = 0;
    let mut seen_dot = false;

    for (i, c) in input.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    input[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_catalog;

    fn rate(value: f64) -> Rate {
        Rate::new(value).unwrap()
    }

    fn small_catalog() -> Vec<Product> {
        vec![
            Product::new(1, "Watch", Category::Watches, 100, "images/a.png"),
            Product::new(2, "Bag", Category::Fashion, 50, "images/b.png"),
            Product::new(3, "Car", Category::Cars, 15_000, "images/c.png"),
        ]
    }

    #[test]
    fn test_render_catalog_all() {
        let view = CatalogView::new(small_catalog(), rate(10.0));
        let cards: Vec<_> = view.render_catalog().collect();

        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].quote_value, 10.0);
        assert_eq!(cards[1].quote_value, 5.0);
        assert_eq!(view.catalog_cards(), cards.as_slice());
    }

    #[test]
    fn test_render_catalog_idempotent() {
        let mut view = CatalogView::new(default_catalog(), Rate::DEFAULT);
        view.set_filter("cars");

        let first: Vec<_> = view.render_catalog().collect();
        let second: Vec<_> = view.render_catalog().collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|c| c.product.category == Category::Cars));
    }

    #[test]
    fn test_filter_unknown_category_is_empty() {
        let mut view = CatalogView::new(default_catalog(), Rate::DEFAULT);
        view.set_filter("yachts");

        assert_eq!(view.render_catalog().count(), 0);
        assert!(view.catalog_cards().is_empty());

        view.set_filter("all");
        assert_eq!(view.catalog_cards().len(), default_catalog().len());
    }

    #[test]
    fn test_filter_does_not_touch_dream_list() {
        let mut view = CatalogView::new(small_catalog(), rate(10.0));
        view.add_to_dream_list(1);
        let before = view.dream_view().clone();

        view.set_filter("fashion");
        assert_eq!(view.dream_view(), &before);
        assert_eq!(view.catalog_cards().len(), 1);
    }

    #[test]
    fn test_add_twice_gives_quantity_two() {
        let mut view = CatalogView::new(small_catalog(), rate(10.0));
        assert_eq!(view.add_to_dream_list(2), Some(1));
        assert_eq!(view.add_to_dream_list(2), Some(2));

        assert_eq!(view.dream_list().len(), 1);
        match view.dream_view() {
            DreamListView::Items { lines, .. } => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].quantity, 2);
            }
            DreamListView::Empty => panic!("dream list should not be empty"),
        }
    }

    #[test]
    fn test_add_unknown_product_is_ignored() {
        let mut view = CatalogView::new(small_catalog(), rate(10.0));
        assert_eq!(view.add_to_dream_list(42), None);
        assert!(view.dream_list().is_empty());
        assert_eq!(view.dream_view(), &DreamListView::Empty);
    }

    #[test]
    fn test_remove_unknown_leaves_state() {
        let mut view = CatalogView::new(small_catalog(), rate(10.0));
        view.add_to_dream_list(1);
        let before = view.dream_list().clone();

        assert!(!view.remove_from_dream_list(3));
        assert_eq!(view.dream_list(), &before);

        assert!(view.remove_from_dream_list(1));
        assert_eq!(view.dream_view(), &DreamListView::Empty);
    }

    #[test]
    fn test_compute_totals() {
        let mut view = CatalogView::new(small_catalog(), rate(10.0));
        assert_eq!(view.compute_totals(), Totals { total_fiat: 0, total_quote: 0.0 });

        view.add_to_dream_list(1);
        view.add_to_dream_list(1);
        view.add_to_dream_list(2);

        let totals = view.compute_totals();
        assert_eq!(totals.total_fiat, 250);
        assert_eq!(totals.total_quote, 25.0);
    }

    #[test]
    fn test_affordability() {
        let mut view = CatalogView::new(small_catalog(), rate(10.0));
        view.add_to_dream_list(1);
        view.add_to_dream_list(1);
        view.add_to_dream_list(2); // 25 SOL

        assert_eq!(view.compute_affordability_days(0.0), Affordability::InsufficientInput);
        assert_eq!(view.compute_affordability_days(-5.0), Affordability::InsufficientInput);
        assert_eq!(view.compute_affordability_days(f64::NAN), Affordability::InsufficientInput);
        assert_eq!(view.compute_affordability_days(5.0), Affordability::Days(5));
        assert_eq!(view.compute_affordability_days(2.0), Affordability::Days(13));
    }

    #[test]
    fn test_affordability_empty_list() {
        let view = CatalogView::new(small_catalog(), rate(10.0));
        assert_eq!(view.compute_affordability_days(3.0), Affordability::InsufficientInput);
    }

    #[test]
    fn test_rate_change_recomputes_everything() {
        let mut view = CatalogView::new(small_catalog(), Rate::DEFAULT);
        view.add_to_dream_list(3);

        match view.dream_view() {
            DreamListView::Items { totals, .. } => assert_eq!(totals.total_quote, 93.75),
            DreamListView::Empty => panic!("dream list should not be empty"),
        }

        view.on_rate_changed(rate(150.0));

        match view.dream_view() {
            DreamListView::Items { lines, totals, .. } => {
                assert_eq!(totals.total_quote, 100.0);
                assert_eq!(lines[0].quote_value, 100.0);
            }
            DreamListView::Empty => panic!("dream list should not be empty"),
        }
        let car = view.catalog_cards().iter().find(|c| c.product.id == 3).unwrap();
        assert_eq!(car.quote_value, 100.0);
    }

    #[test]
    fn test_daily_income_updates_dream_view() {
        let mut view = CatalogView::new(small_catalog(), rate(10.0));
        view.add_to_dream_list(3); // 1500 SOL

        view.set_daily_income("12.5");
        match view.dream_view() {
            DreamListView::Items { affordability, .. } => {
                assert_eq!(*affordability, Affordability::Days(120))
            }
            DreamListView::Empty => panic!("dream list should not be empty"),
        }

        view.set_daily_income("");
        match view.dream_view() {
            DreamListView::Items { affordability, .. } => {
                assert_eq!(*affordability, Affordability::InsufficientInput)
            }
            DreamListView::Empty => panic!("dream list should not be empty"),
        }
    }

    #[test]
    fn test_parse_income() {
        assert_eq!(parse_income("3.5"), 3.5);
        assert_eq!(parse_income("  2"), 2.0);
        assert_eq!(parse_income("4.2.1"), 4.2);
        assert_eq!(parse_income("7abc"), 7.0);
        assert_eq!(parse_income("-5"), -5.0);
        assert_eq!(parse_income(""), 0.0);
        assert_eq!(parse_income("abc"), 0.0);
        assert_eq!(parse_income("."), 0.0);
    }

    #[test]
    fn test_filter_labels() {
        let choices = Filter::choices();
        assert_eq!(choices.len(), 6);
        assert_eq!(choices[0], Filter::All);
        assert_eq!(choices[3].label(), "Real estate");
        assert_eq!(Filter::parse("ALL"), Filter::All);
        assert_eq!(Filter::parse("yachts").label(), "yachts");
    }
}
