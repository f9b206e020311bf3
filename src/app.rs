// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Le catalogue et la liste de rêve vivent dans CatalogView ; App ajoute
//   l'état purement interactif (sélection, focus, saisie, confirmations)
// ============================================================================

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::catalog::{CatalogView, DreamListView, Filter};
use crate::models::{ProductId, RateUpdate};

/// Durée du retour visuel "Added!" après un ajout
const ADDED_FLASH: Duration = Duration::from_secs(1);

// ============================================================================
// Enums : Screen et Focus
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : catalogue + liste de rêve
    Board,

    /// Saisie du revenu journalier en SOL
    /// CONCEPT : Modal input mode (Vim-like)
    /// - Enter valide, ESC annule
    IncomeInput,
}

/// Panneau qui reçoit la navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Catalog,
    DreamList,
}

/// Retour visuel après un ajout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedFlash {
    pub product_id: ProductId,
    pub since: Instant,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Catalogue, filtre, liste de rêve et vues dérivées du cours
    pub view: CatalogView,

    /// Dernière notification du flux de prix (None avant la première)
    pub last_update: Option<RateUpdate>,

    pub current_screen: Screen,
    pub focus: Focus,

    /// Index sélectionné dans le catalogue filtré
    pub catalog_index: usize,

    /// Index sélectionné dans la liste de rêve
    pub dream_index: usize,

    /// Index du filtre actif dans Filter::choices()
    pub filter_index: usize,

    /// Two-step quit : première pression de 'q' → true, deuxième → quit
    pub confirm_quit: bool,

    /// Buffer de saisie pour le revenu journalier
    pub input_buffer: String,

    /// Prompt affiché en mode saisie
    pub input_prompt: String,

    /// Dernière valeur validée du revenu (affichée dans le panneau)
    pub income_text: String,

    pub flash: Option<AddedFlash>,
}

impl App {
    /// Crée une App autour d'une CatalogView déjà rendue
    pub fn new(view: CatalogView) -> Self {
        Self {
            running: true,
            view,
            last_update: None,
            current_screen: Screen::Board,
            focus: Focus::Catalog,
            catalog_index: 0,
            dream_index: 0,
            filter_index: 0,
            confirm_quit: false,
            input_buffer: String::new(),
            input_prompt: String::new(),
            income_text: String::new(),
            flash: None,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Cours
    // ========================================================================

    /// Applique une notification du flux de prix
    pub fn apply_rate_update(&mut self, update: RateUpdate) {
        debug!(rate = update.rate.value(), origin = ?update.origin, "Applying rate update");
        self.view.on_rate_changed(update.rate);
        self.last_update = Some(update);
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Nombre de lignes du panneau qui a le focus
    fn focused_len(&self) -> usize {
        match self.focus {
            Focus::Catalog => self.view.catalog_cards().len(),
            Focus::DreamList => self.view.dream_list().len(),
        }
    }

    fn focused_index_mut(&mut self) -> &mut usize {
        match self.focus {
            Focus::Catalog => &mut self.catalog_index,
            Focus::DreamList => &mut self.dream_index,
        }
    }

    /// CONCEPT RUST : saturating_sub() ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        let index = self.focused_index_mut();
        *index = index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.focused_len().saturating_sub(1);
        let index = self.focused_index_mut();
        *index = (*index + 1).min(max_index);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Catalog => Focus::DreamList,
            Focus::DreamList => Focus::Catalog,
        };
    }

    /// Ramène les index dans les bornes après un changement de contenu
    fn clamp_selection(&mut self) {
        let catalog_max = self.view.catalog_cards().len().saturating_sub(1);
        self.catalog_index = self.catalog_index.min(catalog_max);

        let dream_max = self.view.dream_list().len().saturating_sub(1);
        self.dream_index = self.dream_index.min(dream_max);
    }

    /// Produit sélectionné dans le catalogue
    pub fn selected_product_id(&self) -> Option<ProductId> {
        self.view
            .catalog_cards()
            .get(self.catalog_index)
            .map(|card| card.product.id)
    }

    /// Produit sélectionné dans la liste de rêve
    pub fn selected_dream_id(&self) -> Option<ProductId> {
        self.view
            .dream_list()
            .entries()
            .get(self.dream_index)
            .map(|entry| entry.product.id)
    }

    // ========================================================================
    // Filtres
    // ========================================================================

    /// Active le filtre numéro `index` de Filter::choices() (ignoré si hors bornes)
    pub fn select_filter(&mut self, index: usize) {
        let choices = Filter::choices();
        if let Some(filter) = choices.get(index) {
            self.filter_index = index;
            self.view.set_filter(filter.slug());
            self.catalog_index = 0;
            info!(filter = %filter.slug(), "Filter selected");
        }
    }

    pub fn next_filter(&mut self) {
        let count = Filter::choices().len();
        self.select_filter((self.filter_index + 1) % count);
    }

    pub fn previous_filter(&mut self) {
        let count = Filter::choices().len();
        self.select_filter((self.filter_index + count - 1) % count);
    }

    // ========================================================================
    // Liste de rêve
    // ========================================================================

    /// Ajoute le produit sélectionné dans le catalogue
    pub fn add_selected(&mut self, now: Instant) {
        let Some(id) = self.selected_product_id() else {
            return;
        };

        if let Some(quantity) = self.view.add_to_dream_list(id) {
            info!(product_id = id, quantity, "Product added to dream list");
            self.flash = Some(AddedFlash {
                product_id: id,
                since: now,
            });
        }
        self.clamp_selection();
    }

    /// Retire l'entrée sélectionnée dans la liste de rêve
    pub fn remove_selected(&mut self) {
        if let Some(id) = self.selected_dream_id() {
            info!(product_id = id, "Product removed from dream list");
            self.view.remove_from_dream_list(id);
        }
        self.clamp_selection();
    }

    /// Vrai si le produit vient d'être ajouté (affiche "Added!")
    pub fn is_flashing(&self, id: ProductId) -> bool {
        self.flash.map(|f| f.product_id == id).unwrap_or(false)
    }

    pub fn has_dream_items(&self) -> bool {
        !matches!(self.view.dream_view(), DreamListView::Empty)
    }

    /// Tick : appelé à chaque itération de la boucle
    ///
    /// Efface le retour "Added!" après une seconde.
    pub fn tick(&mut self, now: Instant) {
        if let Some(flash) = self.flash {
            if now.duration_since(flash.since) >= ADDED_FLASH {
                self.flash = None;
            }
        }
    }

    // ========================================================================
    // Quit Confirmation
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    /// Entre en mode saisie du revenu, prérempli avec la valeur actuelle
    pub fn start_income_input(&mut self) {
        self.current_screen = Screen::IncomeInput;
        self.input_buffer = self.income_text.clone();
        self.input_prompt = "Daily SOL income: ".to_string();
    }

    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Board;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Valide la saisie et recalcule les jours nécessaires
    pub fn submit_income_input(&mut self) {
        let value = std::mem::take(&mut self.input_buffer);
        self.view.set_daily_income(&value);
        info!(input = %value, income = self.view.daily_income(), "Daily income updated");
        self.income_text = value;
        self.current_screen = Screen::Board;
        self.input_prompt.clear();
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::IncomeInput
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
