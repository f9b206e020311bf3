// ============================================================================
// Structure : DreamList
// ============================================================================
// La "liste de rêve" : panier ordonné par insertion, une entrée par produit
//
// CONCEPTS RUST :
// 1. Vec + recherche linéaire : le panier reste petit, l'ordre d'insertion
//    est conservé gratuitement
// 2. Invariant : quantity >= 1, garanti par les seules méthodes qui créent
//    ou modifient une entrée
// ============================================================================

use crate::models::{Product, ProductId};

/// Une entrée de la liste de rêve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DreamListEntry {
    pub product: Product,
    quantity: u32,
}

impl DreamListEntry {
    fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// Quantité (toujours >= 1)
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Sous-total en dollars : prix × quantité
    pub fn subtotal(&self) -> u64 {
        self.product.price * u64::from(self.quantity)
    }
}

/// Liste de rêve
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DreamList {
    entries: Vec<DreamListEntry>,
}

impl DreamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute un produit
    ///
    /// Incrémente la quantité si une entrée existe déjà pour ce produit,
    /// sinon insère une nouvelle entrée en fin de liste.
    /// Retourne la nouvelle quantité.
    pub fn add(&mut self, product: &Product) -> u32 {
        match self.entries.iter_mut().find(|e| e.product.id == product.id) {
            Some(entry) => {
                entry.quantity += 1;
                entry.quantity
            }
            None => {
                self.entries.push(DreamListEntry::new(product.clone()));
                1
            }
        }
    }

    /// Supprime l'entrée d'un produit, retourne true si elle existait
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.product.id != id);
        self.entries.len() != before
    }

    pub fn get(&self, id: ProductId) -> Option<&DreamListEntry> {
        self.entries.iter().find(|e| e.product.id == id)
    }

    pub fn entries(&self) -> &[DreamListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total en dollars de toutes les entrées
    pub fn total_fiat(&self) -> u64 {
        self.entries.iter().map(DreamListEntry::subtotal).sum()
    }
}
