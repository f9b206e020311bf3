// ============================================================================
// Structure : Product
// ============================================================================
// Un article du catalogue (montre, voiture, villa, ...)
//
// Les produits sont immuables : le catalogue est une liste fixe chargée au
// démarrage et jamais modifiée ensuite.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Identifiant stable d'un produit
pub type ProductId = u32;

/// Catégorie de produit (ensemble fermé)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Watches,
    Cars,
    RealEstate,
    Gadgets,
    Fashion,
}

impl Category {
    /// Toutes les catégories, dans l'ordre des boutons de filtre
    pub const ALL: [Category; 5] = [
        Category::Watches,
        Category::Cars,
        Category::RealEstate,
        Category::Gadgets,
        Category::Fashion,
    ];

    /// Identifiant texte utilisé par les filtres (ex: "real-estate")
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Watches => "watches",
            Category::Cars => "cars",
            Category::RealEstate => "real-estate",
            Category::Gadgets => "gadgets",
            Category::Fashion => "fashion",
        }
    }

    /// Label pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            Category::Watches => "Watches",
            Category::Cars => "Cars",
            Category::RealEstate => "Real estate",
            Category::Gadgets => "Gadgets",
            Category::Fashion => "Fashion",
        }
    }
}

/// Article du catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Category,

    /// Prix en dollars (entier positif)
    pub price: u64,

    /// Référence de l'image (chemin relatif)
    pub image: String,
}

impl Product {
    pub fn new(id: ProductId, name: &str, category: Category, price: u64, image: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            category,
            price,
            image: image.to_string(),
        }
    }
}

/// Catalogue par défaut du dream board
pub fn default_catalog() -> Vec<Product> {
    use Category::*;

    vec![
        Product::new(1, "Rolex Daytona", Watches, 15_000, "images/rolex.png"),
        Product::new(2, "Ferrari 488 GTB", Cars, 250_000, "images/ferrari.png"),
        Product::new(3, "Patek Philippe", Watches, 1_200_000, "images/patek.png"),
        Product::new(4, "Lamborghini Revuelto", Cars, 900_000, "images/lamba.jpg"),
        Product::new(5, "Aston Martin Valhalla", Cars, 1_000_000, "images/Aston.jpg"),
        Product::new(6, "Ferrari Roma", Cars, 225_000, "images/ferrariRoma.jpg"),
        Product::new(7, "Luxury Villa", RealEstate, 449_000, "images/villa1.webp"),
        Product::new(8, "Beachfront Villa", RealEstate, 1_000_000, "images/villa2.webp"),
        Product::new(9, "Modern Villa", RealEstate, 380_000, "images/villa3.webp"),
        Product::new(10, "Countryside Villa", RealEstate, 250_000, "images/villa4.jpg"),
        Product::new(11, "Luxury Phone", Gadgets, 100_000, "images/phone1.jpg"),
        Product::new(12, "Premium Headphones", Gadgets, 70_000, "images/headphones.jpg"),
        Product::new(13, "Diamond iPhone", Gadgets, 600_000, "images/iphone1.jpeg"),
        Product::new(14, "Foldable Phone", Gadgets, 100_000, "images/phone2.jpg"),
        Product::new(15, "Designer Dress", Fashion, 30_000, "images/fashion1.jpg"),
        Product::new(16, "Luxury Handbag", Fashion, 28_000, "images/bag1.jpg"),
        Product::new(17, "Designer Bag", Fashion, 32_000, "images/bag2.jpg"),
        Product::new(18, "Premium Bag", Fashion, 70_000, "images/bag3.jpg"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_catalog_ids_unique() {
        let catalog = default_catalog();
        let ids: HashSet<_> = catalog.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), catalog.len());
        assert!(catalog.iter().all(|p| p.price > 0));
    }

    #[test]
    fn test_category_slug_matches_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.slug()));
        }
    }
}
