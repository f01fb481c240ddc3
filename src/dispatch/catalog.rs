//! Product catalog, item categories, substitutes and seasonal items

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Fallback category for items no keyword matches
pub const OTHER_CATEGORY: &str = "other";

/// Category keywords, checked in order; first containing match wins
const CATEGORIES: &[(&str, &[&str])] = &[
    ("dairy", &["milk", "cheese", "yogurt", "butter", "cream", "ice cream"]),
    (
        "produce",
        &["apple", "banana", "orange", "lettuce", "tomato", "carrot", "onion", "potato"],
    ),
    ("meat", &["chicken", "beef", "pork", "fish", "lamb", "turkey"]),
    ("grains", &["bread", "rice", "pasta", "cereal", "flour", "oats"]),
    ("beverages", &["water", "juice", "soda", "coffee", "tea", "beer", "wine"]),
    ("snacks", &["chips", "cookies", "crackers", "nuts", "popcorn"]),
    ("frozen", &["frozen pizza", "frozen vegetables", "ice cream"]),
    (
        "household",
        &["soap", "detergent", "paper towels", "toilet paper", "cleaning supplies"],
    ),
];

const SUBSTITUTES: &[(&str, &[&str])] = &[
    ("milk", &["almond milk", "soy milk", "oat milk", "coconut milk"]),
    ("bread", &["tortillas", "pita bread", "rice cakes"]),
    ("sugar", &["honey", "maple syrup", "stevia", "agave"]),
    ("eggs", &["flax seeds", "banana", "applesauce", "tofu"]),
    ("butter", &["olive oil", "coconut oil", "avocado", "greek yogurt"]),
];

/// Season driving the seasonal suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// March to May is spring, June to August summer, September to
    /// November fall, anything else winter
    pub fn of(date: impl Datelike) -> Self {
        match date.month0() {
            2..=4 => Season::Spring,
            5..=7 => Season::Summer,
            8..=10 => Season::Fall,
            _ => Season::Winter,
        }
    }

    pub fn essentials(&self) -> &'static [&'static str] {
        match self {
            Season::Summer => &["watermelon", "ice cream", "lemonade", "grill supplies", "beach items"],
            Season::Winter => &["hot chocolate", "soup ingredients", "warm clothes", "holiday items"],
            Season::Spring => &["fresh flowers", "spring vegetables", "cleaning supplies"],
            Season::Fall => &["pumpkin", "apple cider", "fall decorations", "warm spices"],
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Season::Spring => write!(f, "Spring"),
            Season::Summer => write!(f, "Summer"),
            Season::Fall => write!(f, "Fall"),
            Season::Winter => write!(f, "Winter"),
        }
    }
}

/// Category for an item name
pub fn categorize(item: &str) -> &'static str {
    let item = item.to_lowercase();
    CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| item.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(OTHER_CATEGORY)
}

/// Known alternatives for an exact item name
pub fn substitutes(item: &str) -> &'static [&'static str] {
    let item = item.to_lowercase();
    SUBSTITUTES
        .iter()
        .find(|(name, _)| *name == item)
        .map(|(_, alternatives)| *alternatives)
        .unwrap_or(&[])
}

/// A searchable product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub brand: String,
}

impl Product {
    fn new(name: &str, price: f64, category: &str, brand: &str) -> Self {
        Self {
            name: name.to_string(),
            price,
            category: category.to_string(),
            brand: brand.to_string(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        [&self.name, &self.category, &self.brand]
            .iter()
            .any(|field| field.to_lowercase().contains(query))
    }
}

/// In-memory product catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Products whose name, category or brand contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<Product> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.products
            .iter()
            .filter(|product| product.matches(&query))
            .cloned()
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            Product::new("Organic Milk", 4.99, "dairy", "Organic Valley"),
            Product::new("Whole Grain Bread", 3.49, "grains", "Nature's Own"),
            Product::new("Fresh Apples", 2.99, "produce", "Local Farm"),
            Product::new("Chicken Breast", 8.99, "meat", "Perdue"),
            Product::new("Greek Yogurt", 5.49, "dairy", "Chobani"),
            Product::new("Brown Rice", 3.99, "grains", "Uncle Ben's"),
            Product::new("Fresh Spinach", 2.49, "produce", "Local Farm"),
            Product::new("Salmon Fillet", 12.99, "meat", "Wild Alaskan"),
            Product::new("Orange Juice", 4.49, "beverages", "Tropicana"),
            Product::new("Dark Chocolate", 6.99, "snacks", "Lindt"),
        ])
    }
}
