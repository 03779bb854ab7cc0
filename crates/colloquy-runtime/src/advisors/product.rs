//! ProductAdvisor: category overviews over a small built-in catalogue.

use colloquy_core::errors::DelegationError;
use colloquy_core::models::{EntityType, IntentType};
use colloquy_core::traits::{AdvisorRequest, IDomainAdvisor};
use serde_json::{json, Value};

use super::first;

const NAME: &str = "product_advisor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Laptop,
    Smartphone,
    Tablet,
}

impl Category {
    fn from_product_type(product_type: &str) -> Option<Self> {
        match product_type {
            "laptop" | "computer" | "pc" | "mac" => Some(Self::Laptop),
            "phone" | "smartphone" | "iphone" | "android" => Some(Self::Smartphone),
            "tablet" => Some(Self::Tablet),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Laptop => "laptop",
            Self::Smartphone => "smartphone",
            Self::Tablet => "tablet",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Laptop => {
                "Laptops are perfect for productivity, creativity and entertainment on the go."
            }
            Self::Smartphone => {
                "Smartphones keep you connected with powerful cameras, fast performance and beautiful displays."
            }
            Self::Tablet => {
                "Tablets offer a balance between portability and productivity for media and work."
            }
        }
    }

    fn considerations(&self) -> &'static [&'static str] {
        match self {
            Self::Laptop => &[
                "Processor performance",
                "RAM capacity",
                "Storage type and size",
                "Display quality",
                "Battery life",
            ],
            Self::Smartphone => &[
                "Camera quality",
                "Battery life",
                "Display quality",
                "Performance",
                "Ecosystem integration",
            ],
            Self::Tablet => &[
                "Display size and quality",
                "Performance",
                "Accessory support",
                "Operating system",
                "Battery life",
            ],
        }
    }
}

struct Product {
    name: &'static str,
    category: Category,
    brand: &'static str,
    price_range: &'static str,
    rating: f64,
}

const CATALOGUE: &[Product] = &[
    Product { name: "MacBook Air M2", category: Category::Laptop, brand: "apple", price_range: "premium", rating: 4.5 },
    Product { name: "Dell XPS 15", category: Category::Laptop, brand: "dell", price_range: "premium", rating: 4.4 },
    Product { name: "MacBook Pro 14\"", category: Category::Laptop, brand: "apple", price_range: "premium", rating: 4.7 },
    Product { name: "iPhone 15 Pro", category: Category::Smartphone, brand: "apple", price_range: "premium", rating: 4.6 },
    Product { name: "Samsung Galaxy S24 Ultra", category: Category::Smartphone, brand: "samsung", price_range: "premium", rating: 4.5 },
    Product { name: "Google Pixel 8 Pro", category: Category::Smartphone, brand: "google", price_range: "premium", rating: 4.3 },
    Product { name: "iPad Pro M2", category: Category::Tablet, brand: "apple", price_range: "premium", rating: 4.6 },
    Product { name: "Samsung Galaxy Tab S9 Ultra", category: Category::Tablet, brand: "samsung", price_range: "premium", rating: 4.4 },
];

const GENERAL_ADVICE: &str = "I'd be happy to help you find the right technology product! Tell me \
    what type of product you're looking for (laptop, phone, tablet), your budget range, what \
    you'll use it for and any preferred brands. What type of product interests you most?";

/// Answers product inquiries with a category overview and catalogue picks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductAdvisor;

impl IDomainAdvisor for ProductAdvisor {
    fn name(&self) -> &str {
        NAME
    }

    fn intent_type(&self) -> IntentType {
        IntentType::ProductInquiry
    }

    fn advise(&self, request: &AdvisorRequest<'_>) -> Result<Value, DelegationError> {
        let category = first(request.entities, EntityType::ProductType)
            .and_then(Category::from_product_type);
        let Some(category) = category else {
            return Ok(json!({
                "advice": GENERAL_ADVICE,
                "category": "general",
                "products": [],
                "follow_up_questions": [
                    "What type of product are you looking for?",
                    "What's your budget range?",
                    "What will you use it for?",
                    "Do you have any brand preferences?",
                ],
            }));
        };

        let products: Vec<&Product> = CATALOGUE.iter().filter(|p| p.category == category).collect();
        let brand = first(request.entities, EntityType::Brand);
        let price_range = first(request.entities, EntityType::PriceRange);

        let mut advice = format!("{}\n\nKey considerations:\n", category.description());
        for consideration in category.considerations() {
            advice.push_str(&format!("• {consideration}\n"));
        }
        advice.push_str("\nPopular options:\n");
        for product in products.iter().take(3) {
            advice.push_str(&format!("• {} ({}/5)\n", product.name, product.rating));
        }
        if let Some(brand) = brand {
            let picks: Vec<&&Product> = products.iter().filter(|p| p.brand == brand).collect();
            if !picks.is_empty() {
                advice.push_str(&format!("\nFrom {brand}:\n"));
                for product in picks {
                    advice.push_str(&format!(
                        "• {}: rating {}/5, price range {}\n",
                        product.name, product.rating, product.price_range
                    ));
                }
            }
        }
        if let Some(range) = price_range {
            advice.push_str(&format!(
                "\nFor a budget of {range}, prioritize the features that matter most to your use case."
            ));
        }

        let follow_ups: Vec<&str> = [
            "What's your budget range?",
            "What will you primarily use it for?",
            "Do you have any brand preferences?",
            "Any specific features you need?",
        ]
        .into_iter()
        .filter(|q| price_range.is_none() || !q.contains("budget"))
        .filter(|q| brand.is_none() || !q.contains("brand"))
        .take(3)
        .collect();

        Ok(json!({
            "advice": advice,
            "category": category.as_str(),
            "products": products.iter().map(|p| p.name).collect::<Vec<_>>(),
            "follow_up_questions": follow_ups,
        }))
    }
}

#[cfg(test)]
mod tests {
    use colloquy_core::models::EntityMap;

    use super::*;

    fn advise(entities: &[(EntityType, &str)]) -> Value {
        let mut map = EntityMap::new();
        for (entity, value) in entities {
            map.entry(*entity).or_default().push(value.to_string());
        }
        ProductAdvisor
            .advise(&AdvisorRequest {
                utterance: "",
                entities: &map,
                history: &[],
            })
            .unwrap()
    }

    #[test]
    fn aliases_map_to_categories() {
        let payload = advise(&[(EntityType::ProductType, "iphone")]);
        assert_eq!(payload["category"], json!("smartphone"));
        assert_eq!(payload["products"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn brand_and_budget_questions_drop_when_known() {
        let payload = advise(&[
            (EntityType::ProductType, "laptop"),
            (EntityType::Brand, "dell"),
            (EntityType::PriceRange, "under $1500"),
        ]);
        let questions = payload["follow_up_questions"].as_array().unwrap();
        assert_eq!(questions.len(), 2);
        assert!(payload["advice"].as_str().unwrap().contains("Dell XPS 15: rating 4.4/5"));
    }

    #[test]
    fn no_category_gives_general_advice() {
        let payload = advise(&[]);
        assert_eq!(payload["category"], json!("general"));
    }
}
