use crate::models::{NutritionFacts, ProductInfo};

/// Barcode lookup against a small built-in product table.
///
/// TODO: query OpenFoodFacts for codes missing from the table.
pub struct BarcodeService;

impl BarcodeService {
    pub fn new() -> Self {
        Self
    }

    pub fn lookup_product(&self, barcode: &str) -> Option<ProductInfo> {
        let product = match barcode.trim() {
            "123456789" => ProductInfo {
                name: "Organic Bananas".to_string(),
                brand: "Fresh & Easy".to_string(),
                price: 1.29,
                nutrition: NutritionFacts {
                    calories: Some(105.0),
                    protein: Some(1.3),
                    carbs: Some(27.0),
                    fat: Some(0.4),
                    fiber: Some(3.1),
                    sugar: Some(14.4),
                },
            },
            "987654321" => ProductInfo {
                name: "Whole Milk".to_string(),
                brand: "Dairy Farm".to_string(),
                price: 3.99,
                nutrition: NutritionFacts {
                    calories: Some(150.0),
                    protein: Some(8.0),
                    carbs: Some(12.0),
                    fat: Some(8.0),
                    fiber: Some(0.0),
                    sugar: Some(12.0),
                },
            },
            _ => {
                log::debug!("🔍 Unknown barcode: {}", barcode);
                return None;
            }
        };

        Some(product)
    }
}

impl Default for BarcodeService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_barcodes() {
        let service = BarcodeService::new();

        let bananas = service.lookup_product("123456789").unwrap();
        assert_eq!(bananas.name, "Organic Bananas");
        assert_eq!(bananas.brand, "Fresh & Easy");
        assert_eq!(bananas.nutrition.calories, Some(105.0));

        let milk = service.lookup_product(" 987654321 ").unwrap();
        assert_eq!(milk.price, 3.99);
        assert_eq!(milk.nutrition.fiber, Some(0.0));
    }

    #[test]
    fn test_unknown_barcode() {
        assert!(BarcodeService::new().lookup_product("000000000").is_none());
        assert!(BarcodeService::new().lookup_product("").is_none());
    }
}
