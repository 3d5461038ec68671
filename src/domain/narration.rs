//! 商品旁白文本
//!
//! 宿主商店把商品详情交给这里，得到一段适合朗读的文本

use serde::Deserialize;

/// 需要朗读的商品信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductNarration {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default, rename = "inStock", alias = "in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl ProductNarration {
    /// 生成朗读文本
    pub fn format(&self) -> String {
        let mut narration = format!("{}. {} ", self.name, self.description);
        narration.push_str(&format!("This product costs ${}. ", self.price));

        if !self.sizes.is_empty() {
            narration.push_str(&format!("Available in sizes: {}. ", self.sizes.join(", ")));
        }

        narration.push_str(if self.in_stock {
            "This item is currently in stock."
        } else {
            "Sorry, this item is currently out of stock."
        });

        if let Some(rating) = self.rating.filter(|r| *r != 0.0) {
            narration.push_str(&format!(" Customer rating: {} out of 5 stars.", rating));
        }

        narration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_narration() {
        let product = ProductNarration {
            name: "Trail Jacket".to_string(),
            description: "Waterproof shell.".to_string(),
            price: 89.99,
            sizes: vec!["S".to_string(), "M".to_string()],
            in_stock: true,
            rating: Some(4.5),
        };
        assert_eq!(
            product.format(),
            "Trail Jacket. Waterproof shell. This product costs $89.99. \
             Available in sizes: S, M. This item is currently in stock. \
             Customer rating: 4.5 out of 5 stars."
        );
    }

    #[test]
    fn test_minimal_narration() {
        let product: ProductNarration = serde_json::from_str(
            r#"{"name": "Mug", "description": "Ceramic.", "price": 12, "inStock": false}"#,
        )
        .unwrap();
        assert_eq!(
            product.format(),
            "Mug. Ceramic. This product costs $12. Sorry, this item is currently out of stock."
        );
    }
}
