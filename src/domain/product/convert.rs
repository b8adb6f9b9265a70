//! Conversions: catalog wire types → domain types.

use super::wire::{DropResponse, ProductResponse, ProductsResponse};
use super::{Drop, Product, ProductPage};

impl From<ProductResponse> for Product {
    fn from(p: ProductResponse) -> Self {
        Product {
            id: p.id,
            name: p.name,
            slug: p.slug,
            description: p.description.filter(|d| !d.trim().is_empty()),
            price: p.price,
            compare_at_price: p.compare_at_price,
            images: p.images,
            category: p.category,
            sizes: p.sizes,
            colors: p.colors,
            in_stock: p.in_stock,
            drop_id: p.drop_id,
        }
    }
}

impl From<DropResponse> for Drop {
    fn from(d: DropResponse) -> Self {
        Drop {
            id: d.id,
            name: d.name,
            description: d.description,
            starts_at: d.starts_at,
            ends_at: d.ends_at,
            products: d.products.into_iter().map(Product::from).collect(),
        }
    }
}

impl From<ProductsResponse> for ProductPage {
    fn from(r: ProductsResponse) -> Self {
        let count = r.products.len() as u32;
        let page = r.page.unwrap_or(1).max(1);
        ProductPage {
            products: r.products.into_iter().map(Product::from).collect(),
            total: r.total.unwrap_or(count),
            page,
            pages: r.total_pages.unwrap_or(page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Money;

    #[test]
    fn test_parses_listing() {
        let json = r#"{
            "products": [{
                "_id": "p1", "name": "Tee", "slug": "tee", "price": "1499",
                "originalPrice": 1999, "images": ["a.jpg", "b.jpg"],
                "sizes": ["M"], "colors": ["Black"], "drop": "d1"
            }],
            "total": 41, "page": 2, "totalPages": 3
        }"#;
        let page: ProductPage = serde_json::from_str::<ProductsResponse>(json)
            .unwrap()
            .into();
        assert_eq!(page.total, 41);
        assert!(page.has_more());
        let p = &page.products[0];
        assert_eq!(p.price, Money::rupees(1499));
        assert_eq!(p.compare_at_price, Some(Money::rupees(1999)));
        assert_eq!(p.drop_id.as_deref(), Some("d1"));
        assert!(p.in_stock);
    }

    #[test]
    fn test_unpaginated_listing_is_single_page() {
        let page: ProductPage = serde_json::from_str::<ProductsResponse>(
            r#"{"products": [{"id": "p1", "name": "Tee", "price": 10}]}"#,
        )
        .unwrap()
        .into();
        assert_eq!(page.total, 1);
        assert_eq!(page.page, 1);
        assert!(!page.has_more());
    }
}
