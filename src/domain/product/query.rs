//! Listing filters and their query-string encoding.

use crate::shared::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Newest,
    PriceLowToHigh,
    PriceHighToLow,
    Popular,
}

impl ProductSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSort::Newest => "newest",
            ProductSort::PriceLowToHigh => "price_asc",
            ProductSort::PriceHighToLow => "price_desc",
            ProductSort::Popular => "popular",
        }
    }
}

/// Filters for `GET /api/products`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sizes: Vec<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub in_stock_only: bool,
    pub sort: Option<ProductSort>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.sizes.push(size.into());
        self
    }

    pub fn price_range(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn in_stock_only(mut self) -> Self {
        self.in_stock_only = true;
        self
    }

    pub fn sort(mut self, sort: ProductSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// `key=value&…` with values percent-encoded; empty when nothing is set.
    pub fn to_query_string(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        if let Some(c) = &self.category {
            params.push(format!("category={}", urlencoding::encode(c)));
        }
        if let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            params.push(format!("search={}", urlencoding::encode(q)));
        }
        if !self.sizes.is_empty() {
            params.push(format!("sizes={}", urlencoding::encode(&self.sizes.join(","))));
        }
        if let Some(min) = self.min_price {
            params.push(format!("minPrice={}", min.amount()));
        }
        if let Some(max) = self.max_price {
            params.push(format!("maxPrice={}", max.amount()));
        }
        if self.in_stock_only {
            params.push("inStock=true".to_string());
        }
        if let Some(s) = self.sort {
            params.push(format!("sort={}", s.as_str()));
        }
        if let Some(p) = self.page {
            params.push(format!("page={}", p));
        }
        if let Some(l) = self.limit {
            params.push(format!("limit={}", l));
        }
        params.join("&")
    }
}
