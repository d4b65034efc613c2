use food_cart_core::CategoryId;
use futures::future::join;
use tracing::warn;

use crate::api::{ApiClient, Category, ProductSnapshot};

/// Products and categories for browsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub products: Vec<ProductSnapshot>,
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Name of the category with `id`, if it was loaded.
    #[must_use]
    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .map(|category| category.name.as_str())
    }
}

/// Load products and categories concurrently.
///
/// With `category` set, only products in that category are kept. Either list
/// degrades to empty if its request fails.
pub async fn load_catalog(client: &ApiClient, category: Option<CategoryId>) -> Catalog {
    let (products, categories) = join(client.list_products(), client.list_categories()).await;

    let mut products = products.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load products");
        Vec::new()
    });
    let categories = categories.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load categories");
        Vec::new()
    });

    if let Some(category) = category {
        products.retain(|product| product.category_id == Some(category));
    }

    Catalog {
        products,
        categories,
    }
}
