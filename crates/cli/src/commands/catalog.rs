//! Catalog browsing commands.

use rust_decimal::Decimal;
use vitrine_core::{Price, ProductId};
use vitrine_storefront::catalog::{CategoryFilter, ProductBrowser};

use super::{CliError, Context};

/// Print the product grid: filtered by category and price, revealed a page at
/// a time through the infinite scroll.
pub async fn products(
    ctx: &Context,
    category: &str,
    min: Option<Decimal>,
    max: Option<Decimal>,
    pages: usize,
) -> Result<(), CliError> {
    let mut browser = ProductBrowser::new(ctx.catalog.products().await?);
    browser.set_category(CategoryFilter::parse(category));
    if let Some(min) = min {
        browser.set_min_price(Price::new(min));
    }
    if let Some(max) = max {
        browser.set_max_price(Price::new(max));
    }

    reveal_pages(&browser, pages).await;

    let range = browser.listing().price_range();
    println!(
        "{} | {} - {}",
        browser.listing().category(),
        range.min,
        range.max
    );
    for product in browser.visible_products() {
        println!(
            "{:>5}  {:<48} {:>10}  {}",
            product.id, product.title, product.price, product.category
        );
    }

    let shown = browser.visible_products().len();
    let total = browser.filtered_len();
    if shown < total {
        println!("showing {shown} of {total} (use --pages for more)");
    } else {
        println!("{total} products");
    }
    Ok(())
}

/// Scroll the grid until `pages` pages are revealed or nothing is left.
async fn reveal_pages(browser: &ProductBrowser, pages: usize) {
    let mut progress = browser.subscribe();
    for _ in 1..pages {
        if !browser.sentinel_visible() {
            break;
        }
        if progress
            .wait_for(|paginator| !paginator.is_loading())
            .await
            .is_err()
        {
            break;
        }
    }
}

/// Print the category options in display order.
pub async fn categories(ctx: &Context) -> Result<(), CliError> {
    let browser = ProductBrowser::new(ctx.catalog.products().await?);
    for option in browser.listing().category_options() {
        println!("{option}");
    }
    Ok(())
}

/// Print one product's detail.
pub async fn product(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let product = ctx.catalog.product(id).await?;
    let favorite = if ctx.shop.favorites().is_favorite(id) {
        " *"
    } else {
        ""
    };

    println!("{}{favorite}", product.title);
    println!("{} | {}", product.price, product.category);
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    for image in &product.images {
        println!("  {image}");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrine_core::Product;

    use super::*;

    fn catalog(n: u32) -> Vec<Product> {
        (1..=n)
            .map(|n| Product {
                id: ProductId::new(i32::try_from(n).unwrap()),
                title: format!("Product {n}"),
                images: Vec::new(),
                description: String::new(),
                price: Price::from(n),
                category: "beauty".to_string(),
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_pages_stops_at_request() {
        let browser = ProductBrowser::new(catalog(90));
        reveal_pages(&browser, 3).await;
        assert_eq!(browser.visible_products().len(), 60);
        assert!(!browser.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_pages_stops_when_exhausted() {
        let browser = ProductBrowser::new(catalog(45));
        reveal_pages(&browser, 10).await;
        assert_eq!(browser.visible_products().len(), 45);
        assert!(!browser.show_sentinel());
    }
}
