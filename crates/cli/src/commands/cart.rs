//! Cart and favorites commands for the logged-in user.

use vitrine_core::ProductId;

use super::{CliError, Context};

/// Print the cart lines, badge count and total.
pub fn show(ctx: &Context) {
    let cart = ctx.shop.cart().cart();
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>5}  {:<40} {:>3} x {:>9} = {:>10}",
            item.id,
            item.title,
            item.quantity,
            item.price,
            item.line_total()
        );
    }
    println!("{} items, total {}", cart.item_count(), cart.total());
}

/// Add one unit of product `id`.
pub async fn add(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    require_session(ctx)?;
    let product = ctx.catalog.product(id).await?;
    if let Some(quantity) = ctx.shop.cart().add_to_cart(&product.summary())? {
        println!("{} x{quantity}", product.title);
    }
    Ok(())
}

pub fn decrease(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    require_session(ctx)?;
    ctx.shop.cart().decrease_quantity(id)?;
    match ctx.shop.cart().cart().get(id) {
        Some(item) => println!("{} x{}", item.title, item.quantity),
        None => println!("Product {id} is not in the cart"),
    }
    Ok(())
}

pub fn remove(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    require_session(ctx)?;
    if ctx.shop.cart().remove_from_cart(id)? {
        println!("Removed product {id}");
    } else {
        println!("Product {id} is not in the cart");
    }
    Ok(())
}

pub fn clear(ctx: &Context) -> Result<(), CliError> {
    require_session(ctx)?;
    ctx.shop.cart().clear_cart()?;
    println!("Cart cleared");
    Ok(())
}

/// Print favorite products in catalog order.
pub async fn favorites(ctx: &Context) -> Result<(), CliError> {
    require_session(ctx)?;
    if ctx.shop.favorites().favorites().is_empty() {
        println!("No favorites yet");
        return Ok(());
    }

    let products = ctx.catalog.products().await?;
    for product in ctx.shop.favorites().favorite_products(&products) {
        println!("{:>5}  {:<48} {:>10}", product.id, product.title, product.price);
    }
    Ok(())
}

pub fn toggle_favorite(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    require_session(ctx)?;
    match ctx.shop.favorites().toggle_favorite(id)? {
        Some(true) => println!("Added product {id} to favorites"),
        Some(false) => println!("Removed product {id} from favorites"),
        None => {}
    }
    Ok(())
}

// Mutations without a session are no-ops; say so instead of staying silent.
fn require_session(ctx: &Context) -> Result<(), CliError> {
    if ctx.shop.session().is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}
