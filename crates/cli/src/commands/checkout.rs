//! Simulated checkout.

use clap::Args;
use vitrine_storefront::checkout::{
    CheckoutError, CheckoutForm, mask_card_number, mask_cvv, mask_expiry,
};

use super::{CliError, Context};

/// Shipping and payment details. Card number, expiry and CVV go through the
/// same input masks as the checkout form.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long, default_value = "")]
    pub full_name: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub zip: String,
    #[arg(long, default_value = "")]
    pub card_number: String,
    /// Expiry as MM/YY
    #[arg(long, default_value = "")]
    pub expiry: String,
    #[arg(long, default_value = "")]
    pub cvv: String,
}

impl From<CheckoutArgs> for CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            full_name: args.full_name,
            email: args.email,
            address: args.address,
            city: args.city,
            zip: args.zip,
            card_number: mask_card_number(&args.card_number),
            expiry: mask_expiry(&args.expiry),
            cvv: mask_cvv(&args.cvv),
        }
    }
}

/// Place the order and print the receipt, or every form problem at once.
pub async fn checkout(ctx: &Context, args: CheckoutArgs) -> Result<(), CliError> {
    let form = CheckoutForm::from(args);

    match ctx.shop.checkout().submit(&form).await {
        Ok(receipt) => {
            println!("Order {} placed", receipt.order_id);
            println!(
                "Thank you, {}: {} items, {}",
                receipt.full_name, receipt.item_count, receipt.total
            );
            Ok(())
        }
        Err(CheckoutError::Invalid(errors)) => {
            for error in &errors {
                println!("  {error}");
            }
            Err(CheckoutError::Invalid(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}
