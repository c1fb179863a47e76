//! Simulated checkout.
//!
//! Validates the payment form, waits out a fake processing delay and clears
//! the cart. No payment is taken.

use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;
use vitrine_core::{Price, StoreError};

use crate::cart::CartState;
use crate::session::SessionState;

/// Simulated payment processing time.
pub const PROCESSING_DELAY: Duration = Duration::from_secs(1);

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));
static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5,6}$").expect("Invalid regex"));
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("Invalid regex"));
static CVV_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("Invalid regex"));

const CARD_DIGITS: usize = 16;

// =============================================================================
// Form
// =============================================================================

/// Shipping and payment details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutField {
    FullName,
    Email,
    Address,
    City,
    Zip,
    CardNumber,
    Expiry,
    Cvv,
}

impl CheckoutField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Address => "address",
            Self::City => "city",
            Self::Zip => "zip",
            Self::CardNumber => "cardNumber",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: CheckoutField,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const REQUIRED: &str = "This field is required";

impl CheckoutForm {
    /// Check every field, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per invalid field, in form order.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let checks: [(CheckoutField, &str, fn(&str) -> bool, &'static str); 8] = [
            (CheckoutField::FullName, self.full_name.as_str(), |_| true, REQUIRED),
            (
                CheckoutField::Email,
                self.email.as_str(),
                |v| EMAIL_RE.is_match(v),
                "Enter a valid email",
            ),
            (CheckoutField::Address, self.address.as_str(), |_| true, REQUIRED),
            (CheckoutField::City, self.city.as_str(), |_| true, REQUIRED),
            (
                CheckoutField::Zip,
                self.zip.as_str(),
                |v| ZIP_RE.is_match(v),
                "Enter 5 or 6 digits",
            ),
            (
                CheckoutField::CardNumber,
                self.card_number.as_str(),
                |v| only_digits(v).len() == CARD_DIGITS,
                "Enter 16 digits",
            ),
            (
                CheckoutField::Expiry,
                self.expiry.as_str(),
                |v| EXPIRY_RE.is_match(v),
                "Use the MM/YY format",
            ),
            (
                CheckoutField::Cvv,
                self.cvv.as_str(),
                |v| CVV_RE.is_match(v),
                "Enter 3 or 4 digits",
            ),
        ];

        let errors: Vec<FieldError> = checks
            .into_iter()
            .filter_map(|(field, value, is_valid, message)| {
                let value = value.trim();
                if value.is_empty() {
                    Some(FieldError {
                        field,
                        message: REQUIRED,
                    })
                } else if is_valid(value) {
                    None
                } else {
                    Some(FieldError { field, message })
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Input masks
// =============================================================================

fn only_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Up to 16 digits in groups of four: `1234 5678 9012 3456`.
#[must_use]
pub fn mask_card_number(value: &str) -> String {
    let digits: Vec<char> = only_digits(value).chars().take(CARD_DIGITS).collect();
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Up to four digits as `MM/YY`; the slash appears once a year digit is typed.
#[must_use]
pub fn mask_expiry(value: &str) -> String {
    let digits: String = only_digits(value).chars().take(4).collect();
    if digits.len() > 2 {
        let (month, year) = digits.split_at(2);
        format!("{month}/{year}")
    } else {
        digits
    }
}

/// Up to four digits.
#[must_use]
pub fn mask_cvv(value: &str) -> String {
    only_digits(value).chars().take(4).collect()
}

// =============================================================================
// Submission
// =============================================================================

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("log in to check out")]
    NotAuthenticated,

    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid checkout form: {}", format_field_errors(.0))]
    Invalid(Vec<FieldError>),

    #[error("failed to clear cart: {0}")]
    Store(#[from] StoreError),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Confirmation of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub order_id: Uuid,
    pub full_name: String,
    pub item_count: u32,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
}

/// Places simulated orders for the current session's cart.
#[derive(Debug, Clone)]
pub struct Checkout {
    session: Arc<SessionState>,
    cart: Arc<CartState>,
    delay: Duration,
}

impl Checkout {
    #[must_use]
    pub const fn new(session: Arc<SessionState>, cart: Arc<CartState>) -> Self {
        Self {
            session,
            cart,
            delay: PROCESSING_DELAY,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Validate `form`, simulate payment and clear the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAuthenticated`] without a session,
    /// [`CheckoutError::EmptyCart`] for an empty cart, or
    /// [`CheckoutError::Invalid`] listing every bad field. Nothing changes on
    /// error.
    #[instrument(skip(self, form))]
    pub async fn submit(&self, form: &CheckoutForm) -> Result<Receipt, CheckoutError> {
        let user_id = self.session.user_id().ok_or(CheckoutError::NotAuthenticated)?;
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        form.validate().map_err(CheckoutError::Invalid)?;

        tokio::time::sleep(self.delay).await;

        let cart = self.cart.cart();
        let receipt = Receipt {
            order_id: Uuid::new_v4(),
            full_name: form.full_name.trim().to_string(),
            item_count: cart.item_count(),
            total: cart.total(),
            placed_at: Utc::now(),
        };
        self.cart.clear_cart()?;

        info!(
            user_id = %user_id,
            order_id = %receipt.order_id,
            items = receipt.item_count,
            total = %receipt.total,
            "Checkout completed"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrine_core::{Email, Identity, KeyValueStore, MemoryStore, ProductId, ProductSummary, UserId};

    use super::*;
    use crate::session::SessionObserver;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            full_name: "Emily Johnson".to_string(),
            email: "emily@example.com".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            zip: "12345".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            expiry: "09/27".to_string(),
            cvv: "123".to_string(),
        }
    }

    fn setup() -> (Arc<SessionState>, Arc<CartState>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = Arc::new(SessionState::restore(Arc::clone(&store)));
        let cart = Arc::new(CartState::new(store));
        session.observe(Arc::clone(&cart) as Arc<dyn SessionObserver>);
        (session, cart)
    }

    fn login(session: &SessionState) {
        session
            .login(Identity {
                id: UserId::new(1),
                email: Email::parse("emily@example.com").unwrap(),
                first_name: "Emily".to_string(),
                last_name: "Johnson".to_string(),
            })
            .unwrap();
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_all_errors_reported_together() {
        let form = CheckoutForm {
            email: "emily@".to_string(),
            zip: "1234".to_string(),
            card_number: "4242".to_string(),
            expiry: "13/27".to_string(),
            cvv: "12".to_string(),
            ..CheckoutForm::default()
        };
        let fields: Vec<CheckoutField> = form
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                CheckoutField::FullName,
                CheckoutField::Email,
                CheckoutField::Address,
                CheckoutField::City,
                CheckoutField::Zip,
                CheckoutField::CardNumber,
                CheckoutField::Expiry,
                CheckoutField::Cvv,
            ]
        );
    }

    #[test]
    fn test_blank_field_is_required() {
        let form = CheckoutForm {
            city: "   ".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, REQUIRED);
    }

    #[test]
    fn test_masks() {
        assert_eq!(mask_card_number("4242424242424242999"), "4242 4242 4242 4242");
        assert_eq!(mask_card_number("42-42 4"), "4242 4");
        assert_eq!(mask_expiry("0"), "0");
        assert_eq!(mask_expiry("09"), "09");
        assert_eq!(mask_expiry("0927"), "09/27");
        assert_eq!(mask_expiry("09/2799"), "09/27");
        assert_eq!(mask_cvv("12a345"), "1234");
    }

    #[tokio::test]
    async fn test_requires_session() {
        let (session, cart) = setup();
        let checkout = Checkout::new(session, cart).with_delay(Duration::ZERO);
        assert!(matches!(
            checkout.submit(&valid_form()).await,
            Err(CheckoutError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_requires_items() {
        let (session, cart) = setup();
        login(&session);
        let checkout = Checkout::new(session, cart).with_delay(Duration::ZERO);
        assert!(matches!(
            checkout.submit(&valid_form()).await,
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_clears_cart() {
        let (session, cart) = setup();
        login(&session);
        let product = ProductSummary {
            id: ProductId::new(5),
            title: "Lipstick".to_string(),
            price: Price::from_cents(1250),
            image: String::new(),
        };
        cart.add_to_cart(&product).unwrap();
        cart.add_to_cart(&product).unwrap();

        let checkout = Checkout::new(session, Arc::clone(&cart));
        let receipt = checkout.submit(&valid_form()).await.unwrap();

        assert_eq!(receipt.full_name, "Emily Johnson");
        assert_eq!(receipt.item_count, 2);
        assert_eq!(receipt.total, Price::from_cents(2500));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_keeps_cart() {
        let (session, cart) = setup();
        login(&session);
        cart.add_to_cart(&ProductSummary {
            id: ProductId::new(1),
            title: "Mascara".to_string(),
            price: Price::from(10),
            image: String::new(),
        })
        .unwrap();

        let checkout = Checkout::new(session, Arc::clone(&cart)).with_delay(Duration::ZERO);
        let form = CheckoutForm {
            cvv: "1".to_string(),
            ..valid_form()
        };
        assert!(matches!(
            checkout.submit(&form).await,
            Err(CheckoutError::Invalid(errors)) if errors.len() == 1
        ));
        assert_eq!(cart.item_count(), 1);
    }
}
