//! Checkout command.

use ecofinds_cart::{CheckoutError, CheckoutForm, place_order};
use tracing::{error, info};

use super::{Session, print_json};

/// Validate the form and place an order for the session's cart.
///
/// # Errors
///
/// Returns an error if the cart is empty or busy, the form is invalid, or
/// the backend fails to place the order.
pub async fn run(session: &Session, form: CheckoutForm) -> Result<(), Box<dyn std::error::Error>> {
    session.render().await?;
    info!(
        latency = ?session.config.latency.order_placement,
        "Placing order"
    );

    let confirmation = match place_order(&session.ledger, &form).await {
        Ok(confirmation) => confirmation,
        Err(CheckoutError::InvalidForm(errors)) => {
            error!("Checkout form is invalid:");
            for (field, message) in &errors {
                error!("  - {}: {message}", field.label());
            }
            return Err(format!("{} invalid field(s)", errors.len()).into());
        }
        Err(e) => return Err(e.into()),
    };

    if session.json {
        print_json(&confirmation)?;
    } else {
        info!("Order placed successfully!");
        info!("  Order ID: {}", confirmation.order_id);
        info!("  Total:    {}", confirmation.display_total());
        info!("  Placed:   {}", confirmation.placed_at.to_rfc3339());
    }
    Ok(())
}
