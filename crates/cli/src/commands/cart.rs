//! Cart editing commands.

use ecofinds_cart::{CartError, CartSnapshot, Catalog};
use ecofinds_core::ProductId;
use tracing::{info, warn};

use super::Session;

/// Show the cart and its totals.
///
/// # Errors
///
/// Returns an error if rendering fails.
pub async fn show(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    session.render().await
}

/// Change the quantity of a line and show the result.
///
/// # Errors
///
/// Returns an error if the backend rejects the change or rendering fails.
pub async fn update(
    session: &Session,
    id: ProductId,
    quantity: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(%id, quantity, "Updating quantity");
    let result = session.ledger.update_quantity(id, quantity).await;
    finish(session, result).await
}

/// Remove a line and show the result.
///
/// # Errors
///
/// Returns an error if the backend rejects the removal or rendering fails.
pub async fn remove(session: &Session, id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    info!(%id, "Removing item");
    let result = session.ledger.remove_item(id).await;
    finish(session, result).await
}

/// Add a catalog product and show the result.
///
/// # Errors
///
/// Returns an error if the product is not in the catalog, the line is
/// invalid, or rendering fails.
pub async fn add(
    session: &Session,
    id: ProductId,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::standard();
    let product = catalog
        .find(id)
        .ok_or_else(|| format!("product {id} is not in the catalog"))?;
    let item = product.to_line(quantity)?;
    info!(%id, name = %product.name, price = %product.price, quantity, "Adding item");
    let result = session.ledger.add_item(item).await;
    finish(session, result).await
}

/// Run overlapping edits against the cart while logging every state change.
///
/// Updates one row and removes another concurrently, retries the busy row
/// before its update settles, and submits an invalid quantity.
///
/// # Errors
///
/// Returns an error if a backend call fails or rendering fails.
pub async fn demo(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = &session.ledger;
    let mut updates = ledger.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            log_state(&snapshot);
        }
    });

    let initial = ledger.snapshot().await;
    log_state(&initial);

    let mut ids = initial.lines.iter().map(|line| line.item.id());
    let (Some(first), Some(second)) = (ids.next(), ids.next()) else {
        watcher.abort();
        warn!("Demo needs at least two cart lines");
        return session.render().await;
    };
    let second_quantity = initial
        .line(second)
        .map_or(1, |line| i64::from(line.item.quantity()));

    let (updated, removed, retried) = tokio::join!(
        ledger.update_quantity(second, second_quantity + 1),
        ledger.remove_item(first),
        async {
            tokio::task::yield_now().await;
            ledger.update_quantity(second, second_quantity + 2).await
        },
    );
    report("update", updated)?;
    report("remove", removed)?;
    report("retry while busy", retried)?;

    report("zero quantity", ledger.update_quantity(second, 0).await)?;

    watcher.abort();
    session.render().await
}

async fn finish(
    session: &Session,
    result: Result<CartSnapshot, CartError>,
) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(_) => session.render().await,
        Err(e) if e.is_benign() => {
            warn!("Ignored: {e}");
            session.render().await
        }
        Err(e) => {
            session.render().await?;
            Err(e.into())
        }
    }
}

fn report(label: &str, result: Result<CartSnapshot, CartError>) -> Result<(), CartError> {
    match result {
        Ok(snapshot) => {
            info!(label, total = %snapshot.totals.rounded_total(), "Settled");
            Ok(())
        }
        Err(e) if e.is_benign() => {
            info!(label, "Ignored: {e}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn log_state(snapshot: &CartSnapshot) {
    info!(
        lines = snapshot.len(),
        items = snapshot.totals.item_count,
        quantity_pending = ?snapshot.pending_quantity_ids(),
        removal_pending = ?snapshot.pending_removal_ids(),
        total = %snapshot.totals.rounded_total(),
        "Cart changed"
    );
}
