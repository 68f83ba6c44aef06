//! Bid selection.

use openlease_types::{Fulfillment, FulfillmentState};

/// The cheapest OPEN fulfillment. Ties go to the first one in `bids`
/// (key order, i.e. provider-address order); no further tie-break applies.
///
/// `None` is the normal outcome for an order nobody has bid on yet.
#[must_use]
pub fn best_fulfillment(bids: &[Fulfillment]) -> Option<&Fulfillment> {
    bids.iter()
        .filter(|f| f.state == FulfillmentState::Open)
        .fold(None, |best: Option<&Fulfillment>, f| match best {
            Some(b) if b.price <= f.price => Some(b),
            _ => Some(f),
        })
}
