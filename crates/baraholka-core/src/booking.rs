//! # Booking State Machine
//!
//! Booking is an exclusivity claim by one non-owner phone on one item,
//! reversible by cancellation.
//!
//! ## States and Transitions
//! ```text
//! ┌─────────────┐      book(requester)       ┌─────────────┐
//! │  Available  │ ─────────────────────────► │   Booked    │
//! │ (no booker) │ ◄───────────────────────── │ (booked_by) │
//! └─────────────┘      cancel(requester)     └─────────────┘
//!
//!   book:   requester must NOT be the owner; item must be Available.
//!   cancel: requester must be the current booker OR the owner;
//!           cancelling an Available item is a no-op.
//! ```
//!
//! ## Who enforces what
//! These checks run at the command boundary against a snapshot of the item.
//! The storage layer additionally performs the transition as an atomic
//! conditional update, so a concurrent booker who passes the snapshot check
//! still loses cleanly with a conflict instead of overwriting.

use crate::error::{CoreError, CoreResult};
use crate::types::Item;

/// Booking state of an item, derived from `booked_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    /// No exclusivity claim; anyone but the owner may book.
    Available,
    /// Claimed by one phone; invisible to other non-owners in the feed.
    Booked,
}

/// Derives the booking state of an item.
#[inline]
pub fn booking_state(item: &Item) -> BookingState {
    if item.booked_by.is_some() {
        BookingState::Booked
    } else {
        BookingState::Available
    }
}

/// Authorizes a booking attempt against an item snapshot.
///
/// ## Errors
/// - `OwnBooking` when the requester owns the item
/// - `AlreadyBooked` when the item is not Available
pub fn authorize_book(item: &Item, requester_phone: &str) -> CoreResult<()> {
    if item.is_owned_by(requester_phone) {
        return Err(CoreError::OwnBooking {
            item_id: item.id.clone(),
        });
    }
    if booking_state(item) == BookingState::Booked {
        return Err(CoreError::AlreadyBooked {
            item_id: item.id.clone(),
        });
    }
    Ok(())
}

/// Outcome of an authorized cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The booking must be cleared in storage.
    ClearBooking,
    /// The item was already Available; nothing to change.
    NoOp,
}

/// Authorizes a cancellation attempt against an item snapshot.
///
/// Policy: the current booker or the item owner may cancel. Cancelling an
/// Available item succeeds without touching storage.
///
/// ## Errors
/// - `NotBooker` when the requester is neither booker nor owner
pub fn authorize_cancel(item: &Item, requester_phone: &str) -> CoreResult<CancelOutcome> {
    if booking_state(item) == BookingState::Available {
        return Ok(CancelOutcome::NoOp);
    }
    if item.is_booked_by(requester_phone) || item.is_owned_by(requester_phone) {
        return Ok(CancelOutcome::ClearBooking);
    }
    Err(CoreError::NotBooker {
        item_id: item.id.clone(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
