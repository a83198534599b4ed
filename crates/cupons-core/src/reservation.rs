//! # Reservation Rules
//!
//! Checks run before a reservation is written or redeemed. The database
//! still enforces one reservation per (coupon, resident) with a UNIQUE key;
//! these checks produce a readable error first.
//!
//! ```text
//!   reserve:  active? ──► in window today? ──► not yet reserved? ──► units left?
//!   redeem:   data_uso empty?
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};
use crate::types::{Coupon, Reservation};

/// Whether `coupon` can be reserved on `today`.
///
/// `reservation_count` is the number of reservations the coupon already has;
/// `already_reserved` whether the requesting resident holds one of them.
pub fn check_reservable(
    coupon: &Coupon,
    today: NaiveDate,
    reservation_count: i64,
    already_reserved: bool,
) -> CoreResult<()> {
    if !coupon.active {
        return Err(CoreError::CouponInactive(coupon.id.clone()));
    }

    if !coupon.window().contains(today) {
        return Err(CoreError::OutsideWindow {
            code: coupon.id.clone(),
            start: coupon.start_date.to_string(),
            end: coupon.end_date.to_string(),
        });
    }

    if already_reserved {
        return Err(CoreError::AlreadyReserved(coupon.id.clone()));
    }

    if let Some(total) = coupon.total_quantity {
        if reservation_count >= total {
            return Err(CoreError::SoldOut {
                code: coupon.id.clone(),
                total,
            });
        }
    }

    Ok(())
}

/// A reservation can be redeemed once.
pub fn check_redeemable(reservation: &Reservation) -> CoreResult<()> {
    match reservation.used_on {
        Some(used_on) => Err(CoreError::AlreadyRedeemed {
            id: reservation.id,
            used_on: used_on.to_string(),
        }),
        None => Ok(()),
    }
}
