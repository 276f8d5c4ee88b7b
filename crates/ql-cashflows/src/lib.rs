//! # ql-cashflows
//!
//! Cash flows, fixed and Ibor coupons, leg builders and leg analytics
//! (translates `ql/cashflows/`).
//!
//! Floating coupons can be valued against any forwarding curve through
//! [`CashFlow::amount_on`], which is how rate helpers value legs on a curve
//! that is still being bootstrapped.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `CashFlow` trait, `Leg` and `SimpleCashFlow`.
pub mod cashflow;

/// NPV and BPS of legs.
pub mod cashflows;

/// `Coupon` trait.
pub mod coupon;

/// Fixed-rate coupons and legs.
pub mod fixed_rate_coupon;

/// Ibor coupons and legs.
pub mod floating_rate_coupon;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use cashflow::{CashFlow, Leg, SimpleCashFlow};
pub use cashflows::BASIS_POINT;
pub use coupon::Coupon;
pub use fixed_rate_coupon::{FixedRateCoupon, FixedRateLegBuilder};
pub use floating_rate_coupon::{IborCoupon, IborLegBuilder};
