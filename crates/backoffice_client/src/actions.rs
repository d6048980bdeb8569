//! Typed calls for each console domain.
//!
//! Every action takes the caller's auth token and a cancellation token and
//! returns the parsed payload. Server side rules (bans, point ledger,
//! ranking, QR verification) are only triggered from here.

pub mod announcements;
pub mod artists;
pub mod charts;
pub mod points;
pub mod qr_codes;
pub mod rewards;
pub mod users;
