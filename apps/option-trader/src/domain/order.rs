//! Order lifecycle value types and the tracked-order record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy to open or close.
    Buy,
    /// Sell to open or close.
    Sell,
}

impl OrderSide {
    /// The opposite side, used when pairing a closing order.
    #[must_use]
    pub const fn inverted(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// API token for this side.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a trade opens new exposure or closes existing exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionIntent {
    /// Opens or increases exposure.
    Open,
    /// Reduces or closes exposure.
    Close,
}

/// Classify the intent of a new order from its side and the signed
/// position currently held in the target symbol.
///
/// A buy against a net-short position, or a sell against a net-long
/// position, closes exposure; every other combination opens it.
#[must_use]
pub fn classify_intent(side: OrderSide, signed_position: Decimal) -> PositionIntent {
    match side {
        OrderSide::Buy if signed_position < Decimal::ZERO => PositionIntent::Close,
        OrderSide::Sell if signed_position > Decimal::ZERO => PositionIntent::Close,
        _ => PositionIntent::Open,
    }
}

/// Broker-reported order status, as the lower-case Alpaca tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order received and routed.
    New,
    /// Partially filled.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Done for the day.
    DoneForDay,
    /// Canceled.
    Canceled,
    /// Expired (e.g. day order at close).
    Expired,
    /// Replaced by a newer order.
    Replaced,
    /// Cancel request pending at the broker.
    PendingCancel,
    /// Replace request pending at the broker.
    PendingReplace,
    /// Accepted but not yet routed.
    Accepted,
    /// Submission pending at the broker.
    PendingNew,
    /// Rejected by the broker.
    Rejected,
    /// Any token this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// True if this status ends a monitoring session.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Filled | Self::Canceled | Self::Expired | Self::Rejected
        )
    }

    /// True if the broker will accept an in-place replace for an order in
    /// this status. Orders in any pending, freshly-accepted, or terminal
    /// state must go through cancel-and-replace instead.
    #[must_use]
    pub const fn is_replaceable_in_place(&self) -> bool {
        !matches!(
            self,
            Self::Accepted
                | Self::PendingNew
                | Self::PendingCancel
                | Self::PendingReplace
                | Self::Filled
                | Self::Canceled
                | Self::Expired
                | Self::Rejected
        )
    }

    /// Lower-case API token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::PartiallyFilled => "partially_filled",
            Self::Filled => "filled",
            Self::DoneForDay => "done_for_day",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
            Self::Replaced => "replaced",
            Self::PendingCancel => "pending_cancel",
            Self::PendingReplace => "pending_replace",
            Self::Accepted => "accepted",
            Self::PendingNew => "pending_new",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a lower-case broker token; unrecognized tokens map to
    /// [`OrderStatus::Unknown`] rather than an error.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token {
            "new" => Self::New,
            "partially_filled" => Self::PartiallyFilled,
            "filled" => Self::Filled,
            "done_for_day" => Self::DoneForDay,
            "canceled" => Self::Canceled,
            "expired" => Self::Expired,
            "replaced" => Self::Replaced,
            "pending_cancel" => Self::PendingCancel,
            "pending_replace" => Self::PendingReplace,
            "accepted" => Self::Accepted,
            "pending_new" => Self::PendingNew,
            "rejected" => Self::Rejected,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Order filled completely.
    Filled,
    /// Order canceled (by the broker or by the user).
    Canceled,
    /// Order expired.
    Expired,
    /// Order rejected by the broker.
    Rejected,
}

impl OrderOutcome {
    /// Map a terminal broker status to an outcome.
    #[must_use]
    pub const fn from_status(status: OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Filled => Some(Self::Filled),
            OrderStatus::Canceled => Some(Self::Canceled),
            OrderStatus::Expired => Some(Self::Expired),
            OrderStatus::Rejected => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filled => write!(f, "FILLED"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// The order record owned by one monitoring session.
///
/// Only the monitor loop mutates this: `order_id` is reassigned when a
/// cancel-and-replace produces a new broker-side id, and
/// `last_adjusted_at` resets on every successful adjust or replace.
#[derive(Debug, Clone)]
pub struct TrackedOrder {
    /// Current broker-side order id.
    pub order_id: String,
    /// OCC symbol being traded.
    pub symbol: String,
    /// Number of contracts.
    pub qty: u32,
    /// Buy or sell.
    pub side: OrderSide,
    /// Current limit price.
    pub limit_price: Decimal,
    /// Whether this order opens or closes exposure.
    pub intent: PositionIntent,
    /// When the order was placed (or adopted).
    pub created_at: DateTime<Utc>,
    /// When the order was last adjusted, if ever.
    pub last_adjusted_at: Option<DateTime<Utc>>,
}

impl TrackedOrder {
    /// Create a record for a freshly placed or adopted order.
    #[must_use]
    pub fn new(
        order_id: impl Into<String>,
        symbol: impl Into<String>,
        qty: u32,
        side: OrderSide,
        limit_price: Decimal,
        intent: PositionIntent,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            symbol: symbol.into(),
            qty,
            side,
            limit_price,
            intent,
            created_at: Utc::now(),
            last_adjusted_at: None,
        }
    }

    /// Record a successful adjust or replace.
    pub fn record_adjustment(&mut self, new_order_id: impl Into<String>, new_price: Decimal) {
        self.order_id = new_order_id.into();
        self.limit_price = new_price;
        self.last_adjusted_at = Some(Utc::now());
    }
}
