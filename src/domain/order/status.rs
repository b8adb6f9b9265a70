//! Status presentation: label, color token and tracker step.

use super::OrderStatus;

/// Steps shown by the order tracker, in order.
pub const PROGRESS_STEPS: [&str; 4] = ["Placed", "Confirmed", "Shipped", "Delivered"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDisplay {
    pub label: &'static str,
    /// Design-system color token.
    pub color: &'static str,
    /// 1–4 along `PROGRESS_STEPS`; `None` off the happy path.
    pub step: Option<u8>,
}

impl StatusDisplay {
    /// Whether tracker step `n` (1-based) should render as reached.
    pub fn reached(&self, n: u8) -> bool {
        self.step.map(|s| n <= s).unwrap_or(false)
    }
}

const UNKNOWN: StatusDisplay = StatusDisplay {
    label: "Unknown",
    color: "gray",
    step: None,
};

impl OrderStatus {
    pub fn display(&self) -> StatusDisplay {
        match self {
            OrderStatus::Placed => StatusDisplay {
                label: "Order Placed",
                color: "blue",
                step: Some(1),
            },
            OrderStatus::Confirmed => StatusDisplay {
                label: "Confirmed",
                color: "indigo",
                step: Some(2),
            },
            OrderStatus::Shipped => StatusDisplay {
                label: "Shipped",
                color: "amber",
                step: Some(3),
            },
            OrderStatus::Delivered => StatusDisplay {
                label: "Delivered",
                color: "green",
                step: Some(4),
            },
            OrderStatus::Cancelled => StatusDisplay {
                label: "Cancelled",
                color: "red",
                step: None,
            },
            OrderStatus::Unknown(_) => UNKNOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_follow_progression() {
        let steps: Vec<_> = ["placed", "confirmed", "shipped", "delivered"]
            .iter()
            .map(|s| OrderStatus::parse(s).display().step)
            .collect();
        assert_eq!(steps, vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_unknown_status_degrades() {
        let status: OrderStatus = serde_json::from_str("\"returned_to_origin\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown("returned_to_origin".into()));
        let display = status.display();
        assert_eq!(display.label, "Unknown");
        assert!(!display.reached(1));
        // Round-trips verbatim.
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"returned_to_origin\"");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(OrderStatus::parse("SHIPPED"), OrderStatus::Shipped);
        assert_eq!(OrderStatus::parse("canceled"), OrderStatus::Cancelled);
    }

    #[test]
    fn test_reached() {
        let shipped = OrderStatus::Shipped.display();
        assert!(shipped.reached(1));
        assert!(shipped.reached(3));
        assert!(!shipped.reached(4));
        assert!(!OrderStatus::Cancelled.display().reached(1));
    }
}
