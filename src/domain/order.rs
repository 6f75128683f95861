use serde::{Deserialize, Serialize};

/// Inventory side held by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// Execution details shared by every order kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Instrument symbol (e.g., "ETH-USD")
    pub symbol: String,
    /// Fee-adjusted execution price
    pub price: f64,
    /// Snapshot index the order was generated at
    pub step: usize,
}

/// Order sent to the position ledger
///
/// Orders are ephemeral: the environment builds one per ledger call and
/// drops it once the call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Order {
    /// Opens or closes long inventory
    Long(Fill),
    /// Opens or closes short inventory
    Short(Fill),
    /// Force-closes all inventory on both sides
    Liquidation(Fill),
}

impl Order {
    pub fn long(symbol: &str, price: f64, step: usize) -> Self {
        Order::Long(Fill {
            symbol: symbol.to_string(),
            price,
            step,
        })
    }

    pub fn short(symbol: &str, price: f64, step: usize) -> Self {
        Order::Short(Fill {
            symbol: symbol.to_string(),
            price,
            step,
        })
    }

    pub fn liquidation(symbol: &str, price: f64, step: usize) -> Self {
        Order::Liquidation(Fill {
            symbol: symbol.to_string(),
            price,
            step,
        })
    }

    /// Build a sided order
    pub fn for_side(side: Side, symbol: &str, price: f64, step: usize) -> Self {
        match side {
            Side::Long => Self::long(symbol, price, step),
            Side::Short => Self::short(symbol, price, step),
        }
    }

    /// Inventory side this order touches, `None` for liquidations
    pub fn side(&self) -> Option<Side> {
        match self {
            Order::Long(_) => Some(Side::Long),
            Order::Short(_) => Some(Side::Short),
            Order::Liquidation(_) => None,
        }
    }

    pub fn fill(&self) -> &Fill {
        match self {
            Order::Long(fill) | Order::Short(fill) | Order::Liquidation(fill) => fill,
        }
    }

    pub fn price(&self) -> f64 {
        self.fill().price
    }

    pub fn step(&self) -> usize {
        self.fill().step
    }
}
