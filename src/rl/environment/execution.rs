//! Action to ledger translation
//!
//! Turns one sub-step's action into at most one ledger call. Buying closes
//! an open short before it opens a long, and selling closes an open long
//! before it opens a short, so inventory never sits on both sides. The fee
//! worsens the execution price against the agent and is only charged on
//! fills that reach the ledger.

use tracing::{debug, warn};

use crate::domain::{Order, Side};
use crate::ledger::PositionLedger;
use crate::rl::core::{Action, ActionEffect, StepAction, IDLE_REWARD};

/// Market context for one sub-step
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub symbol: &'a str,
    pub midpoint: f64,
    pub fee: f64,
    pub step: usize,
}

impl ExecutionContext<'_> {
    /// Price paid when buying
    pub fn buy_price(&self) -> f64 {
        self.midpoint * (1.0 + self.fee)
    }

    /// Price received when selling
    pub fn sell_price(&self) -> f64 {
        self.midpoint * (1.0 - self.fee)
    }
}

/// Apply an action to the ledger and return its reward contribution
pub fn execute_action<L>(ledger: &mut L, action: StepAction, ctx: &ExecutionContext<'_>) -> ActionEffect
where
    L: PositionLedger + ?Sized,
{
    match action {
        StepAction::Known(Action::Hold) => ActionEffect::applied(IDLE_REWARD),
        StepAction::Known(Action::Buy) => trade(ledger, Side::Long, ctx.buy_price(), ctx),
        StepAction::Known(Action::Sell) => trade(ledger, Side::Short, ctx.sell_price(), ctx),
        StepAction::Unknown(index) => {
            warn!(
                action = index,
                midpoint = ctx.midpoint,
                "unknown action, treating as no-op"
            );
            ActionEffect::invalid(format!("unknown action index {index}"))
        }
    }
}

/// Close the opposing side if it holds inventory, otherwise open `side`
fn trade<L>(ledger: &mut L, side: Side, price: f64, ctx: &ExecutionContext<'_>) -> ActionEffect
where
    L: PositionLedger + ?Sized,
{
    let opposing = side.opposite();
    let opposing_count = match opposing {
        Side::Long => ledger.long_inventory_count(),
        Side::Short => ledger.short_inventory_count(),
    };

    if opposing_count > 0 {
        let order = Order::for_side(opposing, ctx.symbol, price, ctx.step);
        ledger.remove(&order);
        return ActionEffect::applied(ledger.get_reward(opposing));
    }

    let order = Order::for_side(side, ctx.symbol, price, ctx.step);
    if ledger.add(&order) {
        ActionEffect::applied(0.0)
    } else {
        debug!(%side, price, step = ctx.step, "ledger refused order");
        ActionEffect::rejected(-IDLE_REWARD, format!("ledger refused {side} order at {price}"))
    }
}
