//! Trading and liquidity-provider bots
//!
//! Bots own a wallet and act on a [`Pool`] through its public operations
//! only. Wallet updates happen after the pool call succeeds, so a rejected
//! call leaves the bot untouched too.

use adaptive_amm::{mul_div, AmmError, Asset, Deposit, Pool, ReservePair, Withdrawal, PRECISION};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BotError {
    #[error("Pool rejected the call: {0}")]
    Pool(#[from] AmmError),

    #[error("Wallet holds {held} of {asset}, needs {needed}")]
    InsufficientBalance {
        asset: Asset,
        needed: u128,
        held: u128,
    },
}

/// Uniformly random share of `amount` in the open interval `(0, 1)`
pub fn less<R: Rng>(rng: &mut R, amount: u128) -> Result<u128, AmmError> {
    let fraction = rng.gen_range(1..PRECISION);
    mul_div(amount, fraction, PRECISION)
}

/// One committed trade as seen by the trader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trade {
    pub bid: Asset,
    pub ask: Asset,
    pub bid_amount: u128,
    pub ask_amount: u128,
}

/// Random-walk trader
#[derive(Debug, Clone)]
pub struct SwapBot {
    wallet: ReservePair,
    history: Vec<ReservePair>,
}

impl SwapBot {
    pub fn new(a: u128, b: u128) -> Self {
        let wallet = ReservePair::new(a, b);
        Self {
            wallet,
            history: vec![wallet],
        }
    }

    pub fn wallet(&self) -> ReservePair {
        self.wallet
    }

    /// Wallet after every committed trade, genesis first
    pub fn history(&self) -> &[ReservePair] {
        &self.history
    }

    /// Trade a random share of one holding
    ///
    /// `market_trend` is the probability of selling B for A. Returns
    /// `Ok(None)` when the drawn amount rounds to zero.
    pub fn swap<R: Rng>(
        &mut self,
        pool: &mut Pool,
        rng: &mut R,
        market_trend: f64,
    ) -> Result<Option<Trade>, BotError> {
        let bid = if rng.gen::<f64>() >= market_trend {
            Asset::A
        } else {
            Asset::B
        };
        let ask = bid.opposite();

        let bid_amount = less(rng, self.wallet[bid])?;
        if bid_amount == 0 {
            trace!(%bid, "drawn amount rounds to zero, skipping");
            return Ok(None);
        }

        let ask_amount = pool.swap(bid_amount, bid, ask)?;
        self.wallet[bid] -= bid_amount;
        self.wallet[ask] = self.wallet[ask].saturating_add(ask_amount);
        self.history.push(self.wallet);

        debug!(%bid, %ask, bid_amount = %bid_amount, ask_amount = %ask_amount, "trade");
        Ok(Some(Trade {
            bid,
            ask,
            bid_amount,
            ask_amount,
        }))
    }
}

/// Liquidity provider that deposits at the pool ratio and exits in full
#[derive(Debug, Clone)]
pub struct LpBot {
    wallet: ReservePair,
    lpt: u128,
}

impl LpBot {
    pub fn new(a: u128, b: u128) -> Self {
        Self {
            wallet: ReservePair::new(a, b),
            lpt: 0,
        }
    }

    pub fn wallet(&self) -> ReservePair {
        self.wallet
    }

    pub fn lpt(&self) -> u128 {
        self.lpt
    }

    /// Deposit a random share of A plus the matching B at spot
    pub fn deposit<R: Rng>(
        &mut self,
        pool: &mut Pool,
        rng: &mut R,
    ) -> Result<Option<Deposit>, BotError> {
        let a = less(rng, self.wallet.a)?;
        if a == 0 {
            return Ok(None);
        }
        let reserves = pool.reserves();
        let b = mul_div(reserves.b, a, reserves.a)?;
        if b > self.wallet.b {
            return Err(BotError::InsufficientBalance {
                asset: Asset::B,
                needed: b,
                held: self.wallet.b,
            });
        }

        let deposit = pool.deposit(a, b)?;
        self.wallet.a -= a;
        self.wallet.b -= b;
        self.lpt += deposit.lpt;

        debug!(a = %a, b = %b, lpt = %deposit.lpt, "lp deposit");
        Ok(Some(deposit))
    }

    /// Redeem every liquidity unit held
    pub fn withdraw(&mut self, pool: &mut Pool) -> Result<Option<Withdrawal>, BotError> {
        if self.lpt == 0 {
            return Ok(None);
        }
        let withdrawal = pool.withdraw(self.lpt)?;
        self.wallet.a = self.wallet.a.saturating_add(withdrawal.a);
        self.wallet.b = self.wallet.b.saturating_add(withdrawal.b);

        debug!(lpt = %self.lpt, a = %withdrawal.a, b = %withdrawal.b, "lp withdraw");
        self.lpt = 0;
        Ok(Some(withdrawal))
    }
}
