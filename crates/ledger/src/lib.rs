//! `scantally-ledger` — the authoritative barcode→quantity mapping.

pub mod tally;

pub use tally::{
    StockItem, TallyCommand, TallyEvent, TallyLedger, TallyLedgerId,
};
