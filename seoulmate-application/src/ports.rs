use crate::{error::LedgerParseError, model::Ledger};

pub trait LedgerParser: Send + Sync {
    fn parse<'a>(&self, content: &'a str) -> Result<Ledger<'a>, LedgerParseError>;
}
