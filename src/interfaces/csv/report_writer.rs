use crate::domain::account::FundsAccount;
use crate::domain::identity::Identity;
use crate::domain::money::Balance;
use crate::domain::order::Order;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Serialize)]
struct OrderRow {
    id: u64,
    buyer: String,
    seller: String,
    amount: String,
    state: &'static str,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().0,
            buyer: order.buyer().to_string(),
            seller: order.seller().to_string(),
            amount: order.amount().to_string(),
            state: order.state().as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AccountRow {
    holder: String,
    balance: String,
}

#[derive(Debug, Serialize)]
struct SellerRow {
    seq: usize,
    seller: String,
}

/// Ledger-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub owner: String,
    pub balance: String,
    pub total_orders: u64,
    pub total_sellers: u64,
}

impl Summary {
    pub fn new(owner: &Identity, balance: Balance, total_orders: u64, total_sellers: u64) -> Self {
        Self {
            owner: owner.to_string(),
            balance: balance.to_string(),
            total_orders,
            total_sellers,
        }
    }
}

/// Writes ledger reports as CSV (one header row plus one row per record) or
/// as a pretty-printed JSON array.
pub struct ReportWriter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn write_orders(&mut self, orders: &[Order]) -> Result<()> {
        let rows: Vec<OrderRow> = orders.iter().map(OrderRow::from).collect();
        self.write_rows(&rows)
    }

    pub fn write_accounts(&mut self, accounts: &[FundsAccount]) -> Result<()> {
        let rows: Vec<AccountRow> = accounts
            .iter()
            .map(|a| AccountRow {
                holder: a.holder.to_string(),
                balance: a.balance.to_string(),
            })
            .collect();
        self.write_rows(&rows)
    }

    pub fn write_sellers(&mut self, sellers: &[Identity]) -> Result<()> {
        let rows: Vec<SellerRow> = sellers
            .iter()
            .enumerate()
            .map(|(seq, s)| SellerRow {
                seq,
                seller: s.to_string(),
            })
            .collect();
        self.write_rows(&rows)
    }

    pub fn write_summary(&mut self, summary: &Summary) -> Result<()> {
        self.write_rows(std::slice::from_ref(summary))
    }

    fn write_rows<T: Serialize>(&mut self, rows: &[T]) -> Result<()> {
        match self.format {
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut self.out);
                for row in rows {
                    writer.serialize(row)?;
                }
                writer.flush()?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.out, rows)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }
}
