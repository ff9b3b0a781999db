use crate::application::operation::Operation;
use crate::domain::identity::Identity;
use crate::domain::order::OrderId;
use crate::error::{EscrowError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Register,
    Create,
    Confirm,
    Delete,
    AskRefund,
    Refund,
}

/// One row of the command file: `op, caller, counterparty, order, amount`.
///
/// Which of the optional columns are required depends on `op`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub op: CommandKind,
    pub caller: Identity,
    pub counterparty: Option<Identity>,
    pub order: Option<u64>,
    /// Parsed from the column text so no digits are lost to float inference.
    #[serde(default, deserialize_with = "rust_decimal::serde::str_option::deserialize")]
    pub amount: Option<Decimal>,
}

impl Command {
    fn require<T>(value: Option<T>, column: &str, op: CommandKind) -> Result<T> {
        value.ok_or_else(|| {
            EscrowError::MalformedCommand(format!("{op:?} requires a value in column `{column}`"))
        })
    }

    fn order_id(&self) -> Result<OrderId> {
        Self::require(self.order, "order", self.op).map(OrderId)
    }

    /// Validates the columns required by `op` and builds the engine operation.
    pub fn into_operation(self) -> Result<Operation> {
        let caller = self.caller.clone();
        let op = match self.op {
            CommandKind::Register => Operation::RegisterSeller { caller },
            CommandKind::Create => Operation::CreateOrder {
                caller,
                seller: Self::require(self.counterparty, "counterparty", self.op)?,
                amount: Self::require(self.amount, "amount", self.op)?,
            },
            CommandKind::Confirm => Operation::ConfirmOrder {
                caller,
                order: self.order_id()?,
            },
            CommandKind::Delete => Operation::DeleteOrder {
                caller,
                order: self.order_id()?,
            },
            CommandKind::AskRefund => Operation::AskRefund {
                caller,
                order: self.order_id()?,
            },
            CommandKind::Refund => Operation::RefundBuyer {
                caller,
                order: self.order_id()?,
                sent: Self::require(self.amount, "amount", self.op)?,
            },
        };
        Ok(op)
    }
}

/// Reads escrow commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Command>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EscrowError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "op, caller, counterparty, order, amount\n";

    fn read(rows: &str) -> Vec<Result<Command>> {
        let data = format!("{HEADER}{rows}");
        CommandReader::new(data.as_bytes()).commands().collect()
    }

    #[test]
    fn test_reader_valid_stream() {
        let results = read("register, 0xs1, , , \ncreate, 0xb1, 0xs1, , 0.1\nrefund, 0xs1, , 0, 0.1");
        assert_eq!(results.len(), 3);

        let register = results[0].as_ref().unwrap();
        assert_eq!(register.op, CommandKind::Register);
        assert_eq!(register.counterparty, None);
        assert_eq!(register.amount, None);

        let create = results[1].as_ref().unwrap();
        assert_eq!(create.counterparty, Some(Identity::from("0xs1")));
        assert_eq!(create.amount, Some(dec!(0.1)));

        let refund = results[2].as_ref().unwrap();
        assert_eq!(refund.op, CommandKind::Refund);
        assert_eq!(refund.order, Some(0));
    }

    #[test]
    fn test_reader_keeps_every_amount_digit() {
        let results = read(
            "create, b1, s1, , 0.123456789012345678\ncreate, b1, s1, , 12345678901234567.25\nrefund, s1, , 0, 0.30",
        );
        assert_eq!(
            results[0].as_ref().unwrap().amount,
            Some(dec!(0.123456789012345678))
        );
        assert_eq!(
            results[1].as_ref().unwrap().amount,
            Some(dec!(12345678901234567.25))
        );
        assert_eq!(results[2].as_ref().unwrap().amount, Some(dec!(0.30)));
    }

    #[test]
    fn test_reader_rejects_non_numeric_amount() {
        let results = read("create, b1, s1, , 1.2.3");
        assert!(matches!(results[0], Err(EscrowError::CsvError(_))));
    }

    #[test]
    fn test_reader_short_rows_are_accepted() {
        let results = read("register, 0xs1\nask_refund, 0xb1, , 3");
        let ask = results[1].as_ref().unwrap();
        assert_eq!(ask.op, CommandKind::AskRefund);
        assert_eq!(ask.order, Some(3));
        assert_eq!(ask.amount, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let results = read("withdraw, 0xb1, , 1, 1.0\nconfirm, 0xb1, , abc, ");
        assert!(results[0].is_err());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_into_operation() {
        let results = read("create, 0xb1, 0xs1, , 0.2\nconfirm, 0xb1, , 4, ");
        let create = results[0].as_ref().unwrap().clone().into_operation().unwrap();
        assert_eq!(
            create,
            Operation::CreateOrder {
                caller: Identity::from("0xb1"),
                seller: Identity::from("0xs1"),
                amount: dec!(0.2),
            }
        );
        let confirm = results[1].as_ref().unwrap().clone().into_operation().unwrap();
        assert_eq!(
            confirm,
            Operation::ConfirmOrder {
                caller: Identity::from("0xb1"),
                order: OrderId(4),
            }
        );
    }

    #[test]
    fn test_into_operation_missing_columns() {
        let results = read("create, 0xb1, , , 0.2\nrefund, 0xs1, , 1, \ndelete, 0xs1, , , ");
        for result in results {
            let err = result.unwrap().into_operation().unwrap_err();
            assert!(matches!(err, EscrowError::MalformedCommand(_)));
        }
    }
}
