use crate::domain::operation::{Operation, OperationRecord};
use crate::error::Result;
use std::io::Read;

/// Reads ledger operations from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<Operation>`. It handles whitespace trimming and flexible record
/// lengths automatically, so admin rows may omit trailing columns.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates operations.
    ///
    /// A malformed row yields an `Err` for that row only; reading continues
    /// with the next one.
    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> {
        self.reader
            .into_deserialize::<OperationRecord>()
            .map(|result| -> Result<Operation> { Ok(Operation::try_from(result?)?) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{AccountId, Amount, AssetId};
    use crate::error::Error;

    const HEADER: &str = "type, caller, counterparty, amount, asset\n";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}add_asset, admin, , , T\ndeposit, u1, , 1000, T\ntransfer, u1, u2, 500, T"
        );
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<Operation>> = reader.operations().collect();

        assert_eq!(results.len(), 3);
        let deposit = results[1].as_ref().unwrap();
        assert_eq!(
            deposit,
            &Operation::Deposit {
                account: AccountId::new("u1").unwrap(),
                amount: Amount::new(1000),
                asset: AssetId::symbol("T").unwrap(),
            }
        );
    }

    #[test]
    fn test_reader_short_admin_rows() {
        let data = format!("{HEADER}transfer_admin, admin, u1\nremove_asset, admin, , , T");
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<Operation>> = reader.operations().collect();

        assert!(matches!(
            results[0],
            Ok(Operation::TransferAdministrator { .. })
        ));
        assert!(matches!(
            results[1],
            Ok(Operation::RemoveEligibleAsset { .. })
        ));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}invalid, u1, , 1, T\ndeposit, u1, , -5, T\ndeposit, u1, , , T");
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<Operation>> = reader.operations().collect();

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Err(Error::Csv(_))));
        assert!(matches!(results[1], Err(Error::Csv(_))));
        assert!(matches!(results[2], Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_reader_empty_caller() {
        let data = format!("{HEADER}deposit, , , 5, T");
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<Operation>> = reader.operations().collect();
        assert!(results[0].is_err());
    }
}
