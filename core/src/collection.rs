//! The fixed set of synced collections.
//!
//! Every cache key and remote path is derived through this enum, so the
//! adapters and the coordinator can never disagree on collection naming.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A data collection tracked by the sync layer.
///
/// The set is closed: adding a collection means adding a variant here,
/// which forces every match over collections to handle it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    /// Logged expenses
    Expenses,
    /// Invoices issued to customers
    InvoicesIssued,
    /// Invoices received from suppliers
    InvoicesReceived,
    /// Budget lines
    Budgets,
}

impl Collection {
    /// All collections, in declaration order.
    pub const ALL: [Collection; 4] = [
        Collection::Expenses,
        Collection::InvoicesIssued,
        Collection::InvoicesReceived,
        Collection::Budgets,
    ];

    /// The segment used in remote paths and serialized forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Expenses => "expenses",
            Collection::InvoicesIssued => "invoicesIssued",
            Collection::InvoicesReceived => "invoicesReceived",
            Collection::Budgets => "budgets",
        }
    }

    /// The base cache key for this collection, before tenant suffixing.
    pub fn base_key(&self) -> &'static str {
        match self {
            Collection::Expenses => "upsen_expenses",
            Collection::InvoicesIssued => "upsen_invoicesIssued",
            Collection::InvoicesReceived => "upsen_invoicesReceived",
            Collection::Budgets => "upsen_budgets",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "expenses" => Ok(Collection::Expenses),
            "invoicesIssued" => Ok(Collection::InvoicesIssued),
            "invoicesReceived" => Ok(Collection::InvoicesReceived),
            "budgets" => Ok(Collection::Budgets),
            other => Err(Error::UnknownCollection(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_collection_once() {
        assert_eq!(Collection::ALL.len(), 4);
        for (i, a) in Collection::ALL.iter().enumerate() {
            for b in &Collection::ALL[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn segment_and_base_key_agree() {
        for collection in Collection::ALL {
            let base = collection.base_key();
            assert_eq!(base, format!("upsen_{}", collection.as_str()));
        }
    }

    #[test]
    fn parse_roundtrip() {
        for collection in Collection::ALL {
            let parsed: Collection = collection.as_str().parse().unwrap();
            assert_eq!(parsed, collection);
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "payroll".parse::<Collection>().unwrap_err();
        assert_eq!(err, Error::UnknownCollection("payroll".to_string()));

        // The match is exact, not case-folded.
        assert!("Expenses".parse::<Collection>().is_err());
        assert!("invoicesissued".parse::<Collection>().is_err());
    }

    #[test]
    fn serialization_format() {
        let json = serde_json::to_string(&Collection::InvoicesIssued).unwrap();
        assert_eq!(json, "\"invoicesIssued\"");

        let parsed: Collection = serde_json::from_str("\"budgets\"").unwrap();
        assert_eq!(parsed, Collection::Budgets);
    }
}
