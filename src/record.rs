use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SheetError;
use crate::traits::{RawRow, Searchable};

/// One normalized sheet row.
///
/// Every field is always present; missing cells become empty strings.
/// `name` and `phone` mirror `customer_name` and `mobile` for clients that
/// still use the older field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub account: String,
    pub customer_name: String,
    pub address: String,
    pub mobile: String,
    pub contact_name: String,
    pub contact_mobile: String,
    pub area: String,
    pub purchase_date: String,
    pub product: String,
    pub brand: String,
    pub model: String,
    pub name: String,
    pub phone: String,
}

impl Record {
    /// Builds a record from positional cells (columns A..K).
    pub fn from_row(row: &[String]) -> Self {
        let cell = |index: usize| row.get(index).cloned().unwrap_or_default();

        let customer_name = cell(1);
        let mobile = cell(3);
        Self {
            account: cell(0),
            name: customer_name.clone(),
            customer_name,
            address: cell(2),
            phone: mobile.clone(),
            mobile,
            contact_name: cell(4),
            contact_mobile: cell(5),
            area: cell(6),
            purchase_date: cell(7),
            product: cell(8),
            brand: cell(9),
            model: cell(10),
        }
    }
}

impl Searchable for Record {
    fn field_value(&self, field: Field) -> &str {
        match field {
            Field::Account => &self.account,
            Field::CustomerName => &self.customer_name,
            Field::Address => &self.address,
            Field::Mobile => &self.mobile,
            Field::ContactName => &self.contact_name,
            Field::ContactMobile => &self.contact_mobile,
            Field::Area => &self.area,
            Field::PurchaseDate => &self.purchase_date,
            Field::Product => &self.product,
            Field::Brand => &self.brand,
            Field::Model => &self.model,
            Field::Name => &self.name,
            Field::Phone => &self.phone,
        }
    }
}

/// Named record fields, in column order, followed by the two aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Account,
    CustomerName,
    Address,
    Mobile,
    ContactName,
    ContactMobile,
    Area,
    PurchaseDate,
    Product,
    Brand,
    Model,
    Name,
    Phone,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Account,
        Field::CustomerName,
        Field::Address,
        Field::Mobile,
        Field::ContactName,
        Field::ContactMobile,
        Field::Area,
        Field::PurchaseDate,
        Field::Product,
        Field::Brand,
        Field::Model,
        Field::Name,
        Field::Phone,
    ];

    /// The eleven sheet columns without the aliases, which only repeat them.
    pub const COLUMNS: [Field; 11] = [
        Field::Account,
        Field::CustomerName,
        Field::Address,
        Field::Mobile,
        Field::ContactName,
        Field::ContactMobile,
        Field::Area,
        Field::PurchaseDate,
        Field::Product,
        Field::Brand,
        Field::Model,
    ];

    /// The wire name used by clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Account => "account",
            Field::CustomerName => "customerName",
            Field::Address => "address",
            Field::Mobile => "mobile",
            Field::ContactName => "contactName",
            Field::ContactMobile => "contactMobile",
            Field::Area => "area",
            Field::PurchaseDate => "purchaseDate",
            Field::Product => "product",
            Field::Brand => "brand",
            Field::Model => "model",
            Field::Name => "name",
            Field::Phone => "phone",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| SheetError::InvalidQuery(format!("unknown search field '{s}'")))
    }
}

/// Converts raw upstream rows into records.
///
/// Row 0 is the header row and is skipped. No data row is dropped, however sparse.
pub fn normalize(rows: &[RawRow]) -> Vec<Record> {
    rows.iter().skip(1).map(|row| Record::from_row(row)).collect()
}
