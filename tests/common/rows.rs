use sheet_search_cache::RawRow;

/// Header row as it appears in the upstream sheet
pub fn header_row() -> RawRow {
    [
        "Account", "Customer Name", "Address", "Mobile", "C/O", "C/O Mobile", "Area",
        "Purchase Date", "Product", "Brand", "Model", "Notes",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

/// A complete data row for customer `i`
pub fn customer_row(i: usize, name: &str, area: &str) -> RawRow {
    vec![
        format!("ACC-{i:04}"),
        name.to_string(),
        format!("{i} Market Road"),
        format!("07{i:08}"),
        "Contact".to_string(),
        "0700000000".to_string(),
        area.to_string(),
        "2024-03-01".to_string(),
        "Refrigerator".to_string(),
        "Acme".to_string(),
        format!("RX-{i}"),
    ]
}

/// Header plus `n` customers; every third one lives in "Westlands"
pub fn sheet_with(n: usize) -> Vec<RawRow> {
    let mut rows = vec![header_row()];
    rows.extend((0..n).map(|i| {
        let area = if i % 3 == 0 { "Westlands" } else { "Kilimani" };
        customer_row(i, &format!("Customer {i}"), area)
    }));
    rows
}
