use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of the commercial invoice's item table.
///
/// No invariant is enforced here — whether `quantity × unit_price` actually
/// equals `total_price` is exactly what the reconciliation engine checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Invoice {
    pub invoice_number: String,
    /// ISO currency code, e.g. "USD".
    pub currency: String,
    pub total_amount: Decimal,
    /// Document order. May be empty — an empty invoice is not special-cased.
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackingList {
    pub gross_weight_kg: Decimal,
    pub total_packages: u32,
    /// Fractional units are allowed (e.g. goods sold by weight).
    pub total_units_count: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillOfLading {
    pub gross_weight_kg: Decimal,
    pub package_count: u32,
    pub bol_number: String,
}

/// A fully extracted, already-typed snapshot of the three trade documents.
///
/// Produced once per audit request by the (external) extraction collaborator
/// and read-only thereafter. The engine makes no assumptions about extraction
/// confidence or provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionData {
    pub invoice: Invoice,
    pub packing_list: PackingList,
    pub bill_of_lading: BillOfLading,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

impl ExtractionData {
    /// Parse untrusted extractor output into the snapshot shape.
    ///
    /// The schema is strict: every field is required and unknown fields are
    /// rejected. A missing `total_amount` is a `SnapshotError`, never a zero
    /// flowing silently into the checks.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const VALID: &str = r#"{
        "invoice": {
            "invoice_number": "INV-001",
            "currency": "USD",
            "total_amount": 50.00,
            "line_items": [
                {"description": "Widgets", "quantity": 10, "unit_price": 5.00, "total_price": 50.00}
            ]
        },
        "packing_list": {"gross_weight_kg": 120.5, "total_packages": 4, "total_units_count": 10},
        "bill_of_lading": {"gross_weight_kg": 120.5, "package_count": 4, "bol_number": "BOL-77"}
    }"#;

    #[test]
    fn parses_well_formed_snapshot() {
        let data = ExtractionData::from_json(VALID).unwrap();
        assert_eq!(data.invoice.invoice_number, "INV-001");
        assert_eq!(data.invoice.line_items.len(), 1);
        assert_eq!(data.invoice.line_items[0].quantity, dec!(10));
        assert_eq!(data.packing_list.total_packages, 4);
        assert_eq!(data.bill_of_lading.bol_number, "BOL-77");
    }

    fn patched(f: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut v: serde_json::Value = serde_json::from_str(VALID).unwrap();
        f(&mut v);
        v.to_string()
    }

    #[test]
    fn decimal_fields_accept_string_values() {
        // Some extractors quote numerics — both forms must parse identically.
        let quoted = patched(|v| v["invoice"]["total_amount"] = "50.00".into());
        let data = ExtractionData::from_json(&quoted).unwrap();
        assert_eq!(data.invoice.total_amount, dec!(50.00));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let broken = patched(|v| {
            v["invoice"].as_object_mut().unwrap().remove("total_amount");
        });
        let err = ExtractionData::from_json(&broken).unwrap_err();
        assert!(matches!(err, SnapshotError::Shape(_)));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let extra = patched(|v| v["bill_of_lading"]["vessel"] = "MV Ever".into());
        assert!(ExtractionData::from_json(&extra).is_err());
    }

    #[test]
    fn empty_line_items_parse() {
        let empty = patched(|v| v["invoice"]["line_items"] = serde_json::json!([]));
        let data = ExtractionData::from_json(&empty).unwrap();
        assert!(data.invoice.line_items.is_empty());
    }

    #[test]
    fn garbage_is_a_shape_error() {
        assert!(matches!(
            ExtractionData::from_json("not json").unwrap_err(),
            SnapshotError::Shape(_)
        ));
    }

    #[test]
    fn serializes_back_to_same_shape() {
        let data = ExtractionData::from_json(VALID).unwrap();
        let json = serde_json::to_string(&data).unwrap();
        let round = ExtractionData::from_json(&json).unwrap();
        assert_eq!(round, data);
    }
}
