use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::snapshot::{BillOfLading, ExtractionData, Invoice, PackingList};

/// Maximum allowed absolute differences before a check flags.
///
/// Package count has no tolerance field — it is an exact integer identity.
#[derive(Debug, Clone, Copy)]
pub struct Tolerances {
    /// Per line item: `|quantity × unit_price − total_price|` (currency units,
    /// absorbs rounding).
    pub line_total: Decimal,
    /// `|Σ total_price − invoice total|` (currency units).
    pub invoice_total: Decimal,
    /// `|Σ quantity − packing-list units|` — tighter, this is a count.
    pub unit_count: Decimal,
    /// `|BOL weight − packing-list weight|` in kilograms.
    pub gross_weight_kg: Decimal,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            line_total: dec!(0.05),
            invoice_total: dec!(0.05),
            unit_count: dec!(0.01),
            gross_weight_kg: dec!(1.0),
        }
    }
}

/// Runs the fixed set of intra- and cross-document consistency checks.
///
/// `evaluate` is a pure function: no I/O, deterministic for identical input,
/// cannot fail. Inconsistency is data, not an error.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    pub tolerances: Tolerances,
}

/// Terminal outcome of one audit. Owns the snapshot it was computed from.
#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    pub data: ExtractionData,
    /// One human-readable message per failed check, in evaluation order.
    pub discrepancies: Vec<String>,
    pub passed: bool,
}

impl ReconciliationEngine {
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances }
    }

    /// Run every check in fixed order and collect all messages.
    ///
    /// Checks are independent: one failure never suppresses another, and an
    /// empty invoice is deliberately not special-cased — its sums are zero
    /// and the totals checks compare against that.
    pub fn evaluate(&self, data: &ExtractionData) -> Vec<String> {
        let mut discrepancies = Vec::new();
        self.check_line_item_math(&data.invoice, &mut discrepancies);
        self.check_invoice_sum(&data.invoice, &mut discrepancies);
        self.check_unit_counts(&data.invoice, &data.packing_list, &mut discrepancies);
        self.check_gross_weight(&data.bill_of_lading, &data.packing_list, &mut discrepancies);
        self.check_package_counts(&data.bill_of_lading, &data.packing_list, &mut discrepancies);
        discrepancies
    }

    /// Evaluate and bundle the snapshot with its outcome.
    pub fn audit(&self, data: ExtractionData) -> AuditResult {
        let discrepancies = self.evaluate(&data);
        AuditResult {
            passed: discrepancies.is_empty(),
            data,
            discrepancies,
        }
    }

    fn check_line_item_math(&self, invoice: &Invoice, out: &mut Vec<String>) {
        for item in &invoice.line_items {
            let computed = item.quantity * item.unit_price;
            if exceeds(computed, item.total_price, self.tolerances.line_total) {
                out.push(format!(
                    "Math Error in '{}': {} × {} = {:.2} but total shows {:.2}",
                    item.description,
                    item.quantity.normalize(),
                    item.unit_price.normalize(),
                    computed,
                    item.total_price,
                ));
            }
        }
    }

    fn check_invoice_sum(&self, invoice: &Invoice, out: &mut Vec<String>) {
        let sum: Decimal = invoice.line_items.iter().map(|i| i.total_price).sum();
        if exceeds(sum, invoice.total_amount, self.tolerances.invoice_total) {
            out.push(format!(
                "Invoice Mismatch: Line items sum to {:.2} but Total is {:.2}",
                sum, invoice.total_amount,
            ));
        }
    }

    fn check_unit_counts(&self, invoice: &Invoice, packing: &PackingList, out: &mut Vec<String>) {
        let units: Decimal = invoice.line_items.iter().map(|i| i.quantity).sum();
        if exceeds(units, packing.total_units_count, self.tolerances.unit_count) {
            out.push(format!(
                "Quantity Mismatch: Invoice has {} units, Packing List has {} units",
                units.normalize(),
                packing.total_units_count.normalize(),
            ));
        }
    }

    fn check_gross_weight(&self, bol: &BillOfLading, packing: &PackingList, out: &mut Vec<String>) {
        if exceeds(bol.gross_weight_kg, packing.gross_weight_kg, self.tolerances.gross_weight_kg) {
            out.push("Weight mismatch between Bill of Lading and Packing List".to_string());
        }
    }

    fn check_package_counts(
        &self,
        bol: &BillOfLading,
        packing: &PackingList,
        out: &mut Vec<String>,
    ) {
        if bol.package_count != packing.total_packages {
            out.push("Package count mismatch between Bill of Lading and Packing List".to_string());
        }
    }
}

/// Strict comparison: a difference of exactly the tolerance does not flag.
fn exceeds(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() > tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::LineItem;

    fn item(desc: &str, quantity: Decimal, unit_price: Decimal, total_price: Decimal) -> LineItem {
        LineItem {
            description: desc.to_string(),
            quantity,
            unit_price,
            total_price,
        }
    }

    /// Scenario A baseline: everything consistent.
    fn consistent_snapshot() -> ExtractionData {
        ExtractionData {
            invoice: Invoice {
                invoice_number: "INV-001".to_string(),
                currency: "USD".to_string(),
                total_amount: dec!(50.00),
                line_items: vec![item("Widgets", dec!(10), dec!(5.00), dec!(50.00))],
            },
            packing_list: PackingList {
                gross_weight_kg: dec!(120.5),
                total_packages: 4,
                total_units_count: dec!(10),
            },
            bill_of_lading: BillOfLading {
                gross_weight_kg: dec!(120.5),
                package_count: 4,
                bol_number: "BOL-77".to_string(),
            },
        }
    }

    #[test]
    fn consistent_snapshot_passes() {
        let result = ReconciliationEngine::default().audit(consistent_snapshot());
        assert!(result.passed);
        assert!(result.discrepancies.is_empty());
    }

    #[test]
    fn line_item_math_error_is_flagged() {
        // Scenario B: stated total disagrees with quantity × unit price.
        let mut data = consistent_snapshot();
        data.invoice.line_items[0].total_price = dec!(55.00);
        data.invoice.total_amount = dec!(55.00);
        data.packing_list.total_units_count = dec!(10);

        let errors = ReconciliationEngine::default().evaluate(&data);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            "Math Error in 'Widgets': 10 × 5 = 50.00 but total shows 55.00"
        );
    }

    #[test]
    fn invoice_sum_mismatch_is_flagged() {
        let mut data = consistent_snapshot();
        data.invoice.total_amount = dec!(60.00);

        let errors = ReconciliationEngine::default().evaluate(&data);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            "Invoice Mismatch: Line items sum to 50.00 but Total is 60.00"
        );
    }

    #[test]
    fn unit_count_mismatch_is_flagged() {
        // Scenario C: packing list says 8 units, invoice sums to 10.
        let mut data = consistent_snapshot();
        data.packing_list.total_units_count = dec!(8);

        let errors = ReconciliationEngine::default().evaluate(&data);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            "Quantity Mismatch: Invoice has 10 units, Packing List has 8 units"
        );
    }

    #[test]
    fn weight_mismatch_is_flagged() {
        let mut data = consistent_snapshot();
        data.bill_of_lading.gross_weight_kg = dec!(122.0);

        let errors = ReconciliationEngine::default().evaluate(&data);
        assert_eq!(
            errors,
            vec!["Weight mismatch between Bill of Lading and Packing List".to_string()]
        );
    }

    #[test]
    fn weight_within_one_kilogram_passes() {
        let mut data = consistent_snapshot();
        data.bill_of_lading.gross_weight_kg = dec!(121.5);
        assert!(ReconciliationEngine::default().evaluate(&data).is_empty());
    }

    #[test]
    fn package_count_requires_exact_equality() {
        let mut data = consistent_snapshot();
        data.bill_of_lading.package_count = 5;

        let errors = ReconciliationEngine::default().evaluate(&data);
        assert_eq!(
            errors,
            vec!["Package count mismatch between Bill of Lading and Packing List".to_string()]
        );
    }

    #[test]
    fn tolerance_boundary_is_strict() {
        // A difference of exactly 0.05 must not flag; just past it must.
        let mut data = consistent_snapshot();
        data.invoice.line_items[0].total_price = dec!(50.05);
        data.invoice.total_amount = dec!(50.05);
        assert!(ReconciliationEngine::default().evaluate(&data).is_empty());

        data.invoice.line_items[0].total_price = dec!(50.050001);
        data.invoice.total_amount = dec!(50.050001);
        let errors = ReconciliationEngine::default().evaluate(&data);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Math Error in 'Widgets'"));
    }

    #[test]
    fn unit_count_boundary_is_strict() {
        // Counts get the tightest tolerance: exactly 0.01 off must not flag.
        let mut data = consistent_snapshot();
        data.packing_list.total_units_count = dec!(10.01);
        assert!(ReconciliationEngine::default().evaluate(&data).is_empty());

        data.packing_list.total_units_count = dec!(10.010001);
        let errors = ReconciliationEngine::default().evaluate(&data);
        assert_eq!(
            errors,
            vec!["Quantity Mismatch: Invoice has 10 units, Packing List has 10.010001 units"
                .to_string()]
        );
    }

    #[test]
    fn empty_invoice_compares_zero_sums() {
        // Scenario D: no line items. Math check is vacuous; the sum checks
        // compare zero against the stated values.
        let mut data = consistent_snapshot();
        data.invoice.line_items.clear();
        data.invoice.total_amount = dec!(0);

        let errors = ReconciliationEngine::default().evaluate(&data);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            "Quantity Mismatch: Invoice has 0 units, Packing List has 10 units"
        );
    }

    #[test]
    fn all_failing_checks_accumulate_in_order() {
        let mut data = consistent_snapshot();
        data.invoice.line_items[0].total_price = dec!(55.00); // math + sum
        data.packing_list.total_units_count = dec!(8); // units
        data.bill_of_lading.gross_weight_kg = dec!(200.0); // weight
        data.bill_of_lading.package_count = 9; // packages

        let errors = ReconciliationEngine::default().evaluate(&data);
        assert_eq!(errors.len(), 5);
        assert!(errors[0].starts_with("Math Error"));
        assert!(errors[1].starts_with("Invoice Mismatch"));
        assert!(errors[2].starts_with("Quantity Mismatch"));
        assert!(errors[3].starts_with("Weight mismatch"));
        assert!(errors[4].starts_with("Package count mismatch"));
    }

    #[test]
    fn one_message_per_offending_line_item() {
        let mut data = consistent_snapshot();
        data.invoice.line_items = vec![
            item("Bolts", dec!(3), dec!(2.00), dec!(9.00)),
            item("Nuts", dec!(5), dec!(1.00), dec!(5.00)),
            item("Washers", dec!(2), dec!(4.00), dec!(10.00)),
        ];
        data.invoice.total_amount = dec!(24.00);
        data.packing_list.total_units_count = dec!(10);

        let errors = ReconciliationEngine::default().evaluate(&data);
        let math_errors: Vec<_> = errors.iter().filter(|e| e.starts_with("Math Error")).collect();
        assert_eq!(math_errors.len(), 2);
        assert!(math_errors[0].contains("'Bolts'"));
        assert!(math_errors[1].contains("'Washers'"));
    }

    #[test]
    fn evaluate_is_idempotent() {
        let mut data = consistent_snapshot();
        data.invoice.total_amount = dec!(49.00);
        data.bill_of_lading.package_count = 3;

        let engine = ReconciliationEngine::default();
        assert_eq!(engine.evaluate(&data), engine.evaluate(&data));
    }

    #[test]
    fn audit_result_owns_snapshot_and_derives_passed() {
        let engine = ReconciliationEngine::default();
        let result = engine.audit(consistent_snapshot());
        assert!(result.passed);
        assert_eq!(result.data.invoice.invoice_number, "INV-001");

        let mut bad = consistent_snapshot();
        bad.bill_of_lading.package_count = 1;
        let result = engine.audit(bad);
        assert!(!result.passed);
        assert_eq!(result.discrepancies.len(), 1);
    }

    #[test]
    fn custom_tolerances_are_honoured() {
        let mut data = consistent_snapshot();
        data.bill_of_lading.gross_weight_kg = dec!(125.0); // off by 4.5 kg

        let loose = ReconciliationEngine::new(Tolerances {
            gross_weight_kg: dec!(5.0),
            ..Tolerances::default()
        });
        assert!(loose.evaluate(&data).is_empty());
        assert_eq!(ReconciliationEngine::default().evaluate(&data).len(), 1);
    }
}
