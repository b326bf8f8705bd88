//! The journal-ledger column schema.

use std::fmt;

/// Number of columns in a ledger row.
pub const COLUMN_COUNT: usize = 44;

/// A ledger column, in header order.
///
/// The discriminant is the column's position in the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    TransactionDate,
    VoucherNumber,
    EvidenceNumber,
    DebitAccountCode,
    DebitAccountName,
    DebitSubAccountCode,
    DebitSubAccountName,
    DebitDepartmentCode,
    DebitDepartmentName,
    DebitTaxCategory,
    DebitBusinessCategory,
    DebitTaxAutoCalculated,
    DebitReducedRate,
    DebitTaxRate,
    DebitDeductionRatio,
    DebitAmount,
    DebitConsumptionTax,
    DebitAmountExcludingTax,
    CreditAccountCode,
    CreditAccountName,
    CreditSubAccountCode,
    CreditSubAccountName,
    CreditDepartmentCode,
    CreditDepartmentName,
    CreditTaxCategory,
    CreditBusinessCategory,
    CreditTaxAutoCalculated,
    CreditReducedRate,
    CreditTaxRate,
    CreditDeductionRatio,
    CreditAmount,
    CreditConsumptionTax,
    CreditAmountExcludingTax,
    CounterpartyCode,
    CounterpartyName,
    CounterpartyRegistrationNumber,
    LedgerMemo,
    PurchaseDateDisplay,
    PurchaseDate1,
    PurchaseDate2,
    CashFlowCode,
    CashFlowName,
    BreakdownCode,
    BreakdownName,
}

impl Column {
    /// Every column in header order.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::TransactionDate,
        Column::VoucherNumber,
        Column::EvidenceNumber,
        Column::DebitAccountCode,
        Column::DebitAccountName,
        Column::DebitSubAccountCode,
        Column::DebitSubAccountName,
        Column::DebitDepartmentCode,
        Column::DebitDepartmentName,
        Column::DebitTaxCategory,
        Column::DebitBusinessCategory,
        Column::DebitTaxAutoCalculated,
        Column::DebitReducedRate,
        Column::DebitTaxRate,
        Column::DebitDeductionRatio,
        Column::DebitAmount,
        Column::DebitConsumptionTax,
        Column::DebitAmountExcludingTax,
        Column::CreditAccountCode,
        Column::CreditAccountName,
        Column::CreditSubAccountCode,
        Column::CreditSubAccountName,
        Column::CreditDepartmentCode,
        Column::CreditDepartmentName,
        Column::CreditTaxCategory,
        Column::CreditBusinessCategory,
        Column::CreditTaxAutoCalculated,
        Column::CreditReducedRate,
        Column::CreditTaxRate,
        Column::CreditDeductionRatio,
        Column::CreditAmount,
        Column::CreditConsumptionTax,
        Column::CreditAmountExcludingTax,
        Column::CounterpartyCode,
        Column::CounterpartyName,
        Column::CounterpartyRegistrationNumber,
        Column::LedgerMemo,
        Column::PurchaseDateDisplay,
        Column::PurchaseDate1,
        Column::PurchaseDate2,
        Column::CashFlowCode,
        Column::CashFlowName,
        Column::BreakdownCode,
        Column::BreakdownName,
    ];

    /// Position of the column in a row.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header label, as written to the CSV.
    pub fn label(self) -> &'static str {
        match self {
            Column::TransactionDate => "月日",
            Column::VoucherNumber => "伝票番号",
            Column::EvidenceNumber => "証憑番号",
            Column::DebitAccountCode => "借方科目コード",
            Column::DebitAccountName => "借方科目名",
            Column::DebitSubAccountCode => "借方補助コード",
            Column::DebitSubAccountName => "借方口座名",
            Column::DebitDepartmentCode => "借方部門コード",
            Column::DebitDepartmentName => "借方部門名",
            Column::DebitTaxCategory => "借方課税区分",
            Column::DebitBusinessCategory => "借方事業区分",
            Column::DebitTaxAutoCalculated => "借方消費税額自動計算か否か",
            Column::DebitReducedRate => "借方軽減税率か否か",
            Column::DebitTaxRate => "借方税率",
            Column::DebitDeductionRatio => "借方控除割合",
            Column::DebitAmount => "借方取引金額",
            Column::DebitConsumptionTax => "借方消費税等",
            Column::DebitAmountExcludingTax => "借方税抜き金額",
            Column::CreditAccountCode => "貸方科目コード",
            Column::CreditAccountName => "貸方科目名",
            Column::CreditSubAccountCode => "貸方補助コード",
            Column::CreditSubAccountName => "貸方口座名",
            Column::CreditDepartmentCode => "貸方部門コード",
            Column::CreditDepartmentName => "貸方部門名",
            Column::CreditTaxCategory => "貸方課税区分",
            Column::CreditBusinessCategory => "貸方事業区分",
            Column::CreditTaxAutoCalculated => "貸方消費税額自動計算か否か",
            Column::CreditReducedRate => "貸方軽減税率か否か",
            Column::CreditTaxRate => "貸方税率",
            Column::CreditDeductionRatio => "貸方控除割合",
            Column::CreditAmount => "貸方取引金額",
            Column::CreditConsumptionTax => "貸方消費税等",
            Column::CreditAmountExcludingTax => "貸方税抜き金額",
            Column::CounterpartyCode => "取引先コード",
            Column::CounterpartyName => "取引先名",
            Column::CounterpartyRegistrationNumber => "取引先の事業者登録番号",
            Column::LedgerMemo => "元帳摘要",
            Column::PurchaseDateDisplay => "実際の仕入れ年月日表示区分",
            Column::PurchaseDate1 => "実際の仕入れ年月日１",
            Column::PurchaseDate2 => "実際の仕入れ年月日２",
            Column::CashFlowCode => "収支区分コード",
            Column::CashFlowName => "収支区分名",
            Column::BreakdownCode => "内訳区分コード",
            Column::BreakdownName => "内訳区分名",
        }
    }

    /// The header row.
    pub fn header() -> [&'static str; COLUMN_COUNT] {
        Column::ALL.map(Column::label)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_all_in_index_order() {
        assert_eq!(Column::ALL.len(), COLUMN_COUNT);
        for (i, column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.index(), i);
        }
    }

    #[test]
    fn test_labels_unique() {
        let labels: HashSet<&str> = Column::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels.len(), COLUMN_COUNT);
    }

    #[test]
    fn test_populated_columns() {
        assert_eq!(Column::TransactionDate.index(), 0);
        assert_eq!(Column::TransactionDate.label(), "月日");
        assert_eq!(Column::DebitAmount.index(), 15);
        assert_eq!(Column::DebitAmount.label(), "借方取引金額");
        assert_eq!(Column::CounterpartyName.index(), 34);
        assert_eq!(Column::CounterpartyName.label(), "取引先名");
    }

    #[test]
    fn test_header_edges() {
        let header = Column::header();
        assert_eq!(header[0], "月日");
        assert_eq!(header[33], "取引先コード");
        assert_eq!(header[COLUMN_COUNT - 1], "内訳区分名");
    }
}
