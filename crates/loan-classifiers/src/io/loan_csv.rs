//! Loan application CSV/TSV reader.
use std::path::Path;

use csv::StringRecord;

use crate::data_handling::RawLoanData;
use crate::error::{LoanError, Result};
use crate::schema::FEATURE_SCHEMA;

/// Cell contents treated as missing values.
const MISSING_TOKENS: [&str; 4] = ["", "na", "nan", "null"];

/// Read the dataset at `path`, resolving the target from `target_columns`.
///
/// The delimiter is a tab for `.tsv` files and a comma otherwise.
pub fn read_loan_dataset<P: AsRef<Path>>(path: P, target_columns: &[String]) -> Result<RawLoanData> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(LoanError::DatasetNotFound(path.to_path_buf()));
    }

    let delimiter = match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();

    let (target_idx, target_column) = target_columns
        .iter()
        .find_map(|name| find_column(&headers, name).map(|idx| (idx, name.clone())))
        .ok_or_else(|| LoanError::MissingTargetColumn {
            tried: target_columns.to_vec(),
        })?;

    let mut feature_idx = [0usize; 4];
    for (slot, name) in feature_idx.iter_mut().zip(FEATURE_SCHEMA.iter()) {
        *slot = find_column(&headers, name).ok_or_else(|| LoanError::MissingColumn(name.to_string()))?;
    }
    let [income_idx, loan_idx, credit_idx, self_emp_idx] = feature_idx;

    let mut data = RawLoanData {
        target_column,
        ..RawLoanData::default()
    };

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        // 1-based data row numbers, header excluded.
        let row = row_idx + 1;

        data.income.push(parse_numeric(&record, income_idx, FEATURE_SCHEMA[0], row)?);
        data.loan_amount.push(parse_numeric(&record, loan_idx, FEATURE_SCHEMA[1], row)?);
        data.credit_history.push(parse_numeric(&record, credit_idx, FEATURE_SCHEMA[2], row)?);
        data.self_employed.push(cell(&record, self_emp_idx).map(str::to_string));
        data.target.push(parse_target(&record, target_idx, &data.target_column, row)?);
    }

    if data.is_empty() {
        return Err(LoanError::EmptyDataset);
    }

    log::debug!(
        "Read {} rows from {} (target column '{}')",
        data.len(),
        path.display(),
        data.target_column
    );

    Ok(data)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    let value = record.get(idx)?.trim();
    if MISSING_TOKENS.iter().any(|t| value.eq_ignore_ascii_case(t)) {
        None
    } else {
        Some(value)
    }
}

/// Amounts must be finite and non-negative.
fn parse_numeric(record: &StringRecord, idx: usize, field: &str, row: usize) -> Result<Option<f64>> {
    let Some(value) = cell(record, idx) else {
        return Ok(None);
    };
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(LoanError::InvalidValue {
            field: field.to_string(),
            row,
            value: value.to_string(),
        }),
    }
}

fn parse_target(record: &StringRecord, idx: usize, field: &str, row: usize) -> Result<u8> {
    match cell(record, idx) {
        Some("Y") => Ok(1),
        Some("N") => Ok(0),
        other => Err(LoanError::InvalidValue {
            field: field.to_string(),
            row,
            value: other.unwrap_or("").to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn targets() -> Vec<String> {
        vec!["Loan_Status".to_string(), "Loan_Status (Approved)".to_string()]
    }

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_missing_cells_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "loans.csv",
            "Loan_ID,Self_Employed,ApplicantIncome,LoanAmount,Credit_History,Loan_Status\n\
             LP1,No,5849,,1,Y\n\
             LP2,,4583,128,NA,N\n",
        );
        let data = read_loan_dataset(&path, &targets()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.loan_amount, vec![None, Some(128.0)]);
        assert_eq!(data.credit_history, vec![Some(1.0), None]);
        assert_eq!(data.self_employed, vec![Some("No".to_string()), None]);
        assert_eq!(data.target, vec![1, 0]);
    }

    #[test]
    fn falls_back_to_alternate_target_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "loans.tsv",
            "ApplicantIncome\tLoanAmount\tCredit_History\tSelf_Employed\tLoan_Status (Approved)\n\
             3000\t66\t1\tYes\tY\n",
        );
        let data = read_loan_dataset(&path, &targets()).unwrap();
        assert_eq!(data.target_column, "Loan_Status (Approved)");
        assert_eq!(data.self_employed[0].as_deref(), Some("Yes"));
    }

    #[test]
    fn missing_target_column_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "loans.csv",
            "ApplicantIncome,LoanAmount,Credit_History,Self_Employed,Status\n3000,66,1,Yes,Y\n",
        );
        let err = read_loan_dataset(&path, &targets()).unwrap_err();
        assert!(matches!(err, LoanError::MissingTargetColumn { .. }));
    }

    #[test]
    fn missing_file_is_dataset_not_found() {
        let err = read_loan_dataset("/nonexistent/loans.csv", &targets()).unwrap_err();
        assert!(matches!(err, LoanError::DatasetNotFound(_)));
    }

    #[test]
    fn unknown_target_value_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "loans.csv",
            "ApplicantIncome,LoanAmount,Credit_History,Self_Employed,Loan_Status\n3000,66,1,Yes,Maybe\n",
        );
        match read_loan_dataset(&path, &targets()).unwrap_err() {
            LoanError::InvalidValue { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "Maybe");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn infinite_and_negative_amounts_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let header = "ApplicantIncome,LoanAmount,Credit_History,Self_Employed,Loan_Status\n";
        let cases = [
            ("inf.csv", "3000,66,1,Yes,Y\ninf,66,1,No,Y\n", "ApplicantIncome", 2, "inf"),
            ("neg.csv", "3000,-66,1,Yes,Y\n", "LoanAmount", 1, "-66"),
        ];
        for (name, rows, expected_field, expected_row, expected_value) in cases {
            let path = write(&dir, name, &format!("{}{}", header, rows));
            match read_loan_dataset(&path, &targets()).unwrap_err() {
                LoanError::InvalidValue { field, row, value } => {
                    assert_eq!(field, expected_field);
                    assert_eq!(row, expected_row);
                    assert_eq!(value, expected_value);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
