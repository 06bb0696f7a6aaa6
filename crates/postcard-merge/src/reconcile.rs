//! Reconciliation - finding UPRNs that never made it into a sheet
//!
//! The size-4 grouping drops any trailing remainder of a batch, so a
//! separate pass diffs the persisted address-sheet filenames against the
//! expected UPRN list. Pure set difference; the sheet filenames are the
//! only record of what was processed.

use postcard_render::{SheetSide, Uprn, parse_sheet_filename};
use std::collections::HashSet;
use std::path::Path;

use crate::types::Result;

/// Every UPRN named by an address sheet in the output directory.
pub fn processed_uprns(out_dir: &Path) -> Result<HashSet<Uprn>> {
    let mut processed = HashSet::new();
    for entry in std::fs::read_dir(out_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // Each group produces one address and one calendar sheet with the
        // same UPRNs, so scanning one side is enough
        if let Some((uprns, SheetSide::Address)) = parse_sheet_filename(name) {
            processed.extend(uprns);
        }
    }
    Ok(processed)
}

/// Expected UPRNs minus processed ones, in expected order.
pub fn missing_uprns(expected: &[Uprn], processed: &HashSet<Uprn>) -> Vec<Uprn> {
    expected
        .iter()
        .filter(|uprn| !processed.contains(uprn))
        .cloned()
        .collect()
}

/// Load the expected batch list from the first column of a headerless CSV.
pub async fn load_expected(path: impl AsRef<Path>) -> Result<Vec<Uprn>> {
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(contents.as_bytes());

    let mut expected = Vec::new();
    for result in reader.records() {
        let record = result?;
        if let Some(field) = record.get(0) {
            expected.push(Uprn::from(field));
        }
    }
    Ok(expected)
}

/// Diff the output directory against an expected batch CSV.
pub async fn reconcile(
    out_dir: impl AsRef<Path>,
    expected_csv: impl AsRef<Path>,
) -> Result<Vec<Uprn>> {
    let expected = load_expected(expected_csv).await?;
    let out_dir = out_dir.as_ref().to_owned();
    let processed = tokio::task::spawn_blocking(move || processed_uprns(&out_dir)).await??;
    Ok(missing_uprns(&expected, &processed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_preserves_expected_order() {
        let expected: Vec<Uprn> = ["1", "2", "3", "4", "5"].map(Uprn::from).to_vec();
        let processed: HashSet<Uprn> = ["2", "4"].map(Uprn::from).into_iter().collect();
        let missing = missing_uprns(&expected, &processed);
        assert_eq!(missing, ["1", "3", "5"].map(Uprn::from).to_vec());
    }

    #[test]
    fn scan_reads_address_sheets_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "100010001-100010002-100010003-100010004-addr.jpg",
            "100010001-100010002-100010003-100010004-cal.jpg",
            "1-output.pdf",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let processed = processed_uprns(dir.path()).unwrap();
        assert_eq!(processed.len(), 4);
        assert!(processed.contains(&Uprn::from("100010003")));
    }

    #[tokio::test]
    async fn truncated_group_shows_up_as_missing() {
        // 5 expected UPRNs, one full group processed: the fifth is missing
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1-2-3-4-addr.jpg"), b"x").unwrap();

        let csv = dir.path().join("batch.csv");
        std::fs::write(&csv, "1\n2\n3\n4\n5\n").unwrap();

        let missing = reconcile(dir.path(), &csv).await.unwrap();
        assert_eq!(missing, vec![Uprn::from("5")]);
    }
}
