//! Column identifier normalisation.
//!
//! Both the staging table DDL and the generated transformation model read
//! their identifiers from one [`StagingSchema`], so the two can never drift.

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

/// Prefix applied to names that would otherwise start with a digit.
pub const NUMERIC_PREFIX: &str = "col_";

/// Name given to header cells that are empty once cleaned.
pub const UNNAMED_COLUMN: &str = "unnamed_column";

/// Longest identifier PostgreSQL stores without truncating it.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Normalise a raw CSV header cell into a column identifier.
///
/// Surrounding whitespace and embedded quote characters are removed, spaces
/// become underscores and the result is lowercased. A leading digit (any
/// Unicode numeric character) gains the [`NUMERIC_PREFIX`]; an empty result
/// becomes [`UNNAMED_COLUMN`]. Applying the function to its own output
/// changes nothing.
///
/// # Examples
/// ```
/// use worker::domain::clean_column_name;
///
/// assert_eq!(clean_column_name(" Sale Amount "), "sale_amount");
/// assert_eq!(clean_column_name("2024 Total"), "col_2024_total");
/// assert_eq!(clean_column_name("' padded '"), "_padded_");
/// assert_eq!(clean_column_name("\"\""), "unnamed_column");
/// ```
#[must_use]
pub fn clean_column_name(raw: &str) -> String {
    let unquoted: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | '\''))
        .collect();
    // Spaces exposed by quote removal are kept as underscores; other
    // whitespace exposed that way is trimmed.
    let cleaned = unquoted.replace(' ', "_").trim().to_lowercase();

    if cleaned.is_empty() {
        return UNNAMED_COLUMN.to_owned();
    }
    if cleaned.starts_with(char::is_numeric) {
        return format!("{NUMERIC_PREFIX}{cleaned}");
    }
    cleaned
}

/// A header cell paired with the identifier used for it in the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StagingColumn {
    /// Header text as it appeared in the CSV.
    pub original: String,
    /// Unique identifier used in DDL and generated SQL.
    pub cleaned: String,
}

/// Ordered, collision-free column identifiers for one CSV header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingSchema {
    columns: Vec<StagingColumn>,
}

impl StagingSchema {
    /// Clean every header cell, suffixing repeats with `_1`, `_2`, ... in
    /// order of appearance.
    ///
    /// Identifiers are cut to [`MAX_IDENTIFIER_LEN`] bytes on a character
    /// boundary before de-duplication, and a suffixed name shortens its base
    /// so the suffix survives. Names that PostgreSQL would truncate into the
    /// same column therefore stay distinct.
    ///
    /// # Examples
    /// ```
    /// use worker::domain::StagingSchema;
    ///
    /// let schema = StagingSchema::from_header(["Name", "name", "NAME"]);
    /// let names: Vec<_> = schema.cleaned_names().collect();
    /// assert_eq!(names, ["name", "name_1", "name_2"]);
    /// ```
    #[must_use]
    pub fn from_header<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut taken = HashSet::new();
        let columns = header
            .into_iter()
            .map(|raw| {
                let original = raw.as_ref().to_owned();
                let base = clean_column_name(&original);
                let cleaned = unique_name(clamp_identifier(&base, MAX_IDENTIFIER_LEN), &mut taken);
                StagingColumn { original, cleaned }
            })
            .collect();
        Self { columns }
    }

    /// Columns in header order.
    #[must_use]
    pub fn columns(&self) -> &[StagingColumn] {
        &self.columns
    }

    /// Cleaned identifiers in header order.
    pub fn cleaned_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.cleaned.as_str())
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the header had no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Longest prefix of `name` no longer than `max_len` bytes.
fn clamp_identifier(name: &str, max_len: usize) -> &str {
    let end = (0..=max_len.min(name.len()))
        .rev()
        .find(|&idx| name.is_char_boundary(idx))
        .unwrap_or_default();
    name.get(..end).unwrap_or_default()
}

fn unique_name(base: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.to_owned()) {
        return base.to_owned();
    }
    let mut suffix = 1_usize;
    loop {
        let marker = format!("_{suffix}");
        let stem = clamp_identifier(base, MAX_IDENTIFIER_LEN.saturating_sub(marker.len()));
        let candidate = format!("{stem}{marker}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Name", "name")]
    #[case("  Sale Amount  ", "sale_amount")]
    #[case("\"Quoted\"", "quoted")]
    #[case("it's", "its")]
    #[case("' padded '", "_padded_")]
    #[case("'\tTabbed'", "tabbed")]
    #[case("١23", "col_١23")]
    #[case("2024 Total", "col_2024_total")]
    #[case("9", "col_9")]
    #[case("", "unnamed_column")]
    #[case("   ", "unnamed_column")]
    #[case("\"'\"", "unnamed_column")]
    #[case("ÉTAT", "état")]
    #[case("a  b", "a__b")]
    fn cleans_header_cells(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(clean_column_name(raw), expected);
    }

    #[rstest]
    #[case(" Sale Amount ")]
    #[case("'\tTabbed'")]
    #[case("123")]
    #[case("\"\"")]
    #[case("Mixed \"Case\" Col")]
    #[case("İstanbul")]
    #[case("' padded '")]
    #[case("٣ items")]
    fn cleaning_is_idempotent(#[case] raw: &str) {
        let once = clean_column_name(raw);
        assert_eq!(clean_column_name(&once), once);
    }

    #[test]
    fn cleaned_names_never_contain_quotes_or_spaces() {
        for raw in ["a \"b\" c", "'x' 'y'", " 1 2 3 "] {
            let cleaned = clean_column_name(raw);
            assert!(!cleaned.contains(['"', '\'', ' ']), "{cleaned}");
        }
    }

    #[test]
    fn schema_disambiguates_collisions_in_order() {
        let schema = StagingSchema::from_header(["Sale Amount", "sale_amount", "", " ", "id"]);
        let names: Vec<_> = schema.cleaned_names().collect();
        assert_eq!(
            names,
            ["sale_amount", "sale_amount_1", "unnamed_column", "unnamed_column_1", "id"]
        );
        assert_eq!(
            schema.columns().first().map(|c| c.original.as_str()),
            Some("Sale Amount")
        );
    }

    #[test]
    fn suffix_skips_names_already_present_in_the_header() {
        let schema = StagingSchema::from_header(["a_1", "a", "a"]);
        let names: Vec<_> = schema.cleaned_names().collect();
        assert_eq!(names, ["a_1", "a", "a_2"]);
    }

    #[test]
    fn long_duplicate_headers_stay_distinct_within_the_identifier_limit() {
        let long = "c".repeat(70);
        let schema = StagingSchema::from_header([long.as_str(), long.as_str(), long.as_str()]);
        let names: Vec<_> = schema.cleaned_names().collect();

        assert!(names.iter().all(|name| name.len() <= MAX_IDENTIFIER_LEN), "{names:?}");
        assert_eq!(names.first().copied(), Some("c".repeat(63).as_str()));
        assert_eq!(names.get(1).copied(), Some(format!("{}_1", "c".repeat(61)).as_str()));
        assert_eq!(names.get(2).copied(), Some(format!("{}_2", "c".repeat(61)).as_str()));
    }

    #[test]
    fn suffix_fits_after_a_name_of_exactly_the_limit() {
        let at_limit = "d".repeat(MAX_IDENTIFIER_LEN);
        let schema = StagingSchema::from_header([at_limit.as_str(), at_limit.as_str()]);
        let names: Vec<_> = schema.cleaned_names().collect();

        assert_eq!(names.first().map(|name| name.len()), Some(MAX_IDENTIFIER_LEN));
        assert_eq!(names.get(1).map(|name| name.len()), Some(MAX_IDENTIFIER_LEN));
        assert_ne!(names.first(), names.get(1));
    }

    #[test]
    fn clamping_respects_character_boundaries() {
        // 'é' is two bytes, so 32 of them are 64 bytes.
        let accented = "é".repeat(32);
        let schema = StagingSchema::from_header([accented.as_str()]);
        let names: Vec<_> = schema.cleaned_names().collect();

        assert_eq!(names, ["é".repeat(31)]);
    }
}
