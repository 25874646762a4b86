//! Generated transformation models.
//!
//! One model per dataset selects every staged column, in header order, from
//! the staging table. Regenerating a model overwrites the previous file.

use super::{DatasetName, QualifiedTable, StagingSchema, quote_identifier};

/// Directory, relative to the transformation project root, that receives
/// generated models.
pub const GENERATED_MODELS_DIR: [&str; 2] = ["models", "generated"];

/// A rendered model ready to be written into the transformation project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModel {
    file_name: String,
    contents: String,
}

impl GeneratedModel {
    /// Render the model selecting `schema`'s columns from the staging table
    /// of `dataset`.
    ///
    /// # Examples
    /// ```
    /// use worker::domain::{DatasetName, GeneratedModel, StagingSchema};
    ///
    /// let dataset = DatasetName::new("orders").expect("valid");
    /// let schema = StagingSchema::from_header(["Order Id", "Amount"]);
    /// let model = GeneratedModel::render(&dataset, &schema);
    /// assert_eq!(model.file_name(), "orders_clean.sql");
    /// assert_eq!(
    ///     model.contents(),
    ///     "-- auto-generated model for orders\nselect \"order_id\", \"amount\" from staging.\"orders\"",
    /// );
    /// ```
    #[must_use]
    pub fn render(dataset: &DatasetName, schema: &StagingSchema) -> Self {
        let columns = schema
            .cleaned_names()
            .map(quote_identifier)
            .collect::<Vec<_>>()
            .join(", ");
        let source = QualifiedTable::staging(dataset);
        Self {
            file_name: format!("{}.sql", dataset.model_name()),
            contents: format!("-- auto-generated model for {dataset}\nselect {columns} from {source}"),
        }
    }

    /// File name inside the generated models directory.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// SQL text of the model.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_disambiguated_columns_in_header_order() {
        let dataset = DatasetName::new("sales").expect("valid");
        let schema = StagingSchema::from_header(["Total", "total", "1st"]);
        let model = GeneratedModel::render(&dataset, &schema);
        assert_eq!(
            model.contents(),
            "-- auto-generated model for sales\nselect \"total\", \"total_1\", \"col_1st\" from staging.\"sales\""
        );
    }

    #[test]
    fn file_name_follows_the_dataset() {
        let dataset = DatasetName::new("Q3 Orders").expect("valid");
        let model = GeneratedModel::render(&dataset, &StagingSchema::from_header(["a"]));
        assert_eq!(model.file_name(), "Q3 Orders_clean.sql");
        assert!(model.contents().ends_with("from staging.\"Q3 Orders\""));
    }
}
