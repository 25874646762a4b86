//! Domain ports: driven ports for every external effect and driving ports
//! for the inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod ingestion_command;
mod model_writer;
mod notifier;
mod object_source;
mod preview_query;
mod staging_store;
mod transformer;

#[cfg(test)]
pub use ingestion_command::MockIngestionCommand;
pub use ingestion_command::{FixtureIngestionCommand, IngestionCommand};
#[cfg(test)]
pub use model_writer::MockModelWriter;
pub use model_writer::{FixtureModelWriter, ModelWriter, ModelWriterError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{FixtureNotifier, Notifier, NotifierError};
#[cfg(test)]
pub use object_source::MockObjectSource;
pub use object_source::{FixtureObjectSource, ObjectSource, ObjectSourceError};
#[cfg(test)]
pub use preview_query::MockPreviewQuery;
pub use preview_query::{FixturePreviewQuery, PreviewError, PreviewOutcome, PreviewQuery};
#[cfg(test)]
pub use staging_store::{MockStagingLoader, MockTableSampler};
pub use staging_store::{
    FixtureStagingStore, StagingLoad, StagingLoader, StagingStoreError, TableSampler,
};
#[cfg(test)]
pub use transformer::MockTransformer;
pub use transformer::{
    FixtureTransformer, TransformReport, Transformer, TransformerError, tail,
};
