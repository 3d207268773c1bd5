use crate::normalize::NormalizeReport;

/// Something that can (re)build the curated directory on demand.
///
/// The presenter holds one so it can recover from missing curated files
/// without knowing how they are produced.
pub trait DatasetProvider: Send + Sync {
    fn materialize(&self) -> anyhow::Result<NormalizeReport>;
}
