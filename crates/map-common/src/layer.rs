//! Layer model and the feature datasource contract.

use std::fmt;
use std::sync::Arc;

use crate::error::RenderResult;
use crate::extent::Extent;
use crate::feature::Feature;

/// What kind of data a source yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Vector,
    Raster,
}

/// A query against a feature source.
///
/// `properties` lists the attribute names the caller wants populated on the
/// returned features; sources may return more but must not return less.
#[derive(Debug, Clone)]
pub struct FeatureQuery {
    pub extent: Extent,
    pub properties: Vec<String>,
}

impl FeatureQuery {
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(name.into());
        self
    }
}

/// External datasource contract.
///
/// Called from worker threads; implementations must be `Send + Sync`. All
/// blocking I/O belongs inside `features`, which only ever runs off the
/// caller's execution context.
pub trait FeatureSource: Send + Sync {
    fn source_type(&self) -> SourceType;

    /// Ordered list of declared attribute names.
    fn descriptor(&self) -> Vec<String>;

    /// Features intersecting the query extent, in layer coordinates.
    fn features(&self, query: &FeatureQuery) -> RenderResult<Vec<Feature>>;
}

/// One layer of a renderable map: a name, a native SRS, and a datasource.
#[derive(Clone)]
pub struct Layer {
    name: String,
    srs: String,
    source: Arc<dyn FeatureSource>,
}

impl Layer {
    pub fn new(
        name: impl Into<String>,
        srs: impl Into<String>,
        source: Arc<dyn FeatureSource>,
    ) -> Self {
        Self {
            name: name.into(),
            srs: srs.into(),
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn srs(&self) -> &str {
        &self.srs
    }

    pub fn source(&self) -> &Arc<dyn FeatureSource> {
        &self.source
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("srs", &self.srs)
            .field("source_type", &self.source.source_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptySource;

    impl FeatureSource for EmptySource {
        fn source_type(&self) -> SourceType {
            SourceType::Vector
        }

        fn descriptor(&self) -> Vec<String> {
            vec!["NAME".to_string()]
        }

        fn features(&self, _query: &FeatureQuery) -> RenderResult<Vec<Feature>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_layer_accessors() {
        let layer = Layer::new("towns", "epsg:4326", Arc::new(EmptySource));
        assert_eq!(layer.name(), "towns");
        assert_eq!(layer.srs(), "epsg:4326");
        assert_eq!(layer.source().source_type(), SourceType::Vector);
        assert_eq!(layer.source().descriptor(), vec!["NAME"]);
    }

    #[test]
    fn test_query_builder() {
        let query = FeatureQuery::new(Extent::new(0.0, 0.0, 1.0, 1.0))
            .with_property("NAME")
            .with_property("POP");
        assert_eq!(query.properties, vec!["NAME", "POP"]);
    }
}
