//! Staged-row construction.
//!
//! One [`SegmentRow`] is built per splitter segment, combining way-level
//! fields (class, priority, speeds, directionality, name) with segment-level
//! fields (endpoints, geometry text in both orientations, bounding box).

use waygraph_core::geometry::{BoundingBox, linestring_wkt};
use waygraph_core::{Configuration, Way, WaySegment, WaySplitter};

use crate::error::RowBuildError;

/// One candidate edge row bound for the staging table.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    /// External identifier of the way the segment came from.
    pub way_osm_id: i64,
    /// Routing class resolved from the way's tag pair.
    pub class_id: i64,
    /// Relative priority of the class.
    pub priority: f64,
    /// Optional road name.
    pub name: Option<String>,
    /// Directionality encoding, see [`waygraph_core::OneWay::as_i64`].
    pub one_way: i64,
    /// Forward maximum speed, km/h.
    pub maxspeed_forward: f64,
    /// Backward maximum speed, km/h.
    pub maxspeed_backward: f64,
    /// External id of the first node.
    pub source_osm: i64,
    /// Longitude of the first node.
    pub source_lon: f64,
    /// Latitude of the first node.
    pub source_lat: f64,
    /// External id of the last node.
    pub target_osm: i64,
    /// Longitude of the last node.
    pub target_lon: f64,
    /// Latitude of the last node.
    pub target_lat: f64,
    /// Segment geometry as `LINESTRING` well-known text, in node order.
    pub geometry: String,
    /// The same geometry with the node order reversed.
    pub geometry_reversed: String,
    /// Bounding box of the geometry.
    pub bbox: BoundingBox,
}

/// Build the staged rows for one way.
///
/// The caller is expected to have filtered ways with an incomplete tag pair;
/// a tag pair missing from the configuration aborts the chunk.
pub fn build_way_rows(
    way: &Way,
    configuration: &Configuration,
    splitter: &dyn WaySplitter,
) -> Result<Vec<SegmentRow>, RowBuildError> {
    let class = configuration
        .class_for(&way.tag)
        .ok_or_else(|| RowBuildError::UnknownTagClass {
            way_osm_id: way.osm_id,
            key: way.tag.key.clone(),
            value: way.tag.value.clone(),
        })?;

    let segments = splitter.split(way)?;
    Ok(segments
        .iter()
        .map(|segment| segment_row(way, class.id, class.priority, segment))
        .collect())
}

fn segment_row(way: &Way, class_id: i64, priority: f64, segment: &WaySegment) -> SegmentRow {
    let source = segment.source();
    let target = segment.target();
    let bbox = BoundingBox::of(segment.nodes().iter())
        .unwrap_or(BoundingBox {
            min_lon: source.lon(),
            min_lat: source.lat(),
            max_lon: source.lon(),
            max_lat: source.lat(),
        });
    SegmentRow {
        way_osm_id: way.osm_id,
        class_id,
        priority,
        name: way.name.clone(),
        one_way: way.one_way.as_i64(),
        maxspeed_forward: way.maxspeed_forward_kmh,
        maxspeed_backward: way.maxspeed_backward_kmh,
        source_osm: source.osm_id,
        source_lon: source.lon(),
        source_lat: source.lat(),
        target_osm: target.osm_id,
        target_lon: target.lon(),
        target_lat: target.lat(),
        geometry: linestring_wkt(segment.nodes().iter()),
        geometry_reversed: linestring_wkt(segment.nodes().iter().rev()),
        bbox,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use waygraph_core::{ClassEntry, OneWay, PassthroughSplitter, TagClass, TagConfig, WayNode};

    fn residential_config() -> Configuration {
        Configuration::from_entries([ClassEntry {
            tag: TagConfig::new("highway", "residential"),
            class: TagClass {
                id: 11,
                priority: 2.5,
            },
        }])
    }

    fn residential_way(one_way: OneWay) -> Way {
        Way::new(
            10,
            Some("High Street".into()),
            TagConfig::new("highway", "residential"),
            50.0,
            45.0,
            one_way,
            vec![WayNode::new(1, 0.0, 0.0), WayNode::new(2, 1.0, 1.0)],
        )
        .expect("valid way")
    }

    #[rstest]
    fn builds_one_row_per_segment() {
        let rows = build_way_rows(
            &residential_way(OneWay::Yes),
            &residential_config(),
            &PassthroughSplitter,
        )
        .expect("rows");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.way_osm_id, 10);
        assert_eq!(row.class_id, 11);
        assert_eq!(row.priority, 2.5);
        assert_eq!(row.one_way, 1);
        assert_eq!(row.source_osm, 1);
        assert_eq!(row.target_osm, 2);
        assert_eq!(row.geometry, "LINESTRING(0 0,1 1)");
        assert_eq!(row.geometry_reversed, "LINESTRING(1 1,0 0)");
        assert_eq!(row.bbox.max_lon, 1.0);
    }

    #[rstest]
    fn unknown_tag_class_is_an_error() {
        let way = Way::new(
            10,
            None,
            TagConfig::new("highway", "primary"),
            50.0,
            50.0,
            OneWay::No,
            vec![WayNode::new(1, 0.0, 0.0), WayNode::new(2, 1.0, 1.0)],
        )
        .expect("valid way");
        let err = build_way_rows(&way, &residential_config(), &PassthroughSplitter)
            .expect_err("unmapped tag");
        assert!(matches!(err, RowBuildError::UnknownTagClass { .. }));
    }
}
