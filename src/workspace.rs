//! # Feature Layer Loader Module
//!
//! ## Purpose
//! Opens the named feature layers of an extracted design-export workspace and
//! exposes uniform, read-only access to attribute records and geometries.
//! Layers are GeoJSON FeatureCollection files named after the export
//! convention (`OUT_Closures.geojson`, `OUT_FeederCables.geojson`, ...).
//!
//! ## Input/Output Specification
//! - **Input**: Workspace directory path, canonical layer identifiers
//! - **Output**: Immutable [`Layer`] values (records + geometries + schema)
//! - **Errors**: `LayerNotFound` for absent files, `Schema` for missing
//!   required columns or coordinate-system mismatches, `Geometry` for
//!   unparseable or mixed-kind geometries
//!
//! ## Key Features
//! - Fixed catalogue of known layers with expected geometry kinds
//! - Tolerant attribute access (missing optional attributes read as null)
//! - Per-layer coordinate system capture; cross-layer consistency helper
//! - No reprojection: a CRS mismatch is surfaced, never silently corrected

use crate::errors::{Result, ValidationError};
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Scalar attribute value of one feature record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Integer(i64),
    Number(f64),
    Text(String),
}

static NULL_ATTR: AttrValue = AttrValue::Null;

impl AttrValue {
    fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttrValue::Null,
            serde_json::Value::Bool(b) => AttrValue::Integer(*b as i64),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttrValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    AttrValue::Number(f)
                } else {
                    AttrValue::Null
                }
            }
            serde_json::Value::String(s) => AttrValue::Text(s.clone()),
            other => AttrValue::Text(other.to_string()),
        }
    }

    /// Null, or text that is empty after trimming
    pub fn is_empty(&self) -> bool {
        match self {
            AttrValue::Null => true,
            AttrValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Integer(i) => Some(*i as f64),
            AttrValue::Number(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            AttrValue::Number(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Human-readable rendering used in issue payloads
    pub fn display(&self) -> String {
        match self {
            AttrValue::Null => "null".to_string(),
            AttrValue::Integer(i) => i.to_string(),
            AttrValue::Number(f) => f.to_string(),
            AttrValue::Text(s) => s.clone(),
        }
    }
}

/// Geometry kind shared by all records of one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

impl GeometryKind {
    fn of(geometry: &Geometry<f64>) -> Option<Self> {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Some(GeometryKind::Point),
            Geometry::LineString(_) | Geometry::MultiLineString(_) => Some(GeometryKind::Line),
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Some(GeometryKind::Polygon),
            _ => None,
        }
    }
}

/// Cable families present in a design export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CableFamily {
    Feeder,
    Drop,
    Distribution,
    PrimDistribution,
}

impl CableFamily {
    pub const ALL: [CableFamily; 4] = [
        CableFamily::Feeder,
        CableFamily::Drop,
        CableFamily::Distribution,
        CableFamily::PrimDistribution,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CableFamily::Feeder => "Feeder",
            CableFamily::Drop => "Drop",
            CableFamily::Distribution => "Distribution",
            CableFamily::PrimDistribution => "PrimDistribution",
        }
    }

    pub fn cables(&self) -> LayerId {
        match self {
            CableFamily::Feeder => LayerId::FeederCables,
            CableFamily::Drop => LayerId::DropCables,
            CableFamily::Distribution => LayerId::DistributionCables,
            CableFamily::PrimDistribution => LayerId::PrimDistributionCables,
        }
    }

    pub fn pieces(&self) -> LayerId {
        match self {
            CableFamily::Feeder => LayerId::FeederCablePieces,
            CableFamily::Drop => LayerId::DropCablePieces,
            CableFamily::Distribution => LayerId::DistributionCablePieces,
            CableFamily::PrimDistribution => LayerId::PrimDistributionCablePieces,
        }
    }
}

/// Canonical identifiers of every layer in the export catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Closures,
    Splices,
    UsedSegments,
    FeederCables,
    DropCables,
    DistributionCables,
    PrimDistributionCables,
    FeederCablePieces,
    DropCablePieces,
    DistributionCablePieces,
    PrimDistributionCablePieces,
    FeederPoints,
    PrimDistributionPoints,
    DistributionPoints,
    DropClusters,
    DistributionClusters,
    DistributionCableClusters,
    PrimDistributionClusters,
    PrimDistributionCableClusters,
    FeederClusters,
    FeederCableClusters,
}

impl LayerId {
    /// Canonical layer name, matching the export file stem
    pub fn name(&self) -> &'static str {
        match self {
            LayerId::Closures => "OUT_Closures",
            LayerId::Splices => "OUT_Splices",
            LayerId::UsedSegments => "OUT_UsedSegments",
            LayerId::FeederCables => "OUT_FeederCables",
            LayerId::DropCables => "OUT_DropCables",
            LayerId::DistributionCables => "OUT_DistributionCables",
            LayerId::PrimDistributionCables => "OUT_PrimDistributionCables",
            LayerId::FeederCablePieces => "OUT_FeederCablePieces",
            LayerId::DropCablePieces => "OUT_DropCablePieces",
            LayerId::DistributionCablePieces => "OUT_DistributionCablePieces",
            LayerId::PrimDistributionCablePieces => "OUT_PrimDistributionCablePieces",
            LayerId::FeederPoints => "OUT_FeederPoints",
            LayerId::PrimDistributionPoints => "OUT_PrimDistributionPoints",
            LayerId::DistributionPoints => "OUT_DistributionPoints",
            LayerId::DropClusters => "OUT_DropClusters",
            LayerId::DistributionClusters => "OUT_DistributionClusters",
            LayerId::DistributionCableClusters => "OUT_DistributionCableClusters",
            LayerId::PrimDistributionClusters => "OUT_PrimDistributionClusters",
            LayerId::PrimDistributionCableClusters => "OUT_PrimDistributionCableClusters",
            LayerId::FeederClusters => "OUT_FeederClusters",
            LayerId::FeederCableClusters => "OUT_FeederCableClusters",
        }
    }

    /// File name of this layer inside a workspace directory
    pub fn file_name(&self) -> String {
        format!("{}.geojson", self.name())
    }

    /// Geometry kind the layer is expected to carry
    pub fn geometry_kind(&self) -> GeometryKind {
        match self {
            LayerId::Closures
            | LayerId::Splices
            | LayerId::FeederPoints
            | LayerId::PrimDistributionPoints
            | LayerId::DistributionPoints => GeometryKind::Point,
            LayerId::UsedSegments
            | LayerId::FeederCables
            | LayerId::DropCables
            | LayerId::DistributionCables
            | LayerId::PrimDistributionCables
            | LayerId::FeederCablePieces
            | LayerId::DropCablePieces
            | LayerId::DistributionCablePieces
            | LayerId::PrimDistributionCablePieces => GeometryKind::Line,
            _ => GeometryKind::Polygon,
        }
    }

    /// Columns a structurally complete export populates for this layer
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            LayerId::Closures => &["ID", "IDENTIFIER", "VIRTUAL", "LAYER", "EQ_ID"],
            LayerId::Splices => &["ID"],
            LayerId::UsedSegments => &["ID", "TYPE", "GISTOOL_ID"],
            LayerId::FeederCables => &["CABLE_ID", "IDENTIFIER", "DIAMETER", "CABLEGRAN", "BUNDLEGRAN"],
            LayerId::DropCables => &["CABLE_ID", "CABLEGRAN", "BUNDLEGRAN"],
            LayerId::DistributionCables | LayerId::PrimDistributionCables => {
                &["CABLE_ID", "DIAMETER", "CABLEGRAN", "BUNDLEGRAN"]
            }
            LayerId::FeederCablePieces
            | LayerId::DropCablePieces
            | LayerId::DistributionCablePieces
            | LayerId::PrimDistributionCablePieces => &["CABLE_ID"],
            LayerId::FeederPoints | LayerId::PrimDistributionPoints | LayerId::DistributionPoints => {
                &["ID"]
            }
            LayerId::DistributionCableClusters
            | LayerId::PrimDistributionCableClusters
            | LayerId::FeederCableClusters => &["CAB_GROUP"],
            _ => &["AGG_ID"],
        }
    }

    /// Layers every export is expected to contain; the remainder (drop
    /// layers, cable pieces, cluster layers, distribution points) are
    /// tolerated as absent in partial exports.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            LayerId::Closures
                | LayerId::Splices
                | LayerId::UsedSegments
                | LayerId::FeederCables
                | LayerId::DistributionCables
                | LayerId::PrimDistributionCables
                | LayerId::FeederPoints
                | LayerId::PrimDistributionPoints
        )
    }

    pub const ALL: [LayerId; 21] = [
        LayerId::Closures,
        LayerId::Splices,
        LayerId::UsedSegments,
        LayerId::FeederCables,
        LayerId::DropCables,
        LayerId::DistributionCables,
        LayerId::PrimDistributionCables,
        LayerId::FeederCablePieces,
        LayerId::DropCablePieces,
        LayerId::DistributionCablePieces,
        LayerId::PrimDistributionCablePieces,
        LayerId::FeederPoints,
        LayerId::PrimDistributionPoints,
        LayerId::DistributionPoints,
        LayerId::DropClusters,
        LayerId::DistributionClusters,
        LayerId::DistributionCableClusters,
        LayerId::PrimDistributionClusters,
        LayerId::PrimDistributionCableClusters,
        LayerId::FeederClusters,
        LayerId::FeederCableClusters,
    ];

    /// Cluster layers paired with the attribute naming their features
    pub const CLUSTERS: [(LayerId, &'static str); 7] = [
        (LayerId::DropClusters, "AGG_ID"),
        (LayerId::DistributionClusters, "AGG_ID"),
        (LayerId::DistributionCableClusters, "CAB_GROUP"),
        (LayerId::PrimDistributionClusters, "AGG_ID"),
        (LayerId::PrimDistributionCableClusters, "CAB_GROUP"),
        (LayerId::FeederClusters, "AGG_ID"),
        (LayerId::FeederCableClusters, "CAB_GROUP"),
    ];
}

/// One row of a layer: attribute map plus optional geometry
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    attrs: BTreeMap<String, AttrValue>,
    geometry: Option<Geometry<f64>>,
}

impl FeatureRecord {
    /// Attribute lookup; missing attributes read as null
    pub fn attr(&self, name: &str) -> &AttrValue {
        self.attrs.get(name).unwrap_or(&NULL_ATTR)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.attr(name).as_text()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.attr(name).as_f64()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.attr(name).as_i64()
    }

    pub fn geometry(&self) -> Option<&Geometry<f64>> {
        self.geometry.as_ref()
    }

    /// The record's geometry as a point, when it is one
    pub fn point(&self) -> Option<Point<f64>> {
        match self.geometry {
            Some(Geometry::Point(p)) => Some(p),
            _ => None,
        }
    }
}

/// An ordered sequence of records sharing a schema and geometry kind
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    records: Vec<FeatureRecord>,
    columns: BTreeSet<String>,
    crs: Option<String>,
    kind: Option<GeometryKind>,
}

impl Layer {
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Coordinate system declared by the layer file, when present
    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    /// Geometry kind observed in the data (None for layers with no geometry)
    pub fn kind(&self) -> Option<GeometryKind> {
        self.kind
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Verify required columns exist, or report a schema error naming the
    /// missing ones
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.has_column(n))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Schema {
                layer: self.name().to_string(),
                details: format!("missing required columns: {}", missing.join(", ")),
            })
        }
    }
}

/// Verify all given layers agree on their declared coordinate system.
///
/// Layers without a declaration are accepted; the first declared CRS becomes
/// the reference. A disagreement is a schema error, never a reprojection.
pub fn ensure_consistent_crs<'a, I>(layers: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Layer>,
{
    let mut expected: Option<(&str, &str)> = None;
    for layer in layers {
        if let Some(crs) = layer.crs() {
            match expected {
                None => expected = Some((layer.name(), crs)),
                Some((_, reference)) if reference == crs => {}
                Some((_, reference)) => {
                    return Err(ValidationError::CrsMismatch {
                        layer: layer.name().to_string(),
                        expected: reference.to_string(),
                        found: crs.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Read-only handle on an extracted workspace directory
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open a workspace directory; fails before any check runs if the path
    /// is not a directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ValidationError::WorkspaceNotFound { path: root });
        }
        Ok(Self { root })
    }

    /// Workspace identifier carried into the report
    pub fn id(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layer_path(&self, id: LayerId) -> PathBuf {
        self.root.join(id.file_name())
    }

    pub fn has_layer(&self, id: LayerId) -> bool {
        self.layer_path(id).is_file()
    }

    /// Load one layer. Loading is read-only and side-effect free beyond I/O.
    pub fn load(&self, id: LayerId) -> Result<Layer> {
        let path = self.layer_path(id);
        if !path.is_file() {
            return Err(ValidationError::LayerNotFound {
                layer: id.name().to_string(),
                path,
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ValidationError::Io {
            path: path.clone(),
            source,
        })?;
        let root: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| ValidationError::Json {
                path: path.clone(),
                source,
            })?;

        let features = root
            .get("features")
            .and_then(|f| f.as_array())
            .ok_or_else(|| ValidationError::Schema {
                layer: id.name().to_string(),
                details: "file is not a FeatureCollection with a 'features' array".to_string(),
            })?;

        let crs = root
            .get("crs")
            .and_then(|c| c.get("properties"))
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(|s| s.to_string());

        let mut records = Vec::with_capacity(features.len());
        let mut columns = BTreeSet::new();
        let mut kind: Option<GeometryKind> = None;

        for (index, feature) in features.iter().enumerate() {
            let attrs = match feature.get("properties") {
                Some(serde_json::Value::Object(map)) => map
                    .iter()
                    .map(|(k, v)| (k.clone(), AttrValue::from_json(v)))
                    .collect(),
                _ => BTreeMap::new(),
            };
            for key in attrs.keys() {
                columns.insert(key.clone());
            }

            let geometry = match feature.get("geometry") {
                None | Some(serde_json::Value::Null) => None,
                Some(value) => {
                    let geometry =
                        parse_geometry(value).map_err(|details| ValidationError::Geometry {
                            layer: id.name().to_string(),
                            details: format!("feature {}: {}", index, details),
                        })?;
                    let this_kind = GeometryKind::of(&geometry).ok_or_else(|| {
                        ValidationError::Geometry {
                            layer: id.name().to_string(),
                            details: format!("feature {}: unsupported geometry kind", index),
                        }
                    })?;
                    match kind {
                        None => kind = Some(this_kind),
                        Some(k) if k != this_kind => {
                            return Err(ValidationError::Geometry {
                                layer: id.name().to_string(),
                                details: format!(
                                    "mixed geometry kinds: {:?} and {:?}",
                                    k, this_kind
                                ),
                            });
                        }
                        Some(_) => {}
                    }
                    Some(geometry)
                }
            };

            records.push(FeatureRecord { attrs, geometry });
        }

        if let Some(observed) = kind {
            if observed != id.geometry_kind() {
                return Err(ValidationError::Geometry {
                    layer: id.name().to_string(),
                    details: format!(
                        "expected {:?} geometries, found {:?}",
                        id.geometry_kind(),
                        observed
                    ),
                });
            }
        }

        tracing::debug!(
            layer = id.name(),
            records = records.len(),
            "layer loaded"
        );

        Ok(Layer {
            id,
            records,
            columns,
            crs,
            kind,
        })
    }
}

fn parse_coord(value: &serde_json::Value) -> std::result::Result<Coord<f64>, String> {
    let pair = value
        .as_array()
        .filter(|a| a.len() >= 2)
        .ok_or_else(|| "coordinate is not an [x, y] array".to_string())?;
    let x = pair[0]
        .as_f64()
        .ok_or_else(|| "coordinate x is not a number".to_string())?;
    let y = pair[1]
        .as_f64()
        .ok_or_else(|| "coordinate y is not a number".to_string())?;
    Ok(Coord { x, y })
}

fn parse_line(value: &serde_json::Value) -> std::result::Result<LineString<f64>, String> {
    let coords = value
        .as_array()
        .ok_or_else(|| "line is not a coordinate array".to_string())?;
    let parsed: std::result::Result<Vec<Coord<f64>>, String> =
        coords.iter().map(parse_coord).collect();
    Ok(LineString::from(parsed?))
}

fn parse_polygon(value: &serde_json::Value) -> std::result::Result<Polygon<f64>, String> {
    let rings = value
        .as_array()
        .ok_or_else(|| "polygon is not a ring array".to_string())?;
    if rings.is_empty() {
        return Err("polygon has no rings".to_string());
    }
    let exterior = parse_line(&rings[0])?;
    let interiors: std::result::Result<Vec<LineString<f64>>, String> =
        rings[1..].iter().map(parse_line).collect();
    Ok(Polygon::new(exterior, interiors?))
}

fn parse_geometry(value: &serde_json::Value) -> std::result::Result<Geometry<f64>, String> {
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| "geometry has no 'type'".to_string())?;
    let coordinates = value
        .get("coordinates")
        .ok_or_else(|| "geometry has no 'coordinates'".to_string())?;

    match kind {
        "Point" => Ok(Geometry::Point(Point::from(parse_coord(coordinates)?))),
        "MultiPoint" => {
            let coords = coordinates
                .as_array()
                .ok_or_else(|| "MultiPoint coordinates are not an array".to_string())?;
            let points: std::result::Result<Vec<Point<f64>>, String> = coords
                .iter()
                .map(|c| parse_coord(c).map(Point::from))
                .collect();
            Ok(Geometry::MultiPoint(MultiPoint::new(points?)))
        }
        "LineString" => Ok(Geometry::LineString(parse_line(coordinates)?)),
        "MultiLineString" => {
            let lines = coordinates
                .as_array()
                .ok_or_else(|| "MultiLineString coordinates are not an array".to_string())?;
            let parsed: std::result::Result<Vec<LineString<f64>>, String> =
                lines.iter().map(parse_line).collect();
            Ok(Geometry::MultiLineString(MultiLineString::new(parsed?)))
        }
        "Polygon" => Ok(Geometry::Polygon(parse_polygon(coordinates)?)),
        "MultiPolygon" => {
            let polygons = coordinates
                .as_array()
                .ok_or_else(|| "MultiPolygon coordinates are not an array".to_string())?;
            let parsed: std::result::Result<Vec<Polygon<f64>>, String> =
                polygons.iter().map(parse_polygon).collect();
            Ok(Geometry::MultiPolygon(MultiPolygon::new(parsed?)))
        }
        other => Err(format!("unsupported geometry type '{}'", other)),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared helpers for building temporary GeoJSON workspaces in tests.

    use serde_json::{json, Value};
    use std::path::Path;

    pub fn write_layer(dir: &Path, file_name: &str, features: Value) {
        write_layer_with_crs(dir, file_name, features, None);
    }

    pub fn write_layer_with_crs(dir: &Path, file_name: &str, features: Value, crs: Option<&str>) {
        let mut collection = json!({
            "type": "FeatureCollection",
            "features": features,
        });
        if let Some(name) = crs {
            collection["crs"] = json!({ "type": "name", "properties": { "name": name } });
        }
        std::fs::write(dir.join(file_name), collection.to_string()).unwrap();
    }

    pub fn point_feature(props: Value, x: f64, y: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": props,
            "geometry": { "type": "Point", "coordinates": [x, y] },
        })
    }

    pub fn line_feature(props: Value, coords: Value) -> Value {
        json!({
            "type": "Feature",
            "properties": props,
            "geometry": { "type": "LineString", "coordinates": coords },
        })
    }

    pub fn square_feature(props: Value, min_x: f64, min_y: f64, size: f64) -> Value {
        let (a, b) = (min_x, min_y);
        let (c, d) = (min_x + size, min_y + size);
        json!({
            "type": "Feature",
            "properties": props,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[a, b], [c, b], [c, d], [a, d], [a, b]]],
            },
        })
    }

    pub fn null_geometry_feature(props: Value) -> Value {
        json!({ "type": "Feature", "properties": props, "geometry": null })
    }

    /// Minimal structurally complete export: every required layer plus the
    /// cable-piece layers of the three always-present families, all mutually
    /// consistent so a full default run passes every check.
    pub fn write_complete_workspace(dir: &Path) {
        write_layer(
            dir,
            "OUT_Closures.geojson",
            json!([point_feature(
                json!({"ID": "C1", "IDENTIFIER": "BE16", "VIRTUAL": 0, "LAYER": "Feeder", "EQ_ID": "EQ-1"}),
                0.0, 0.0
            )]),
        );
        write_layer(
            dir,
            "OUT_Splices.geojson",
            json!([point_feature(json!({"ID": "C1"}), 0.0, 0.0)]),
        );
        write_layer(
            dir,
            "OUT_UsedSegments.geojson",
            json!([line_feature(
                json!({"ID": 1, "TYPE": "DUCT", "GISTOOL_ID": "GT-1"}),
                json!([[0.0, 0.0], [1.0, 0.0]])
            )]),
        );
        for (file, cable_id, diameter) in [
            ("OUT_FeederCables.geojson", 1, 9.6),
            ("OUT_DistributionCables.geojson", 2, 8.0),
            ("OUT_PrimDistributionCables.geojson", 3, 11.6),
        ] {
            write_layer(
                dir,
                file,
                json!([line_feature(
                    json!({
                        "CABLE_ID": cable_id, "IDENTIFIER": format!("CAB-{}", cable_id),
                        "DIAMETER": diameter, "CABLEGRAN": 4, "BUNDLEGRAN": 12,
                    }),
                    json!([[0.0, 0.0], [1.0, 0.0]])
                )]),
            );
        }
        for (file, cable_id) in [
            ("OUT_FeederCablePieces.geojson", 1),
            ("OUT_DistributionCablePieces.geojson", 2),
            ("OUT_PrimDistributionCablePieces.geojson", 3),
        ] {
            write_layer(
                dir,
                file,
                json!([line_feature(
                    json!({"ID": cable_id, "CABLE_ID": cable_id}),
                    json!([[0.0, 0.0], [0.5, 0.0]])
                )]),
            );
        }
        write_layer(
            dir,
            "OUT_FeederPoints.geojson",
            json!([point_feature(json!({"ID": "F1"}), 0.0, 0.0)]),
        );
        write_layer(
            dir,
            "OUT_PrimDistributionPoints.geojson",
            json!([point_feature(json!({"ID": "P1"}), 0.0, 0.0)]),
        );
    }
}
