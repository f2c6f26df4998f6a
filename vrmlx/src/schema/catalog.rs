//! Descriptors for the supported subset of VRML 2.0
use super::{FieldSchema, NodeDescriptor};
use crate::parser::{FieldValue, Vec2f, Vec3f, Vec4f};

/// Canonical names of every supported node type
pub const NODE_NAMES: [&str; 30] = [
    "Anchor",
    "Appearance",
    "Billboard",
    "Box",
    "Collision",
    "Color",
    "Cone",
    "Coordinate",
    "Cylinder",
    "ElevationGrid",
    "Extrusion",
    "FontStyle",
    "Group",
    "ImageTexture",
    "IndexedFaceSet",
    "IndexedLineSet",
    "Inline",
    "LOD",
    "Material",
    "Normal",
    "PixelTexture",
    "PointSet",
    "Shape",
    "Sphere",
    "Switch",
    "Text",
    "TextureCoordinate",
    "TextureTransform",
    "Transform",
    "WorldInfo",
];

/// Headers accepted by `Shape.geometry`
pub(crate) const GEOMETRY_NODES: [&str; 10] = [
    "Box",
    "Cone",
    "Cylinder",
    "ElevationGrid",
    "Extrusion",
    "IndexedFaceSet",
    "IndexedLineSet",
    "PointSet",
    "Sphere",
    "Text",
];

fn b(v: bool) -> FieldValue {
    FieldValue::Bool(v)
}

fn f(v: f32) -> FieldValue {
    FieldValue::Float(v)
}

fn i(v: i32) -> FieldValue {
    FieldValue::Int(v)
}

fn s(v: &str) -> FieldValue {
    FieldValue::String(v.to_owned())
}

fn v2(x: f32, y: f32) -> FieldValue {
    FieldValue::Vec2f(Vec2f::new(x, y))
}

fn v3(x: f32, y: f32, z: f32) -> FieldValue {
    FieldValue::Vec3f(Vec3f::new(x, y, z))
}

fn v4(x: f32, y: f32, z: f32, w: f32) -> FieldValue {
    FieldValue::Vec4f(Vec4f::new(x, y, z, w))
}

fn empty_v2() -> FieldValue {
    FieldValue::Vec2fArray(vec![])
}

fn empty_v3() -> FieldValue {
    FieldValue::Vec3fArray(vec![])
}

fn empty_i() -> FieldValue {
    FieldValue::Int32Array(vec![])
}

fn empty_f() -> FieldValue {
    FieldValue::FloatArray(vec![])
}

fn strings() -> FieldValue {
    FieldValue::StringArray(vec![])
}

/// Adds `bboxCenter` and `bboxSize`, shared by every grouping node
fn bbox(d: NodeDescriptor) -> NodeDescriptor {
    d.with("bboxCenter", v3(0.0, 0.0, 0.0))
        .with("bboxSize", v3(-1.0, -1.0, -1.0))
}

/// Builds every descriptor listed in [`NODE_NAMES`]
pub(super) fn descriptors() -> Vec<NodeDescriptor> {
    vec![
        // Grouping nodes
        bbox(NodeDescriptor::new("Group")).field("children", FieldSchema::nodes()),
        bbox(NodeDescriptor::new("Anchor"))
            .field("children", FieldSchema::nodes())
            .with("description", s(""))
            .with("parameter", strings())
            .with("url", strings()),
        bbox(NodeDescriptor::new("Billboard"))
            .with("axisOfRotation", v3(0.0, 1.0, 0.0))
            .field("children", FieldSchema::nodes()),
        bbox(NodeDescriptor::new("Collision"))
            .field("children", FieldSchema::nodes())
            .with("collide", b(true))
            .field("proxy", FieldSchema::node(&[])),
        bbox(NodeDescriptor::new("Inline")).with("url", strings()),
        NodeDescriptor::new("LOD")
            .with("center", v3(0.0, 0.0, 0.0))
            .field("level", FieldSchema::nodes())
            .with("range", empty_f()),
        bbox(NodeDescriptor::new("Transform"))
            .with("center", v3(0.0, 0.0, 0.0))
            .field("children", FieldSchema::nodes())
            .with("rotation", v4(0.0, 0.0, 1.0, 0.0))
            .with("scale", v3(1.0, 1.0, 1.0))
            .with("scaleOrientation", v4(0.0, 0.0, 1.0, 0.0))
            .with("translation", v3(0.0, 0.0, 0.0)),
        NodeDescriptor::new("Switch")
            .field("choice", FieldSchema::nodes())
            .with("whichChoice", i(-1)),
        NodeDescriptor::new("Shape")
            .field("appearance", FieldSchema::node(&["Appearance"]))
            .field("geometry", FieldSchema::node(&GEOMETRY_NODES)),
        // Geometry primitives
        NodeDescriptor::new("Box").with("size", v3(2.0, 2.0, 2.0)),
        NodeDescriptor::new("Cone")
            .with("bottomRadius", f(1.0))
            .with("height", f(2.0))
            .with("side", b(true))
            .with("bottom", b(true)),
        NodeDescriptor::new("Cylinder")
            .with("bottom", b(true))
            .with("height", f(2.0))
            .with("radius", f(1.0))
            .with("side", b(true))
            .with("top", b(true)),
        NodeDescriptor::new("Sphere").with("radius", f(1.0)),
        NodeDescriptor::new("ElevationGrid")
            .field("color", FieldSchema::node(&["Color"]))
            .field("normal", FieldSchema::node(&["Normal"]))
            .field("texCoord", FieldSchema::node(&["TextureCoordinate"]))
            .with("height", empty_f())
            .with("ccw", b(true))
            .with("colorPerVertex", b(true))
            .with("creaseAngle", f(0.0))
            .with("normalPerVertex", b(true))
            .with("solid", b(true))
            .with("xDimension", i(0))
            .with("xSpacing", f(1.0))
            .with("zDimension", i(0))
            .with("zSpacing", f(1.0)),
        NodeDescriptor::new("Extrusion")
            .with("beginCap", b(true))
            .with("ccw", b(true))
            .with("convex", b(true))
            .with("creaseAngle", f(0.0))
            .with(
                "crossSection",
                FieldValue::Vec2fArray(vec![
                    Vec2f::new(1.0, 1.0),
                    Vec2f::new(1.0, -1.0),
                    Vec2f::new(-1.0, -1.0),
                    Vec2f::new(-1.0, 1.0),
                    Vec2f::new(1.0, 1.0),
                ]),
            )
            .with("endCap", b(true))
            .with("orientation", v4(0.0, 0.0, 1.0, 0.0))
            .with("scale", FieldValue::Vec2fArray(vec![Vec2f::new(1.0, 1.0)]))
            .with("solid", b(true))
            .with(
                "spine",
                FieldValue::Vec3fArray(vec![
                    Vec3f::new(0.0, 0.0, 0.0),
                    Vec3f::new(0.0, 1.0, 0.0),
                ]),
            ),
        NodeDescriptor::new("IndexedFaceSet")
            .field("color", FieldSchema::node(&["Color"]))
            .field("coord", FieldSchema::node(&["Coordinate"]))
            .field("normal", FieldSchema::node(&["Normal"]))
            .field("texCoord", FieldSchema::node(&["TextureCoordinate"]))
            .with("ccw", b(true))
            .with("colorIndex", empty_i())
            .with("colorPerVertex", b(true))
            .with("convex", b(true))
            .with("coordIndex", empty_i())
            .with("creaseAngle", f(0.0))
            .with("normalIndex", empty_i())
            .with("normalPerVertex", b(true))
            .with("solid", b(true))
            .with("texCoordIndex", empty_i()),
        NodeDescriptor::new("IndexedLineSet")
            .field("color", FieldSchema::node(&["Color"]))
            .field("coord", FieldSchema::node(&["Coordinate"]))
            .with("colorIndex", empty_i())
            .with("colorPerVertex", b(true))
            .with("coordIndex", empty_i()),
        NodeDescriptor::new("PointSet")
            .field("color", FieldSchema::node(&["Color"]))
            .field("coord", FieldSchema::node(&["Coordinate"])),
        NodeDescriptor::new("Text")
            .with("string", strings())
            .field("fontStyle", FieldSchema::node(&["FontStyle"]))
            .with("length", empty_f())
            .with("maxExtent", f(0.0)),
        // Helper nodes
        NodeDescriptor::new("Coordinate").with("point", empty_v3()),
        NodeDescriptor::new("Color").with("color", empty_v3()),
        NodeDescriptor::new("Normal").with("vector", empty_v3()),
        NodeDescriptor::new("TextureCoordinate").with("point", empty_v2()),
        NodeDescriptor::new("Appearance")
            .field("material", FieldSchema::node(&["Material"]))
            .field(
                "texture",
                FieldSchema::node(&[
                    "ImageTexture",
                    "MovieTexture",
                    "PixelTexture",
                ]),
            )
            .field(
                "textureTransform",
                FieldSchema::node(&["TextureTransform"]),
            ),
        NodeDescriptor::new("Material")
            .with("ambientIntensity", f(0.2))
            .with("diffuseColor", v3(0.8, 0.8, 0.8))
            .with("emissiveColor", v3(0.0, 0.0, 0.0))
            .with("shininess", f(0.2))
            .with("specularColor", v3(0.0, 0.0, 0.0))
            .with("transparency", f(0.0)),
        NodeDescriptor::new("ImageTexture")
            .with("url", strings())
            .with("repeatS", b(true))
            .with("repeatT", b(true)),
        NodeDescriptor::new("PixelTexture")
            .with("image", v3(0.0, 0.0, 0.0))
            .with("repeatS", b(true))
            .with("repeatT", b(true)),
        NodeDescriptor::new("TextureTransform")
            .with("center", v2(0.0, 0.0))
            .with("rotation", f(0.0))
            .with("scale", v2(1.0, 1.0))
            .with("translation", v2(0.0, 0.0)),
        NodeDescriptor::new("FontStyle")
            .field(
                "family",
                FieldSchema::string("SERIF").one_of(&[
                    "SERIF",
                    "SANS",
                    "TYPEWRITER",
                    "",
                ]),
            )
            .with("horizontal", b(true))
            .field(
                "justify",
                FieldSchema::string("BEGIN").one_of(&[
                    "FIRST", "BEGIN", "MIDDLE", "END", "",
                ]),
            )
            .with("language", s(""))
            .with("leftToRight", b(true))
            .with("size", f(1.0))
            .with("spacing", f(1.0))
            .field(
                "style",
                FieldSchema::string("PLAIN").one_of(&[
                    "PLAIN",
                    "BOLD",
                    "ITALIC",
                    "BOLDITALIC",
                    "",
                ]),
            )
            .with("topToBottom", b(true)),
        NodeDescriptor::new("WorldInfo")
            .with("info", strings())
            .with("title", s("")),
    ]
}
