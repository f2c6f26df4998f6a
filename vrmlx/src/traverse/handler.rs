//! Per-category traversal rules
use super::Traversor;
use crate::{
    context::ConversionContext,
    error::TraversalError,
    parser::NodeId,
    transform::TransformationMatrix,
    validate::{NodeView, validate},
};
use log::{debug, warn};

/// Helper fields of a geometry node, with the descriptor each must satisfy
type HelperFields = &'static [(&'static str, &'static str)];

/// How a node's children are visited
#[derive(Copy, Clone, Debug)]
pub(super) enum Handler {
    /// Visits `children` with unchanged state
    Group,
    /// Visits `children`; `proxy` is collision-only geometry
    Collision,
    /// Visits the first (most detailed) entry of `level`
    Lod,
    /// Visits `children` below the node's local transform
    Transform,
    /// Visits the child selected by `whichChoice`
    Switch,
    /// Visits `appearance` and `geometry` as shape descendants
    Shape,
    /// Visits `material`, `texture` and `textureTransform`
    Appearance,
    /// Checks helper nodes against their descriptors without visiting them
    Geometry(HelperFields),
    /// Visits nothing
    Basic,
}

impl Handler {
    /// Picks the handler for a canonical node name
    pub(super) fn for_node(name: &str) -> Self {
        match name {
            "Group" | "Anchor" | "Billboard" => Handler::Group,
            "Collision" => Handler::Collision,
            "LOD" => Handler::Lod,
            "Transform" => Handler::Transform,
            "Switch" => Handler::Switch,
            "Shape" => Handler::Shape,
            "Appearance" => Handler::Appearance,
            "IndexedFaceSet" => Handler::Geometry(&[
                ("coord", "Coordinate"),
                ("color", "Color"),
                ("normal", "Normal"),
                ("texCoord", "TextureCoordinate"),
            ]),
            "IndexedLineSet" | "PointSet" => Handler::Geometry(&[
                ("coord", "Coordinate"),
                ("color", "Color"),
            ]),
            "ElevationGrid" => Handler::Geometry(&[
                ("color", "Color"),
                ("normal", "Normal"),
                ("texCoord", "TextureCoordinate"),
            ]),
            "Text" => Handler::Geometry(&[("fontStyle", "FontStyle")]),
            _ => Handler::Basic,
        }
    }

    pub(super) fn handle<'a, T>(
        self,
        t: &Traversor<'a, T>,
        view: NodeView<'a>,
        is_shape: bool,
        transform: TransformationMatrix,
    ) -> Result<ConversionContext<T>, TraversalError> {
        let mut children = vec![];
        match self {
            Handler::Group | Handler::Collision => {
                for id in view.get::<Vec<NodeId>>("children")? {
                    children.push(("children", t.traverse(id, is_shape, transform)?));
                }
            }
            Handler::Lod => {
                let level = view.get::<Vec<NodeId>>("level")?;
                if let Some(&id) = level.first() {
                    children.push(("level", t.traverse(id, is_shape, transform)?));
                }
            }
            Handler::Transform => {
                let local = TransformationMatrix::from_components(
                    view.get("translation")?,
                    view.get("rotation")?,
                    view.get("scale")?,
                    view.get("scaleOrientation")?,
                    view.get("center")?,
                );
                let world = transform.compose(&local);
                for id in view.get::<Vec<NodeId>>("children")? {
                    children.push(("children", t.traverse(id, is_shape, world)?));
                }
            }
            Handler::Switch => {
                let choice = view.get::<Vec<NodeId>>("choice")?;
                let which: i32 = view.get("whichChoice")?;
                match usize::try_from(which).ok().and_then(|i| choice.get(i)) {
                    Some(&id) => {
                        children.push(("choice", t.traverse(id, is_shape, transform)?));
                    }
                    None if which == -1 => {
                        debug!("Switch selects nothing");
                        return Ok(ConversionContext::new());
                    }
                    None => {
                        warn!(
                            "Switch index {which} is out of range for {} \
                             choice(s); selecting nothing",
                            choice.len()
                        );
                        return Ok(ConversionContext::new());
                    }
                }
            }
            Handler::Shape => {
                for field in ["appearance", "geometry"] {
                    let id: NodeId = view.get(field)?;
                    children.push((field, t.traverse(id, true, transform)?));
                }
            }
            Handler::Appearance => {
                for field in ["material", "texture", "textureTransform"] {
                    let id: NodeId = view.get(field)?;
                    children.push((field, t.traverse(id, is_shape, transform)?));
                }
            }
            Handler::Geometry(fields) => {
                let scope = t.scope();
                for &(field, desc) in fields {
                    let id: NodeId = view.get(field)?;
                    if id == NodeId::EMPTY {
                        continue;
                    }
                    if let Some(desc) = scope.catalog.get(desc) {
                        validate(scope.document, id, scope.aliases, desc)
                            .map_err(|e| {
                                TraversalError::in_node(
                                    &scope.document[id].header,
                                    e.into(),
                                )
                            })?;
                    }
                }
            }
            Handler::Basic => (),
        }
        t.act(view, children, is_shape, transform)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dispatch() {
        assert!(matches!(Handler::for_node("Anchor"), Handler::Group));
        assert!(matches!(Handler::for_node("LOD"), Handler::Lod));
        assert!(matches!(Handler::for_node("Box"), Handler::Basic));
        assert!(matches!(Handler::for_node("Coordinate"), Handler::Basic));
        let Handler::Geometry(fields) = Handler::for_node("IndexedFaceSet")
        else {
            panic!("IndexedFaceSet should check its helpers");
        };
        assert_eq!(fields.len(), 4);
    }
}
