//! Actions of the mesh conversion pass
use super::{ActionInput, ActionMap, merge_children};
use crate::{
    calc::{
        BoxCalculator, IndexedFaceSetCalculator, IndexedLineSetCalculator,
        IndexedTriangularFaceSetCalculator,
    },
    context::ConversionContext,
    error::TraversalError,
    parser::{NodeId, Vec3f},
    task::MeshTask,
    transform::TransformationMatrix,
    traverse::Traversor,
};
use log::debug;

/// Builds the action map that turns a scene into [`MeshTask`]s
///
/// Grouping nodes concatenate their children, `Shape` forwards its geometry
/// and `Switch` its selected choice.  Geometry nodes produce one task each,
/// but only below a `Shape`; elsewhere they are inert.
pub fn to_geom_actions() -> ActionMap<MeshTask> {
    let mut map: ActionMap<MeshTask> = ActionMap::new();
    for node in [
        "Group",
        "Anchor",
        "Billboard",
        "Collision",
        "LOD",
        "Transform",
    ] {
        map.insert(node, merge_children);
    }
    map.insert("Shape", |mut input| Ok(input.take("geometry")));
    map.insert("Switch", |mut input| Ok(input.take("choice")));
    map.insert("Box", box_action);

    let coords = coordinate_actions();
    map.insert("IndexedFaceSet", move |input| {
        indexed_face_set_action(input, &coords)
    });
    let coords = coordinate_actions();
    map.insert("IndexedLineSet", move |input| {
        indexed_line_set_action(input, &coords)
    });
    map
}

/// Builds the single-entry map which extracts a `Coordinate` node's points
pub fn coordinate_actions() -> ActionMap<Vec3f> {
    ActionMap::<Vec3f>::new().with("Coordinate", |input| {
        let points = input.view.get::<&[Vec3f]>("point")?;
        Ok(points.iter().copied().collect())
    })
}

fn box_action(
    input: ActionInput<'_, MeshTask>,
) -> Result<ConversionContext<MeshTask>, TraversalError> {
    if !input.is_shape_descendant {
        debug!("Box outside of a Shape; ignoring it");
        return Ok(ConversionContext::new());
    }
    let calc = BoxCalculator {
        size: input.view.get("size")?,
        transform: input.transform,
    };
    let label = format!("Box {:?}", input.view.id());
    Ok(MeshTask::new(label, move || calc.calculate()).into())
}

/// Runs a throwaway traversal of the `Coordinate` node held in `field`
fn points(
    input: &ActionInput<'_, MeshTask>,
    coords: &ActionMap<Vec3f>,
    field: &str,
) -> Result<Vec<Vec3f>, TraversalError> {
    let id: NodeId = input.view.get(field)?;
    Traversor::new(input.scope, coords)
        .traverse(id, false, TransformationMatrix::identity())
        .map(ConversionContext::into_inner)
        .map_err(|e| TraversalError::Action {
            node: input.view.header().to_owned(),
            field: field.to_owned(),
            source: Box::new(e),
        })
}

fn indexed_face_set_action(
    input: ActionInput<'_, MeshTask>,
    coords: &ActionMap<Vec3f>,
) -> Result<ConversionContext<MeshTask>, TraversalError> {
    if !input.is_shape_descendant {
        debug!("IndexedFaceSet outside of a Shape; ignoring it");
        return Ok(ConversionContext::new());
    }
    let points = points(&input, coords, "coord")?;
    if points.is_empty() {
        debug!("IndexedFaceSet without coordinates; ignoring it");
        return Ok(ConversionContext::new());
    }
    let indices = input.view.get::<&[i32]>("coordIndex")?.to_vec();
    let cfg = &input.scope.config.indexed_face_set;
    let label = format!("IndexedFaceSet {:?}", input.view.id());
    let task = if cfg.only_triangular_faces {
        let calc = IndexedTriangularFaceSetCalculator {
            points,
            indices,
            check_range: cfg.check_range,
            transform: input.transform,
        };
        MeshTask::new(label, move || calc.calculate())
    } else {
        let calc = IndexedFaceSetCalculator {
            points,
            indices,
            convex: input.view.get("convex")?,
            check_range: cfg.check_range,
            transform: input.transform,
        };
        MeshTask::new(label, move || calc.calculate())
    };
    Ok(task.into())
}

fn indexed_line_set_action(
    input: ActionInput<'_, MeshTask>,
    coords: &ActionMap<Vec3f>,
) -> Result<ConversionContext<MeshTask>, TraversalError> {
    if !input.is_shape_descendant {
        debug!("IndexedLineSet outside of a Shape; ignoring it");
        return Ok(ConversionContext::new());
    }
    let points = points(&input, coords, "coord")?;
    if points.is_empty() {
        debug!("IndexedLineSet without coordinates; ignoring it");
        return Ok(ConversionContext::new());
    }
    let calc = IndexedLineSetCalculator {
        points,
        indices: input.view.get::<&[i32]>("coordIndex")?.to_vec(),
        transform: input.transform,
    };
    let label = format!("IndexedLineSet {:?}", input.view.id());
    Ok(MeshTask::new(label, move || calc.calculate()).into())
}
