use approx::assert_relative_eq;
use vrmlx::{
    Error,
    config::Config,
    convert::Converter,
    error::{TraversalError, ValidationError, innermost},
    executor::Executor,
    mesh::{Mesh, output::ExportFormat},
    parser,
};

const CUBE_POINTS: &str = "
    0 0 0, 1 0 0, 1 1 0, 0 1 0,
    0 0 1, 1 0 1, 1 1 1, 0 1 1";

fn convert(body: &str) -> Result<Mesh, Error> {
    convert_with(Config::default(), body)
}

fn convert_with(config: Config, body: &str) -> Result<Mesh, Error> {
    let conv = Converter::new(config)?;
    conv.convert_str(&format!("#VRML V2.0 utf8\n{body}"))
}

fn bounds(mesh: &Mesh) -> ([f32; 3], [f32; 3]) {
    let mut lo = [f32::INFINITY; 3];
    let mut hi = [f32::NEG_INFINITY; 3];
    for v in &mesh.vertices {
        for i in 0..3 {
            lo[i] = lo[i].min(v[i]);
            hi[i] = hi[i].max(v[i]);
        }
    }
    (lo, hi)
}

#[test]
fn cube_from_quads() {
    let mesh = convert(&format!(
        "Shape {{ geometry IndexedFaceSet {{
            coord Coordinate {{ point [ {CUBE_POINTS} ] }}
            coordIndex [
                0 3 2 1 -1, 4 5 6 7 -1, 0 1 5 4 -1,
                1 2 6 5 -1, 2 3 7 6 -1, 3 0 4 7 -1
            ]
        }} }}"
    ))
    .unwrap();
    assert_eq!(mesh.vertices.len(), 8);
    assert_eq!(mesh.triangles.len(), 12);
    assert_eq!(bounds(&mesh), ([0.0; 3], [1.0; 3]));
}

#[test]
fn triangular_fast_path_matches_general_path() {
    let body = format!(
        "Shape {{ geometry IndexedFaceSet {{
            coord Coordinate {{ point [ {CUBE_POINTS} ] }}
            coordIndex [
                0 3 2 -1, 0 2 1 -1, 4 5 6 -1, 4 6 7 -1,
                0 1 5 -1, 0 5 4 -1, 1 2 6 -1, 1 6 5 -1,
                2 3 7 -1, 2 7 6 -1, 3 0 4 -1, 3 4 7 -1
            ]
        }} }}"
    );
    let general = convert(&body).unwrap();

    let mut config = Config::default();
    config.indexed_face_set.only_triangular_faces = true;
    let fast = convert_with(config, &body).unwrap();

    assert_eq!(general.triangles.len(), 12);
    assert_eq!(general, fast);
}

#[test]
fn translation_moves_vertices() {
    let mesh = convert(
        "Transform {
            translation 10 0 -3
            children Shape { geometry Box { size 2 2 2 } }
        }",
    )
    .unwrap();
    let (lo, hi) = bounds(&mesh);
    assert_eq!(lo, [9.0, -1.0, -4.0]);
    assert_eq!(hi, [11.0, 1.0, -2.0]);
}

#[test]
fn nested_transforms_apply_innermost_first() {
    let mesh = convert(
        "Transform {
            translation 1 0 0
            children Transform {
                scale 2 2 2
                children Shape { geometry Box {} }
            }
        }",
    )
    .unwrap();
    let (lo, hi) = bounds(&mesh);
    assert_eq!(lo, [-1.0, -2.0, -2.0]);
    assert_eq!(hi, [3.0, 2.0, 2.0]);
}

#[test]
fn rotation_about_z() {
    let mesh = convert(
        "Transform {
            rotation 0 0 1 1.5707964
            children Shape { geometry Box { size 2 4 6 } }
        }",
    )
    .unwrap();
    let (lo, hi) = bounds(&mesh);
    assert_relative_eq!(hi[0], 2.0, epsilon = 1e-5);
    assert_relative_eq!(hi[1], 1.0, epsilon = 1e-5);
    assert_relative_eq!(hi[2], 3.0, epsilon = 1e-5);
    assert_relative_eq!(lo[0], -2.0, epsilon = 1e-5);
}

#[test]
fn reused_shape_produces_one_mesh_per_use() {
    let mesh = convert(
        "DEF B Shape { geometry Box {} }
        Transform {
            translation 5 0 0
            children [ USE B ]
        }",
    )
    .unwrap();
    assert_eq!(mesh.vertices.len(), 16);
    assert_eq!(mesh.triangles.len(), 24);
    let (lo, hi) = bounds(&mesh);
    assert_eq!(lo[0], -1.0);
    assert_eq!(hi[0], 6.0);
}

#[test]
fn shared_coordinates() {
    let mesh = convert(&format!(
        "Shape {{ geometry IndexedFaceSet {{
            coord DEF C Coordinate {{ point [ {CUBE_POINTS} ] }}
            coordIndex [ 0 1 2 -1 ]
        }} }}
        Shape {{ geometry IndexedFaceSet {{
            coord USE C
            coordIndex [ 4 5 6 -1 ]
        }} }}"
    ))
    .unwrap();
    assert_eq!(mesh.triangles.len(), 2);
    assert_eq!(mesh.vertices.len(), 6);
}

#[test]
fn geometry_outside_shape_is_ignored() {
    let mesh = convert("Group { children [ Box {} ] }").unwrap();
    assert!(mesh.is_empty());
}

#[test]
fn missing_def_is_a_validation_error() {
    let e = convert("Group { children [ USE Nowhere ] }").unwrap_err();
    assert!(matches!(e, Error::TraversalError(..)));
    let root = innermost(&e);
    assert_eq!(
        root.downcast_ref::<ValidationError>(),
        Some(&ValidationError::MissingDefNodeForUseNode {
            field: "children".to_owned(),
            alias: "Nowhere".to_owned(),
        })
    );
}

#[test]
fn self_referencing_use_is_an_error() {
    let e = convert(
        "DEF Root Transform {
            translation 1 0 0
            children [
                Shape { geometry Box {} }
                Group { children [ USE Root ] }
            ]
        }",
    )
    .unwrap_err();
    assert!(matches!(e, Error::TraversalError(..)));
    assert_eq!(
        innermost(&e).to_string(),
        "node <Root> is used inside of itself"
    );
    assert!(matches!(
        innermost(&e).downcast_ref::<TraversalError>(),
        Some(TraversalError::CyclicUseNode { alias }) if alias == "Root"
    ));
}

#[test]
fn null_appearance() {
    let mesh = convert("Shape { appearance NULL geometry Box {} }").unwrap();
    assert_eq!(mesh.triangles.len(), 12);
}

#[test]
fn unknown_nodes() {
    let body = "Group { children [
        Frobnicator { spin 3 }
        Shape { geometry Box {} }
    ] }";
    assert!(convert(body).is_err());

    let mut config = Config::default();
    config.ignore_unknown_node = true;
    let mesh = convert_with(config, body).unwrap();
    assert_eq!(mesh.triangles.len(), 12);
}

#[test]
fn switch_out_of_range_selects_nothing() {
    let mesh = convert(
        "Switch {
            whichChoice 4
            choice [ Shape { geometry Box {} } ]
        }",
    )
    .unwrap();
    assert!(mesh.is_empty());

    let mesh = convert(
        "Switch {
            whichChoice 0
            choice [ Shape { geometry Box {} } ]
        }",
    )
    .unwrap();
    assert_eq!(mesh.triangles.len(), 12);
}

#[test]
fn failed_task_does_not_spoil_the_rest() {
    let mesh = convert(
        "Shape { geometry Box { size 0 1 1 } }
        Shape { geometry IndexedFaceSet {
            coord Coordinate { point [ 0 0 0, 1 0 0, 0 1 0 ] }
            coordIndex [ 0 1 9 -1 ]
        } }
        Shape { geometry Box { size 1 1 1 } }",
    )
    .unwrap();
    assert_eq!(mesh.vertices.len(), 8);
    assert_eq!(mesh.triangles.len(), 12);
}

#[test]
fn unchecked_range_skips_bad_faces() {
    let body = "Shape { geometry IndexedFaceSet {
        coord Coordinate { point [ 0 0 0, 1 0 0, 0 1 0 ] }
        coordIndex [ 0 1 9 -1, 0 1 2 -1 ]
    } }";
    assert!(convert(body).unwrap().is_empty());

    let mut config = Config::default();
    config.indexed_face_set.check_range = false;
    let mesh = convert_with(config, body).unwrap();
    assert_eq!(mesh.triangles.len(), 1);
}

#[test]
fn thread_count_does_not_change_output() {
    let mut body = String::new();
    for i in 0..40 {
        body += &format!(
            "Transform {{
                translation {i} 0 0
                children Shape {{ geometry Box {{ size 0.5 {} 0.5 }} }}
            }}\n",
            1 + i % 3
        );
    }
    let text = format!("#VRML V2.0 utf8\n{body}");
    let mut conv = Converter::new(Config::default()).unwrap();

    conv.set_executor(Executor::new(1).unwrap());
    let a = conv.convert_str(&text).unwrap();
    conv.set_executor(Executor::new(4).unwrap());
    let b = conv.convert_str(&text).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.triangles.len(), 40 * 12);
}

#[test]
fn binary_stl_size() {
    let mesh = convert("Shape { geometry Box {} }").unwrap();
    let mut out = vec![];
    mesh.write(&mut out, ExportFormat::Stl, true).unwrap();
    assert_eq!(out.len(), 84 + 50 * 12);
}

#[test]
fn parse_errors_are_reported() {
    let e = Converter::new(Config::default())
        .unwrap()
        .convert_str("#VRML V2.0 utf8\nShape { geometry Box { size 1 1 1 }")
        .unwrap_err();
    assert!(matches!(e, Error::ParseError(..)));

    assert!(parser::parse_str("Shape {}").is_err());
}
