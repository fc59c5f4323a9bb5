//! Integration tests for mesh loading
//!
//! These tests write mesh files of every supported format to a scratch
//! directory and load them back through the public API.

use meshcc::io::{LoadConfig, MeshFormat, read_triangle_mesh, read_triangle_mesh_with_config};
use meshcc::{Color, Error, Model, TriangleMesh};
use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn write_fixture(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Build a 3MF package around the given model XML
fn create_3mf(model_xml: &str) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options = SimpleFileOptions::default();

    let content_types = r##"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"##;
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(content_types.as_bytes()).unwrap();

    let rels = r##"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"##;
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(rels.as_bytes()).unwrap();

    zip.start_file("3D/3dmodel.model", options).unwrap();
    zip.write_all(model_xml.as_bytes()).unwrap();

    zip.finish().unwrap();
    buffer
}

const COLORED_PLY: &str = "ply
format ascii 1.0
comment two squares sharing an edge
element vertex 6
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
element face 2
property list uchar int vertex_indices
end_header
0 0 0 255 0 0
1 0 0 255 0 0
1 1 0 255 0 0
0 1 0 255 0 0
2 0 0 0 0 255
2 1 0 0 0 255
4 0 1 2 3
4 1 4 5 2
";

#[test]
fn test_read_colored_ply() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "squares.ply", COLORED_PLY.as_bytes());

    let mesh = read_triangle_mesh(&path).unwrap();
    assert_eq!(mesh.vertices.len(), 6);
    assert_eq!(mesh.triangles.len(), 4);
    assert!(mesh.has_vertex_colors());
    assert_eq!(mesh.vertex_colors[4], Color::from_rgb8(0, 0, 255));

    assert_eq!(
        mesh.identically_colored_connected_components(),
        vec![vec![0, 1, 2, 3], vec![4, 5]]
    );
}

#[test]
fn test_read_binary_ply() {
    let mut data = b"ply\nformat binary_little_endian 1.0\nelement vertex 3\nproperty double x\nproperty double y\nproperty double z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\nelement face 1\nproperty list uchar uint vertex_indices\nend_header\n".to_vec();
    for (x, y) in [(0.0f64, 0.0f64), (1.0, 0.0), (0.0, 1.0)] {
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(&y.to_le_bytes());
        data.extend_from_slice(&0.0f64.to_le_bytes());
        data.extend_from_slice(&[10, 20, 30]);
    }
    data.push(3);
    for i in 0u32..3 {
        data.extend_from_slice(&i.to_le_bytes());
    }

    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "tri.ply", &data);

    let mesh = read_triangle_mesh(&path).unwrap();
    assert_eq!(mesh.triangles[0].indices(), [0, 1, 2]);
    assert_eq!(
        mesh.identically_colored_connected_components(),
        vec![vec![0, 1, 2]]
    );
}

#[test]
fn test_read_obj_with_vertex_colors() {
    let obj = "o strip\nv 0 0 0 1 0 0\nv 1 0 0 0 1 0\nv 2 0 0 1 0 0\nv 0 1 0 0 1 0\nf 1 2 4\nf 2 3 4\n";
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "strip.obj", obj.as_bytes());

    let mesh = read_triangle_mesh(&path).unwrap();
    assert_eq!(
        mesh.identically_colored_connected_components(),
        vec![vec![0], vec![1, 3], vec![2]]
    );
}

#[test]
fn test_read_off_without_colors_has_no_components() {
    let off = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "plain.off", off.as_bytes());

    let mesh = read_triangle_mesh(&path).unwrap();
    assert_eq!(mesh.vertices.len(), 3);
    assert!(!mesh.has_vertex_colors());
    assert!(mesh.identically_colored_connected_components().is_empty());
}

#[test]
fn test_read_3mf_color_group() {
    let model = r##"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02" xmlns:m="http://schemas.microsoft.com/3dmanufacturing/material/2015/02">
  <resources>
    <m:colorgroup id="5">
      <m:color color="#FF0000"/>
      <m:color color="#00FF00FF"/>
    </m:colorgroup>
    <object id="1" type="model">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="0"/>
          <vertex x="1" y="0" z="0"/>
          <vertex x="0" y="1" z="0"/>
          <vertex x="1" y="1" z="0"/>
        </vertices>
        <triangles>
          <triangle v1="0" v2="1" v3="2" pid="5" p1="0" p2="0" p3="1"/>
          <triangle v1="1" v2="3" v3="2" pid="5" p1="0" p2="1" p3="1"/>
        </triangles>
      </mesh>
    </object>
  </resources>
  <build>
    <item objectid="1"/>
  </build>
</model>"##;
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "colored.3mf", &create_3mf(model));

    let mesh = read_triangle_mesh(&path).unwrap();
    assert_eq!(mesh.vertex_colors[2], Color::from_rgb8(0, 255, 0));
    assert_eq!(
        mesh.identically_colored_connected_components(),
        vec![vec![0, 1], vec![2, 3]]
    );
}

#[test]
fn test_read_3mf_without_colors() {
    let model = r##"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">
  <resources>
    <object id="1" type="model">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="0"/>
          <vertex x="1" y="0" z="0"/>
          <vertex x="0" y="1" z="0"/>
        </vertices>
        <triangles>
          <triangle v1="0" v2="1" v3="2"/>
        </triangles>
      </mesh>
    </object>
  </resources>
  <build>
    <item objectid="1"/>
  </build>
</model>"##;
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "plain.3mf", &create_3mf(model));

    let mesh = TriangleMesh::from_path(&path).unwrap();
    assert_eq!(mesh.triangles.len(), 1);
    assert!(!mesh.has_vertex_colors());

    let document = Model::from_reader(fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(document.unit, "millimeter");
    assert_eq!(document.resources.objects.len(), 1);
    assert_eq!(document.resources.objects[0].id, 1);
}

#[test]
fn test_format_override_reads_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "squares.mesh", COLORED_PLY.as_bytes());

    assert!(matches!(
        read_triangle_mesh(&path),
        Err(Error::Unsupported(_))
    ));

    let config = LoadConfig::new().with_format(MeshFormat::Ply);
    let mesh = read_triangle_mesh_with_config(&path, &config).unwrap();
    assert_eq!(mesh.vertices.len(), 6);
}

#[test]
fn test_out_of_range_index_rejected_unless_disabled() {
    let obj = "v 0 0 0 1 0 0\nv 1 0 0 1 0 0\nv 0 1 0 1 0 0\nf 1 2 5\n";
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "bad.obj", obj.as_bytes());

    let err = read_triangle_mesh(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidModel(_)));
    assert!(err.to_string().contains("Triangle 0 references vertex 4"));

    let config = LoadConfig::new().with_index_validation(false);
    let mesh = read_triangle_mesh_with_config(&path, &config).unwrap();
    assert_eq!(
        mesh.identically_colored_connected_components(),
        vec![vec![0, 1], vec![2]]
    );
}

#[test]
fn test_not_a_zip_is_zip_error() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "broken.3mf", b"definitely not a zip archive");
    assert!(matches!(read_triangle_mesh(&path), Err(Error::Zip(_))));
}
