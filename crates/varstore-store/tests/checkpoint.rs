//! Round trips through the bundled backends.

use std::sync::Arc;

use varstore_core::{Field2D, Field3D, Metric, Mesh, Shared, Vector2D, Vector3D};
use varstore_format::{MemoryBackend, MemoryVolumes};
use varstore_store::{IoContext, StoreConfig, VariableStore};
use varstore_test_utils::{
    ramp_field2d, ramp_field3d, ramp_vector2d, ramp_vector3d, small_mesh, RecordingBackend,
};

fn memory_store(volumes: &MemoryVolumes, mesh: Mesh) -> VariableStore {
    let backend = Box::new(MemoryBackend::new(volumes.clone()));
    VariableStore::new(backend, mesh, Arc::new(IoContext::new()))
}

#[test]
fn scalar_field_and_vector_roundtrip() {
    let volumes = MemoryVolumes::new();
    let mesh = small_mesh();

    let mut writer = memory_store(&volumes, mesh.clone());
    let nout = Shared::new(42);
    let n = Shared::new(ramp_field2d(&mesh, 1.0));
    let b = Shared::new(ramp_vector3d(&mesh, true));
    writer.add_int(&nout, "nout", false).unwrap();
    writer.add_field2d(&n, "n", false).unwrap();
    writer.add_vector3d(&b, "B", false).unwrap();
    writer.write("restart").unwrap();

    let mut reader = memory_store(&volumes, mesh.clone());
    let nout2 = Shared::new(0);
    let n2 = Shared::new(Field2D::new());
    let b2 = Shared::new(Vector3D::new(true));
    reader.add_int(&nout2, "nout", false).unwrap();
    reader.add_field2d(&n2, "n", false).unwrap();
    reader.add_vector3d(&b2, "B", false).unwrap();
    let report = reader.read("restart").unwrap();

    assert!(report.is_complete());
    assert_eq!(report.loaded, ["nout", "n", "B_x", "B_y", "B_z"]);
    assert_eq!(nout2.get(), 42);
    assert_eq!(n2.get(), n.get());
    assert_eq!(b2.get(), b.get());
    assert!(b2.lock().covariant);
}

#[test]
fn time_series_latest_is_last_write() {
    let volumes = MemoryVolumes::new();
    let mesh = small_mesh();
    let mut s = memory_store(&volumes, mesh.clone());
    let t = Shared::new(0.0);
    let f = Shared::new(Field3D::new());
    s.add_real(&t, "t_array", true).unwrap();
    s.add_field3d(&f, "Ni", true).unwrap();

    for step in 1..=5 {
        t.set(step as f64 * 0.5);
        f.set(Field3D::filled(&mesh, step as f64));
        if step == 1 {
            s.write("dump").unwrap();
        } else {
            s.append("dump").unwrap();
        }
    }
    let stored = volumes.get("dump").unwrap();
    assert_eq!(stored.get("t_array").unwrap().record_count(), 5);
    assert_eq!(stored.get("Ni").unwrap().record_count(), 5);

    t.set(-1.0);
    f.set(Field3D::new());
    s.read("dump").unwrap();
    assert_eq!(t.get(), 2.5);
    assert_eq!(f.get(), Field3D::filled(&mesh, 5.0));
}

#[test]
fn overwrite_restarts_time_series() {
    let volumes = MemoryVolumes::new();
    let mut s = memory_store(&volumes, small_mesh());
    let it = Shared::new(0);
    s.add_int(&it, "iteration", true).unwrap();
    s.write("d").unwrap();
    s.append("d").unwrap();
    s.write("d").unwrap();
    let records = volumes.get("d").unwrap().get("iteration").unwrap().record_count();
    assert_eq!(records, 1);
}

#[test]
fn vector_components_use_basis_suffixes() {
    let mesh = small_mesh();
    let backend = RecordingBackend::new();
    let log = backend.log();
    let mut s = VariableStore::new(Box::new(backend), mesh.clone(), Arc::new(IoContext::new()));
    s.add_vector2d(&Shared::new(ramp_vector2d(&mesh, true)), "v", false)
        .unwrap();
    s.add_vector3d(&Shared::new(ramp_vector3d(&mesh, false)), "w", false)
        .unwrap();
    s.write("names").unwrap();
    assert_eq!(log.written_names(), ["v_x", "v_y", "v_z", "wx", "wy", "wz"]);
}

#[test]
fn vector_written_in_registered_basis_without_touching_caller() {
    let volumes = MemoryVolumes::new();
    let metric = Metric::new(2.0, 4.0, 0.5).unwrap();
    let mesh = Mesh::new(2, 2, 1).unwrap().with_metric(metric);
    let mut s = memory_store(&volumes, mesh.clone());

    // Registered covariant, then flipped by the caller before the write.
    let v = Shared::new(Vector2D::filled(&mesh, [1.0, 1.0, 1.0], true));
    s.add_vector2d(&v, "v", false).unwrap();
    v.lock().covariant = false;
    s.write("basis").unwrap();

    let caller = v.get();
    assert!(!caller.covariant);
    assert_eq!(caller.x, Field2D::filled(&mesh, 1.0));

    let stored = volumes.get("basis").unwrap();
    assert_eq!(stored.get("v_x").unwrap().latest(), Some(&[2.0; 4][..]));
    assert_eq!(stored.get("v_y").unwrap().latest(), Some(&[4.0; 4][..]));
    assert_eq!(stored.get("v_z").unwrap().latest(), Some(&[0.5; 4][..]));

    // Reads restore the registered basis flag without converting values.
    let mut r = memory_store(&volumes, mesh.clone());
    let back = Shared::new(Vector2D::new(true));
    r.add_vector2d(&back, "v", false).unwrap();
    back.lock().covariant = false;
    r.read("basis").unwrap();
    let back = back.get();
    assert!(back.covariant);
    assert_eq!(back.x, Field2D::filled(&mesh, 2.0));
}

#[test]
fn file_backend_from_config_roundtrip() {
    let path = std::env::temp_dir().join(format!(
        "varstore-store-{}-file-roundtrip.vsf",
        std::process::id()
    ));
    let path = path.to_string_lossy().into_owned();
    let mesh = small_mesh();
    let config = StoreConfig::default().with_default_path(path.clone());

    let mut s = VariableStore::from_config(&config, mesh.clone(), Arc::new(IoContext::new()))
        .unwrap();
    let phi = Shared::new(ramp_field3d(&mesh, -3.0));
    let dt = Shared::new(1e-3);
    s.add_field3d(&phi, "phi", false).unwrap();
    s.add_real(&dt, "dt", false).unwrap();
    s.write_default().unwrap();

    phi.set(Field3D::new());
    dt.set(0.0);
    let report = s.read_default().unwrap();
    let _ = std::fs::remove_file(&path);

    assert!(report.is_complete());
    assert_eq!(phi.get(), ramp_field3d(&mesh, -3.0));
    assert_eq!(dt.get(), 1e-3);
}

#[test]
fn low_precision_file_output() {
    let path = std::env::temp_dir().join(format!(
        "varstore-store-{}-low-precision.vsf",
        std::process::id()
    ));
    let path = path.to_string_lossy().into_owned();
    let mesh = small_mesh();
    let config = StoreConfig::default().with_low_precision(true);
    let mut s = VariableStore::from_config(&config, mesh.clone(), Arc::new(IoContext::new()))
        .unwrap();
    let x = Shared::new(0.1);
    s.add_real(&x, "x", false).unwrap();
    s.write(&path).unwrap();
    x.set(0.0);
    let report = s.read(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert!(report.is_complete());
    assert_eq!(x.get(), 0.1f32 as f64);
}

#[test]
fn memory_format_shares_datasets_between_stores() {
    let mesh = small_mesh();
    let name = format!("shared-memory-{}", std::process::id());
    let cfg = StoreConfig::default().with_format("memory");

    let mut a =
        VariableStore::from_config(&cfg, mesh.clone(), Arc::new(IoContext::new())).unwrap();
    a.add_int(&Shared::new(9), "k", false).unwrap();
    a.write(&name).unwrap();

    let mut b = VariableStore::from_config(&cfg, mesh, Arc::new(IoContext::new())).unwrap();
    let k = Shared::new(0);
    b.add_int(&k, "k", false).unwrap();
    b.read(&name).unwrap();
    MemoryVolumes::global().remove(&name);
    assert_eq!(k.get(), 9);
}
