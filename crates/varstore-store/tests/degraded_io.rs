//! Missing data, failing backends, and the output switch.

use std::sync::Arc;

use tracing::Level;
use varstore_core::{Field2D, Field3D, Persistence, RecordIndex, Shared, Vector3D};
use varstore_format::{MemoryBackend, MemoryVolumes};
use varstore_store::{IoContext, StoreError, VariableStore};
use varstore_test_utils::{
    capture_logs, count_level, ramp_field3d, small_mesh, Call, FaultyBackend, RecordingBackend,
};

#[test]
fn unallocated_field_is_skipped_then_zero_filled() {
    let volumes = MemoryVolumes::new();
    let mesh = small_mesh();
    let backend = RecordingBackend::with_volumes(volumes.clone());
    let log = backend.log();
    let mut s = VariableStore::new(Box::new(backend), mesh.clone(), Arc::new(IoContext::new()));
    let empty = Shared::new(Field3D::new());
    let full = Shared::new(ramp_field3d(&mesh, 0.0));
    s.add_field3d(&empty, "empty", false).unwrap();
    s.add_field3d(&full, "full", false).unwrap();

    s.write("skip").unwrap();
    assert_eq!(log.written_names(), ["full"]);
    assert!(!volumes.get("skip").unwrap().contains("empty"));

    let (report, logs) = capture_logs(|| s.read("skip"));
    let report = report.unwrap();
    assert_eq!(report.zeroed, ["empty"]);
    assert_eq!(report.loaded, ["full"]);
    assert_eq!(empty.get(), Field3D::filled(&mesh, 0.0));
    assert_eq!(count_level(&logs, Level::WARN), 1);
    assert!(logs.contains("empty"));
}

#[test]
fn disabled_write_touches_nothing() {
    let backend = RecordingBackend::new();
    let log = backend.log();
    let ctx = Arc::new(IoContext::new());
    let mut s = VariableStore::new(Box::new(backend), small_mesh(), Arc::clone(&ctx));
    s.add_int(&Shared::new(1), "i", false).unwrap();

    ctx.set_enabled(false);
    s.write("off").unwrap();
    s.append("off").unwrap();
    assert!(log.is_empty());
    assert_eq!(ctx.io_time(), std::time::Duration::ZERO);

    ctx.set_enabled(true);
    s.write("on").unwrap();
    assert!(!log.is_empty());
}

#[test]
fn disabled_context_still_reads() {
    let volumes = MemoryVolumes::new();
    let ctx = Arc::new(IoContext::new());
    let backend = Box::new(MemoryBackend::new(volumes.clone()));
    let mut s = VariableStore::new(backend, small_mesh(), Arc::clone(&ctx));
    let i = Shared::new(5);
    s.add_int(&i, "i", false).unwrap();
    s.write("d").unwrap();

    ctx.set_enabled(false);
    i.set(0);
    s.read("d").unwrap();
    assert_eq!(i.get(), 5);
}

#[test]
fn one_failing_scalar_among_five() {
    let volumes = MemoryVolumes::new();
    let mesh = small_mesh();
    let names = ["a", "b", "c", "d", "e"];
    let values: Vec<_> = (0..5).map(|i| Shared::new(i as f64 + 1.0)).collect();

    let mut writer = VariableStore::new(
        Box::new(MemoryBackend::new(volumes.clone())),
        mesh.clone(),
        Arc::new(IoContext::new()),
    );
    for (name, v) in names.iter().zip(&values) {
        writer.add_real(v, name, false).unwrap();
    }
    writer.write("partial").unwrap();

    let faulty = FaultyBackend::with_volumes(volumes).fail_reads_of("c");
    let mut reader = VariableStore::new(Box::new(faulty), mesh, Arc::new(IoContext::new()));
    let targets: Vec<_> = (0..5).map(|_| Shared::new(-1.0)).collect();
    for (name, t) in names.iter().zip(&targets) {
        reader.add_real(t, name, false).unwrap();
    }

    let (report, logs) = capture_logs(|| reader.read("partial"));
    let report = report.unwrap();
    assert_eq!(report.zeroed, ["c"]);
    assert_eq!(report.loaded, ["a", "b", "d", "e"]);
    let got: Vec<f64> = targets.iter().map(Shared::get).collect();
    assert_eq!(got, [1.0, 2.0, 0.0, 4.0, 5.0]);
    assert_eq!(count_level(&logs, Level::WARN), 1);
    assert!(logs.contains("injected read failure"));
}

#[test]
fn failing_vector_component_zeroes_only_that_component() {
    let volumes = MemoryVolumes::new();
    let mesh = small_mesh();
    let mut writer = VariableStore::new(
        Box::new(MemoryBackend::new(volumes.clone())),
        mesh.clone(),
        Arc::new(IoContext::new()),
    );
    let v = Shared::new(Vector3D::filled(&mesh, [1.0, 2.0, 3.0], false));
    writer.add_vector3d(&v, "J", false).unwrap();
    writer.write("vec").unwrap();

    let faulty = FaultyBackend::with_volumes(volumes).fail_reads_of("Jy");
    let mut reader = VariableStore::new(Box::new(faulty), mesh.clone(), Arc::new(IoContext::new()));
    let back = Shared::new(Vector3D::new(false));
    reader.add_vector3d(&back, "J", false).unwrap();
    let report = reader.read("vec").unwrap();

    assert_eq!(report.zeroed, ["Jy"]);
    let back = back.get();
    assert_eq!(back.x, Field3D::filled(&mesh, 1.0));
    assert_eq!(back.y, Field3D::filled(&mesh, 0.0));
    assert_eq!(back.z, Field3D::filled(&mesh, 3.0));
}

#[test]
fn mismatched_shape_is_zero_filled() {
    let volumes = MemoryVolumes::new();
    let big = varstore_core::Mesh::new(8, 8, 1).unwrap();
    let mut writer = VariableStore::new(
        Box::new(MemoryBackend::new(volumes.clone())),
        big.clone(),
        Arc::new(IoContext::new()),
    );
    writer
        .add_field2d(&Shared::new(Field2D::filled(&big, 7.0)), "psi", false)
        .unwrap();
    writer.write("shape").unwrap();

    let mesh = small_mesh();
    let mut reader = VariableStore::new(
        Box::new(MemoryBackend::new(volumes)),
        mesh.clone(),
        Arc::new(IoContext::new()),
    );
    let psi = Shared::new(Field2D::new());
    reader.add_field2d(&psi, "psi", false).unwrap();
    let report = reader.read("shape").unwrap();
    assert_eq!(report.zeroed, ["psi"]);
    assert_eq!(psi.get(), Field2D::filled(&mesh, 0.0));
}

#[test]
fn open_failure_aborts_without_close() {
    let faulty =
        RecordingBackend::wrap(FaultyBackend::with_volumes(MemoryVolumes::new()).fail_open());
    let log = faulty.log();
    let ctx = Arc::new(IoContext::new());
    let mut s = VariableStore::new(Box::new(faulty), small_mesh(), Arc::clone(&ctx));
    s.add_int(&Shared::new(1), "i", false).unwrap();

    let err = s.write("nope").unwrap_err();
    assert!(matches!(err, StoreError::Open { .. }));
    assert!(!log.calls().contains(&Call::Close));
    assert_eq!(ctx.io_time(), std::time::Duration::ZERO);
}

#[test]
fn invalid_handle_is_closed_and_reported() {
    let faulty =
        RecordingBackend::wrap(FaultyBackend::with_volumes(MemoryVolumes::new()).report_invalid());
    let log = faulty.log();
    let mut s = VariableStore::new(Box::new(faulty), small_mesh(), Arc::new(IoContext::new()));
    s.add_int(&Shared::new(1), "i", false).unwrap();

    let err = s.write("bad").unwrap_err();
    assert!(matches!(err, StoreError::InvalidBackend { .. }));
    let calls = log.calls();
    assert_eq!(calls.last(), Some(&Call::Close));
    assert!(!calls.iter().any(Call::is_write));
}

#[test]
fn write_pass_call_sequence() {
    let mesh = small_mesh();
    let backend = RecordingBackend::new();
    let log = backend.log();
    let mut s = VariableStore::new(Box::new(backend), mesh.clone(), Arc::new(IoContext::new()));
    s.add_field2d(&Shared::new(Field2D::filled(&mesh, 1.0)), "f", false)
        .unwrap();
    s.add_int(&Shared::new(3), "n", true).unwrap();
    s.append("seq").unwrap();

    let calls = log.calls();
    assert_eq!(
        calls[..3],
        [
            Call::OpenWrite {
                path: "seq".into(),
                append: true
            },
            Call::IsValid,
            Call::SetRecord(RecordIndex::Latest),
        ]
    );
    assert_eq!(
        calls[3],
        Call::WriteInt {
            name: "n".to_string(),
            value: 3,
            persistence: Persistence::Grow
        }
    );
    assert_eq!(
        calls[4],
        Call::WriteArray {
            name: "f".to_string(),
            dims: vec![4, 3],
            persistence: Persistence::Fixed
        }
    );
    assert_eq!(calls[5], Call::Close);
    assert_eq!(calls.len(), 6);
}
