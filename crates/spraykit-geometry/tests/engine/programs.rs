use spraykit_core::Point3D;
use spraykit_geometry::{
    find_matching_primitive, normalize_all, AngularResolution, CadEntity, CadShape,
    Configuration, Nozzle, ProgramFile, Trajectory,
};

fn drawing() -> Vec<CadEntity> {
    vec![
        CadEntity::new(
            "edges",
            CadShape::Line {
                start: Point3D::xy(0.0, 0.0),
                end: Point3D::xy(300.0, 0.0),
            },
        ),
        CadEntity::new(
            "edges",
            CadShape::Arc {
                center: Point3D::xy(300.0, 50.0),
                radius: 50.0,
                start_angle_deg: 270.0,
                end_angle_deg: 90.0,
            },
        ),
        CadEntity::new(
            "holes",
            CadShape::Circle {
                center: Point3D::xy(150.0, 50.0),
                radius: 20.0,
            },
        ),
        CadEntity::new(
            "outline",
            CadShape::Polyline {
                vertices: vec![
                    (Point3D::xy(400.0, 400.0), 0.0),
                    (Point3D::xy(10.0, 400.0), 0.0),
                    (Point3D::xy(10.0, 10.0), 0.0),
                    (Point3D::xy(400.0, 10.0), 0.0),
                ],
                closed: true,
                elevation: 20.0,
            },
        ),
    ]
}

fn configuration() -> Configuration {
    let mut configuration = Configuration::new();
    let index = configuration.add_pass("primer");
    let pass = configuration.pass_mut(index).unwrap();
    for primitive in normalize_all(&drawing(), AngularResolution::default()) {
        let mut trajectory = Trajectory::new(primitive);
        trajectory.set_liquid(Nozzle::Upper, true);
        pass.add_trajectory(trajectory);
    }
    configuration
}

#[test]
fn test_drawing_to_configuration() {
    let configuration = configuration();
    assert!(configuration.validate_for_send().is_ok());
    // line + arc + circle + four polygon edges
    assert_eq!(configuration.total_primitive_count(), 7);

    let pass = configuration.pass(0).unwrap();
    let outline = pass.trajectory(3).unwrap();
    assert_eq!(outline.points()[0], Point3D::new(10.0, 10.0, 20.0));
    assert_eq!(outline.nozzles().status_code(), 1100);
}

#[test]
fn test_program_round_trip_keeps_edits() {
    let mut configuration = configuration();
    {
        let pass = configuration.pass_mut(0).unwrap();
        let arc = pass.trajectory_mut(1).unwrap();
        arc.set_reversed(true);
        arc.set_runtime(12.5).unwrap();
        pass.move_trajectory(2, 0).unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panel.spray");
    ProgramFile::new("panel", configuration.clone())
        .save_to_file(&path)
        .unwrap();
    let loaded = ProgramFile::load_from_file(&path).unwrap();

    assert_eq!(loaded.configuration, configuration);
    let arc = loaded.configuration.pass(0).unwrap().trajectory(2).unwrap();
    assert!(arc.is_reversed());
    assert_eq!(arc.runtime(), 12.5);
}

#[test]
fn test_trajectories_rematch_reimported_drawing() {
    let configuration = configuration();
    let reimported = normalize_all(&drawing(), AngularResolution::default());

    for (index, trajectory) in configuration.pass(0).unwrap().trajectories().iter().enumerate() {
        assert_eq!(
            find_matching_primitive(&reimported, trajectory.primitive(), 1e-6),
            Some(index)
        );
    }
}
