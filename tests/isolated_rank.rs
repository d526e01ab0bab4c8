mod util;

use mesh_halo::prelude::*;
use util::distribute_on;

/// Two unit cubes that share nothing: cell 0 and cell 1 live in separate components.
fn two_islands() -> GlobalGrid {
    let cube = cartesian_box(1, 1, 1).unwrap();
    let (nf, np) = (cube.num_faces(), cube.num_points());
    let shift_faces = |off: usize| {
        cube.cell_to_face()
            .rows()
            .map(move |r| r.iter().map(move |f| f.with_index(f.index() + off)).collect::<Vec<_>>())
    };
    let cell_to_face = SparseTable::from_rows(shift_faces(0).chain(shift_faces(nf)));
    let face_to_cell = SparseTable::from_rows(
        (0..2).flat_map(|c| {
            cube.face_to_cell()
                .rows()
                .map(move |r| r.iter().map(move |e| e.with_index(e.index() + c)).collect::<Vec<_>>())
        }),
    );
    let face_to_point = SparseTable::from_rows((0..2).flat_map(|c| {
        cube.face_to_point()
            .rows()
            .map(move |r| r.iter().map(move |p| p + c * np).collect::<Vec<_>>())
    }));
    let mut cell_to_point = cube.cell_to_point().to_vec();
    cell_to_point.push(cube.cell_to_point()[0].map(|p| p + np));
    GlobalGrid::new(cell_to_face, face_to_cell, face_to_point, cell_to_point, 2 * np).unwrap()
}

#[test]
fn isolated_rank_completes_with_empty_round() {
    let grid = two_islands();
    let ranks = distribute_on(2, &grid, &[0, 1], &DistributionConfig::default());
    for (rank, local) in ranks.iter().enumerate() {
        assert_eq!(local.num_cells(), 1);
        assert_eq!(local.num_points(), 8);
        let all_all = local.cell_interface(InterfaceCategory::AllAll).unwrap();
        assert!(all_all.send_to(1 - rank).is_empty());
        assert!(all_all.receive_from(1 - rank).is_empty());
        assert!(local.remote_indices().is_synced());
        assert!(
            local
                .partition_types(Codim::Point)
                .iter()
                .all(|&t| t == PartitionType::Interior)
        );
        for category in InterfaceCategory::ALL {
            assert!(local.point_interface(category).unwrap().is_empty());
        }
    }
}

#[test]
fn ranks_without_common_cells_do_not_talk() {
    let grid = cartesian_box(6, 1, 1).unwrap();
    let ranks = distribute_on(3, &grid, &[0, 0, 1, 1, 2, 2], &DistributionConfig::default());
    let all_all = ranks[0].cell_interface(InterfaceCategory::AllAll).unwrap();
    assert_eq!(all_all.neighbours().collect::<Vec<_>>(), vec![1]);
    assert!(ranks[0].point_attributes().values().all(|m| !m.contains_key(&2)));
    assert_eq!(
        ranks[1].remote_indices().neighbours().collect::<Vec<_>>(),
        vec![0, 2]
    );
}
