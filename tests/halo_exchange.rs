mod util;

use mesh_halo::prelude::*;
use util::run_ranks;

#[test]
fn ghost_cells_receive_owner_values() {
    let grid = cartesian_box(4, 2, 1).unwrap();
    let parts = [0, 0, 1, 1, 0, 0, 1, 1];
    let cfg = DistributionConfig::default();
    let results = run_ranks(2, |comm| {
        let local = distribute_global_grid(&grid, &parts, &cfg, comm).unwrap();
        let mut values: Vec<f64> = (0..local.num_cells())
            .map(|l| {
                let g = local.global_index(Codim::Cell, l);
                if parts[g] == comm.rank() { g as f64 } else { -1.0 }
            })
            .collect();
        let iface = local.cell_interface(InterfaceCategory::InteriorBorderAll).unwrap();
        forward(comm, CommTag::new(0x100), iface, &mut values).unwrap();
        (local, values)
    });
    for (local, values) in &results {
        for (l, &v) in values.iter().enumerate() {
            assert_eq!(v, local.global_index(Codim::Cell, l) as f64);
        }
        assert_eq!(local.num_cells(), 6);
    }
}

#[test]
fn point_values_travel_along_point_interfaces() {
    let grid = cartesian_box(3, 3, 1).unwrap();
    let parts: Vec<usize> = (0..9).map(|c| usize::from(c % 3 >= 1) + usize::from(c / 3 >= 2)).collect();
    let cfg = DistributionConfig::default();
    let results = run_ranks(3, |comm| {
        let local = distribute_global_grid(&grid, &parts, &cfg, comm).unwrap();
        let types = local.partition_types(Codim::Point);
        let mut values: Vec<u64> = (0..local.num_points())
            .map(|l| match types[l] {
                PartitionType::Interior | PartitionType::Border => local.global_index(Codim::Point, l) as u64,
                _ => u64::MAX,
            })
            .collect();
        let iface = local.point_interface(InterfaceCategory::InteriorBorderAll).unwrap();
        forward(comm, CommTag::new(0x200), iface, &mut values).unwrap();
        (local, values)
    });
    let mut received = 0;
    for (local, values) in &results {
        let iface = local.point_interface(InterfaceCategory::InteriorBorderAll).unwrap();
        for (_, lists) in iface.iter() {
            for &l in lists.receive() {
                assert_eq!(values[l], local.global_index(Codim::Point, l) as u64);
                received += 1;
            }
        }
    }
    assert!(received > 0);
}

#[test]
fn overlap_all_carries_ghost_values_to_owners() {
    let grid = cartesian_box(2, 1, 1).unwrap();
    let cfg = DistributionConfig::default();
    let results = run_ranks(2, |comm| {
        let local = distribute_global_grid(&grid, &[0, 1], &cfg, comm).unwrap();
        // each rank writes 100 + its rank into its ghost cell only
        let mut values: Vec<i32> = (0..local.num_cells())
            .map(|l| {
                if local.global_index(Codim::Cell, l) == comm.rank() { 0 } else { 100 + comm.rank() as i32 }
            })
            .collect();
        let iface = local.cell_interface(InterfaceCategory::OverlapAll).unwrap();
        forward(comm, CommTag::new(0x300), iface, &mut values).unwrap();
        let owned = local.local_index(Codim::Cell, comm.rank()).unwrap();
        values[owned]
    });
    assert_eq!(results, vec![101, 100]);
}
