#![allow(dead_code)]
use mesh_halo::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Run `f` once per rank of a fresh in-process world, each rank on its own thread.
pub fn run_ranks<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&LocalComm) -> T + Sync,
{
    let comms = LocalComm::world(n);
    std::thread::scope(|s| {
        let handles: Vec<_> = comms
            .iter()
            .map(|comm| {
                let f = &f;
                s.spawn(move || f(comm))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}

/// Distribute `grid` on `n` ranks and return every rank's subgrid.
pub fn distribute_on<C, F, P>(
    n: usize,
    grid: &GlobalGrid<C, F, P>,
    parts: &[usize],
    cfg: &DistributionConfig,
) -> Vec<DistributedGrid<C, F, P>>
where
    C: Clone + Send + Sync,
    F: Clone + Send + Sync,
    P: Clone + Send + Sync,
{
    run_ranks(n, |comm| {
        distribute_global_grid(grid, parts, cfg, comm).expect("distribution succeeds")
    })
}

/// Reproducible random cell → rank assignment.
pub fn random_parts(num_cells: usize, num_ranks: usize, seed: u64) -> Vec<usize> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..num_cells).map(|_| rng.gen_range(0..num_ranks)).collect()
}

/// Face-hop distance of every cell from the nearest cell owned by `rank`.
pub fn hops_from_rank<C, F, P>(grid: &GlobalGrid<C, F, P>, parts: &[usize], rank: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; grid.num_cells()];
    let mut queue = VecDeque::new();
    for (cell, &owner) in parts.iter().enumerate() {
        if owner == rank {
            dist[cell] = Some(0);
            queue.push_back(cell);
        }
    }
    while let Some(cell) = queue.pop_front() {
        let d = dist[cell].unwrap_or(0);
        for nbr in grid.face_neighbours(cell) {
            if dist[nbr].is_none() {
                dist[nbr] = Some(d + 1);
                queue.push_back(nbr);
            }
        }
    }
    dist
}
