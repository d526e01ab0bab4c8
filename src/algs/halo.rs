//! Move per-entity values along a communication interface.
//!
//! [`forward`] copies the values at each send list into the peer's receive
//! list; [`backward`] goes the other way. Values must be plain data.

use crate::algs::channel::exchange_exact;
use crate::algs::communicator::{CommTag, Communicator};
use crate::algs::interface::{Interface, InterfaceLists};
use crate::mesh_error::MeshHaloError;
use bytemuck::Pod;
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Send `data[send]` and overwrite `data[receive]` with what the peers send.
pub fn forward<C, T>(
    comm: &C,
    tag: CommTag,
    interface: &Interface,
    data: &mut [T],
) -> Result<(), MeshHaloError>
where
    C: Communicator,
    T: Pod,
{
    exchange(comm, tag, interface, data, Direction::Forward)
}

/// Send `data[receive]` and overwrite `data[send]` with what the peers send.
pub fn backward<C, T>(
    comm: &C,
    tag: CommTag,
    interface: &Interface,
    data: &mut [T],
) -> Result<(), MeshHaloError>
where
    C: Communicator,
    T: Pod,
{
    exchange(comm, tag, interface, data, Direction::Backward)
}

/// `(source, destination)` lists for one direction.
fn split(l: &InterfaceLists, direction: Direction) -> (&[usize], &[usize]) {
    match direction {
        Direction::Forward => (l.send(), l.receive()),
        Direction::Backward => (l.receive(), l.send()),
    }
}

fn exchange<C, T>(
    comm: &C,
    tag: CommTag,
    interface: &Interface,
    data: &mut [T],
    direction: Direction,
) -> Result<(), MeshHaloError>
where
    C: Communicator,
    T: Pod,
{
    let check = |index: usize| {
        if index < data.len() {
            Ok(())
        } else {
            Err(MeshHaloError::DataIndexOutOfRange {
                index,
                len: data.len(),
            })
        }
    };

    let mut outgoing = BTreeMap::new();
    let mut expected = BTreeMap::new();
    for (rank, l) in interface.iter() {
        let (src, dst) = split(l, direction);
        for &i in src.iter().chain(dst) {
            check(i)?;
        }
        outgoing.insert(rank, src.iter().map(|&i| data[i]).collect::<Vec<T>>());
        expected.insert(rank, dst.len());
    }

    let received = exchange_exact(comm, tag, &outgoing, &expected)?;
    for (rank, values) in received {
        if let Some(l) = interface.get(rank) {
            let (_, dst) = split(l, direction);
            for (&i, v) in dst.iter().zip(values) {
                data[i] = v;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{LocalComm, NoComm};
    use crate::algs::interface::{InterfaceCategory, SharedEntity, build_interface};
    use crate::topology::partition_type::PartitionType::*;

    fn owner_copy(rank: usize) -> Interface {
        // rank 0 owns local 0 and ghosts rank 1's cell as local 1, and vice versa
        let entities = [
            SharedEntity { rank: 1 - rank, index: 0, mine: Interior, other: Overlap },
            SharedEntity { rank: 1 - rank, index: 1, mine: Overlap, other: Interior },
        ];
        build_interface(InterfaceCategory::InteriorBorderAll, &entities).unwrap()
    }

    #[test]
    fn forward_fills_ghosts_and_backward_returns() {
        let comms = LocalComm::world(2);
        let results: Vec<(Vec<f64>, Vec<f64>)> = std::thread::scope(|s| {
            let handles: Vec<_> = comms
                .iter()
                .map(|comm| {
                    s.spawn(move || {
                        let rank = comm.rank();
                        let iface = owner_copy(rank);
                        let mut data = vec![rank as f64 + 1.0, -1.0];
                        forward(comm, CommTag::new(0x70), &iface, &mut data).unwrap();
                        let after_forward = data.clone();
                        data[1] *= 10.0;
                        backward(comm, CommTag::new(0x71), &iface, &mut data).unwrap();
                        (after_forward, data)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(results[0].0, vec![1.0, 2.0]);
        assert_eq!(results[1].0, vec![2.0, 1.0]);
        // each owner gets its ghost's scaled value back
        assert_eq!(results[0].1, vec![10.0, 20.0]);
        assert_eq!(results[1].1, vec![20.0, 10.0]);
    }

    #[test]
    fn short_data_slice_is_rejected() {
        let iface = owner_copy(0);
        let mut data = [0u32; 1];
        assert!(matches!(
            forward(&NoComm, CommTag::new(1), &iface, &mut data),
            Err(MeshHaloError::DataIndexOutOfRange { index: 1, len: 1 })
        ));
    }
}
