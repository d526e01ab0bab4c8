//! Typed exact-size message exchange.
//!
//! Both sides of every exchange already know how many records travel in each
//! direction, so no count header is sent: receives are posted with the exact
//! byte length, then all sends, then everything is waited on. Every handle is
//! drained before returning, even if an error occurs.

use crate::algs::communicator::{CommTag, Communicator, Wait};
use crate::algs::wire::{cast_slice, cast_slice_mut};
use crate::mesh_error::{CommError, MeshHaloError};
use bytemuck::Pod;
use std::collections::BTreeMap;

/// Send `outgoing[r]` to every rank `r` and receive exactly `expected[r]`
/// records from every rank `r`.
///
/// Ranks with an empty outgoing list are not sent to and ranks expecting zero
/// records are not received from, so both sides must agree on which pairs
/// carry data.
pub fn exchange_exact<C, T>(
    comm: &C,
    tag: CommTag,
    outgoing: &BTreeMap<usize, Vec<T>>,
    expected: &BTreeMap<usize, usize>,
) -> Result<BTreeMap<usize, Vec<T>>, MeshHaloError>
where
    C: Communicator,
    T: Pod,
{
    // 1) post all receives with exact sizes
    let mut pending_recvs = Vec::with_capacity(expected.len());
    for (&nbr, &count) in expected.iter().filter(|(_, n)| **n > 0) {
        let mut buffer = vec![T::zeroed(); count];
        let h = comm.irecv(nbr, tag.as_u16(), cast_slice_mut(&mut buffer));
        pending_recvs.push((nbr, h, buffer));
    }

    // 2) post all sends
    let mut pending_sends = Vec::with_capacity(outgoing.len());
    for (&nbr, items) in outgoing.iter().filter(|(_, v)| !v.is_empty()) {
        log::trace!(
            "rank {}: sending {} records to rank {nbr} (tag {:#x})",
            comm.rank(),
            items.len(),
            tag.as_u16()
        );
        pending_sends.push(comm.isend(nbr, tag.as_u16(), cast_slice(items)));
    }

    // 3) wait for all receives, keep the first error
    let mut received = BTreeMap::new();
    let mut maybe_err = None;
    for (nbr, h, mut buffer) in pending_recvs {
        let want = std::mem::size_of_val(buffer.as_slice());
        match h.wait() {
            Some(data) if data.len() == want => {
                cast_slice_mut(&mut buffer).copy_from_slice(&data);
                received.insert(nbr, buffer);
            }
            Some(data) if maybe_err.is_none() => {
                maybe_err = Some(MeshHaloError::BufferSizeMismatch {
                    neighbor: nbr,
                    expected: want,
                    got: data.len(),
                });
            }
            None if maybe_err.is_none() => {
                maybe_err = Some(MeshHaloError::CommError {
                    neighbor: nbr,
                    source: Box::new(CommError(format!("no data received from rank {nbr}"))),
                });
            }
            _ => {} // already have an error; just drain
        }
    }

    // 4) always drain all send handles
    for send in pending_sends {
        let _ = send.wait();
    }

    match maybe_err {
        Some(err) => Err(err),
        None => Ok(received),
    }
}
